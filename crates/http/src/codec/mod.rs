//! HTTP codec module for framing, parsing and writing HTTP messages
//!
//! This module holds the three pieces that turn a byte stream into requests
//! and responses back into bytes. All of them are synchronous; the only
//! blocking point, the stream read, lives in [`crate::connection::FrameReader`].
//!
//! # Components
//!
//! - Framing:
//!   - [`FrameDecoder`]: finds where one message ends, using the header/body
//!     boundary and the declared `Content-Length`
//!
//! - Parsing:
//!   - [`parse_request`]: splits a frame into request line, headers, query and body
//!   - [`parse_response`]: the same for a status line, used by clients
//!
//! - Writing:
//!   - [`ResponseEncoder`] / [`write_response`]: serialize a response exactly,
//!     computing `Content-Length` when the caller left it out
//!
//! # Example
//!
//! ```
//! use sockapi_http::codec::{parse_request, write_response, FrameDecoder};
//! use sockapi_http::protocol::ResponseSpec;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut buffer = BytesMut::from("GET /colors?color1=red HTTP/1.1\r\nAccept: text/html\r\n\r\n");
//! let frame = FrameDecoder::new().decode(&mut buffer).unwrap().unwrap();
//! let request = parse_request(frame).unwrap();
//! assert_eq!(request.query_param("color1"), Some("red"));
//!
//! let bytes = write_response(&ResponseSpec::ok().body("red"));
//! assert_eq!(&bytes[..], b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nred");
//! ```

mod boundary;
mod frame_decoder;
mod message_parser;
mod response_encoder;

pub use frame_decoder::FrameDecoder;
pub use frame_decoder::DEFAULT_MAX_BODY_BYTES;
pub use frame_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use message_parser::parse_request;
pub use message_parser::parse_response;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::write_response;
