//! Core protocol value types and errors.
//!
//! Every type here is a plain value created for one request/response cycle
//! and dropped afterwards; nothing is shared between connections.
//!
//! # Architecture
//!
//! - **Frames** ([`frame`]): bytes as delimited on the wire
//!   - [`RawFrame`]: one unparsed message, header block plus body
//!   - [`ReadFrame`]: a frame together with its [`FrameStatus`]
//!
//! - **Headers** ([`header`]): [`HeaderFields`], ordered and looked up case-insensitively
//!
//! - **Request Processing** ([`request`]): [`ParsedRequest`]
//!
//! - **Response Processing** ([`response`]):
//!   - [`ResponseSpec`]: what a handler asks the writer to send
//!   - [`ParsedResponse`]: what the parser read back from a peer
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: framing and parsing errors
//!   - [`SendError`]: Response sending errors

mod frame;
pub use frame::FrameStatus;
pub use frame::RawFrame;
pub use frame::ReadFrame;

mod header;
pub use header::HeaderFields;

mod request;
pub use request::ParsedRequest;
pub(crate) use request::parse_content_length;

mod response;
pub use response::ParsedResponse;
pub use response::ResponseSpec;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
