//! Response serialization.
//!
//! [`ResponseEncoder`] writes a [`ResponseSpec`] in exactly this form:
//!
//! ```text
//! VERSION SP STATUS SP REASON CRLF
//! (NAME: VALUE CRLF)*
//! CRLF
//! BODY
//! ```
//!
//! Headers are written in the order they were added. When the body is not
//! empty and no `Content-Length` was supplied, one carrying the exact body
//! length is appended after the supplied headers. The body is written as is.

use bytes::{BufMut, Bytes, BytesMut};
use http::header::CONTENT_LENGTH;
use tokio_util::codec::Encoder;

use crate::protocol::{ResponseSpec, SendError};

/// Initial buffer size allocated for the status line and headers
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for complete responses implementing the [`Encoder`] trait.
///
/// Encoding into memory cannot fail; the error type only exists to satisfy
/// [`Encoder`] when the encoder drives a `FramedWrite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<&ResponseSpec> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: &ResponseSpec, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_into(response, dst);
        Ok(())
    }
}

impl Encoder<ResponseSpec> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: ResponseSpec, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_into(&response, dst);
        Ok(())
    }
}

/// Serializes a response into the exact bytes to put on the wire.
pub fn write_response(response: &ResponseSpec) -> Bytes {
    let mut dst = BytesMut::new();
    encode_into(response, &mut dst);
    dst.freeze()
}

fn encode_into(response: &ResponseSpec, dst: &mut BytesMut) {
    let body = response.body_bytes();
    dst.reserve(INIT_HEADER_SIZE + body.len());

    dst.put_slice(response.version().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(response.status().as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(response.reason().as_bytes());
    dst.put_slice(b"\r\n");

    for (name, value) in response.headers().iter() {
        dst.put_slice(name.as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }

    if !body.is_empty() && !response.headers().contains(CONTENT_LENGTH.as_str()) {
        dst.put_slice(b"Content-Length: ");
        dst.put_slice(body.len().to_string().as_bytes());
        dst.put_slice(b"\r\n");
    }

    dst.put_slice(b"\r\n");
    dst.put_slice(body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{parse_request, parse_response};
    use crate::protocol::RawFrame;
    use http::StatusCode;

    #[test]
    fn status_line_headers_and_body() {
        let response = ResponseSpec::ok()
            .with_reason("Here's your number!")
            .header("Content-Type", "application/json")
            .body(r#"{"number": 7}"#);

        let bytes = write_response(&response);

        assert_eq!(
            &bytes[..],
            b"HTTP/1.1 200 Here's your number!\r\nContent-Type: application/json\r\nContent-Length: 13\r\n\r\n{\"number\": 7}"
        );
    }

    #[test]
    fn empty_body_gets_no_content_length() {
        let bytes = write_response(&ResponseSpec::bad_request("Empty request"));
        assert_eq!(&bytes[..], b"HTTP/1.1 400 Empty request\r\n\r\n");
    }

    #[test]
    fn supplied_content_length_is_kept() {
        let response = ResponseSpec::ok().header("content-length", "2").header("X-After", "1").body("ok");
        let bytes = write_response(&response);

        assert_eq!(&bytes[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nX-After: 1\r\n\r\nok");
    }

    #[test]
    fn body_is_written_verbatim() {
        let body: &'static [u8] = b"\x00\r\n\r\n\xff";
        let bytes = write_response(&ResponseSpec::new(StatusCode::CREATED).body(body));
        assert!(bytes.ends_with(b"Content-Length: 6\r\n\r\n\x00\r\n\r\n\xff"));
    }

    #[test]
    fn encoder_appends_to_buffer() {
        let mut dst = BytesMut::from("prefix|");
        ResponseEncoder::new().encode(ResponseSpec::not_found("We ain't found nothin"), &mut dst).unwrap();
        assert_eq!(&dst[..], b"prefix|HTTP/1.1 404 We ain't found nothin\r\n\r\n");
    }

    #[test]
    fn header_order_survives_a_parse_and_write_cycle() {
        let request = parse_request(RawFrame::from(
            "GET /echo HTTP/1.1\r\nX-Zeta: 1\r\nx-alpha: 2\r\nX-Mid: 3\r\n\r\n",
        ))
        .unwrap();

        let mut response = ResponseSpec::ok();
        for (name, value) in request.headers().iter() {
            response.headers_mut().append(name, value);
        }
        let response = response.body("hello");

        let parsed = parse_response(RawFrame::new(write_response(&response))).unwrap();
        let names = parsed.headers().iter().map(|(name, _)| name).collect::<Vec<_>>();

        assert_eq!(names, vec!["X-Zeta", "x-alpha", "X-Mid", "Content-Length"]);
        assert_eq!(parsed.header("content-length"), Some("5"));
        assert_eq!(&parsed.body()[..], b"hello");
    }

    #[test]
    fn write_response_matches_the_encoder() {
        let response = ResponseSpec::new(StatusCode::CONFLICT).with_reason("User already exists").body("taken");

        let mut by_ref = BytesMut::new();
        ResponseEncoder::new().encode(&response, &mut by_ref).unwrap();
        let mut by_value = BytesMut::new();
        ResponseEncoder::new().encode(response.clone(), &mut by_value).unwrap();

        assert_eq!(write_response(&response), by_ref.freeze());
        assert_eq!(&by_value[..], b"HTTP/1.1 409 User already exists\r\nContent-Length: 5\r\n\r\ntaken");
    }
}
