//! Response value types: [`ResponseSpec`] for what a handler wants written,
//! [`ParsedResponse`] for what a peer sent back.

use std::borrow::Cow;

use bytes::Bytes;
use http::StatusCode;

use crate::protocol::HeaderFields;

const DEFAULT_VERSION: &str = "HTTP/1.1";

/// A response to be serialized by the message writer.
///
/// The reason phrase defaults to the canonical one for the status, but any
/// phrase may be supplied. Headers are written in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    version: Cow<'static, str>,
    status: StatusCode,
    reason: Cow<'static, str>,
    headers: HeaderFields,
    body: Bytes,
}

impl ResponseSpec {
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Cow::Borrowed(DEFAULT_VERSION),
            status,
            reason: Cow::Borrowed(status.canonical_reason().unwrap_or_default()),
            headers: HeaderFields::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn bad_request(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST).with_reason(reason)
    }

    pub fn not_found(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND).with_reason(reason)
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<Cow<'static, str>>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.headers
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }
}

/// A response as read back from the wire by [`crate::codec::parse_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub(crate) version: String,
    pub(crate) status: u16,
    pub(crate) reason: String,
    pub(crate) headers: HeaderFields,
    pub(crate) body: Bytes,
}

impl ParsedResponse {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_defaults_to_canonical() {
        let response = ResponseSpec::new(StatusCode::NOT_FOUND);
        assert_eq!(response.reason(), "Not Found");
        assert_eq!(response.version(), "HTTP/1.1");

        let response = ResponseSpec::ok().with_reason("Nice!");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.reason(), "Nice!");
    }

    #[test]
    fn builder_keeps_header_order() {
        let response = ResponseSpec::ok().header("B", "2").header("A", "1").body("x");
        let names = response.headers().iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(response.body_bytes().as_ref(), b"x");
    }
}
