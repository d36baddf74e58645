//! The structured form of a parsed HTTP request.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Deserialize;

use crate::protocol::HeaderFields;

/// A request as produced by the message parser.
///
/// `path` never contains `?`: the target is split on its first `?` and the
/// remainder lands in `query`, which is empty exactly when the target had no
/// `?`. Query keys and values are kept undecoded; use [`ParsedRequest::query_as`]
/// for a percent-decoded, typed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) raw_query: Option<String>,
    pub(crate) query: HashMap<String, String>,
    pub(crate) version: String,
    pub(crate) headers: HeaderFields,
    pub(crate) body: Bytes,
}

impl ParsedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query string as received, without the leading `?`.
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn version(&self) -> &str {
        &self.version
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

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Returns the declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header(http::header::CONTENT_LENGTH.as_str()).and_then(parse_content_length)
    }

    /// Deserializes the query string into `T`, percent-decoding keys and values.
    ///
    /// A request without a query string deserializes from the empty string, so
    /// types whose fields are all optional still succeed.
    pub fn query_as<T>(&self) -> Result<T, serde_qs::Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_qs::from_str(self.raw_query().unwrap_or_default())
    }
}

/// Parses a `Content-Length` value: ASCII digits only, surrounding whitespace
/// ignored. Signs are refused even though `u64::from_str` would take a `+`.
pub(crate) fn parse_content_length(value: &str) -> Option<u64> {
    let digits = value.trim_ascii();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_content_length;
    use crate::codec::parse_request;
    use crate::protocol::RawFrame;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Name {
        fname: String,
        lname: Option<String>,
    }

    #[test]
    fn typed_query_is_percent_decoded() {
        let request = parse_request("GET /account?fname=Zak%20Al&lname=Alatoli HTTP/1.1\r\n\r\n".into()).unwrap();

        assert_eq!(request.query_param("fname"), Some("Zak%20Al"));

        let name: Name = request.query_as().unwrap();
        assert_eq!(name, Name { fname: "Zak Al".into(), lname: Some("Alatoli".into()) });
    }

    #[test]
    fn typed_query_reports_missing_fields() {
        let request = parse_request("GET /account HTTP/1.1\r\n\r\n".into()).unwrap();
        assert!(request.query_as::<Name>().is_err());
    }

    #[test]
    fn content_length_reads_header() {
        let request = parse_request("POST /x HTTP/1.1\r\ncontent-length: 2\r\n\r\nhi".into()).unwrap();
        assert_eq!(request.content_length(), Some(2));
    }

    #[test]
    fn content_length_is_digits_only() {
        for value in ["+5", "-5", "5 5", "0x5", ""] {
            let raw = format!("POST /x HTTP/1.1\r\nContent-Length: {value}\r\n\r\n");
            let request = parse_request(RawFrame::new(raw)).unwrap();
            assert_eq!(request.content_length(), None, "value {value:?}");
        }

        assert_eq!(parse_content_length(" 42 "), Some(42));
        assert_eq!(parse_content_length("18446744073709551616"), None);
    }
}
