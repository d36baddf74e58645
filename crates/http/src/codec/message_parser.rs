//! Parsing framed bytes into structured requests and responses.
//!
//! The parser works on a whole [`RawFrame`] at once. It decodes the frame as
//! UTF-8, splits the header block from the body at the boundary, and then
//! splits the header block into lines, accepting both `\r\n` and `\n`.
//!
//! Malformed header lines and odd query pairs never abort a parse: a header
//! line without `:` is skipped with a warning, and a query pair without `=` is
//! kept with an empty value. Only an undecodable frame or an unusable first
//! line is fatal.
//!
//! Percent-decoding is not applied to the path or to the query map; callers
//! wanting decoded values use [`ParsedRequest::query_as`].

use std::collections::HashMap;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::codec::boundary::{find_boundary, header_lines};
use crate::protocol::{HeaderFields, ParseError, ParsedRequest, ParsedResponse, RawFrame};

/// Parses a frame known to hold a request.
///
/// # Errors
///
/// - [`ParseError::Encoding`] if the frame is not valid UTF-8
/// - [`ParseError::MalformedRequestLine`] if the first line has fewer than
///   three whitespace-separated tokens
pub fn parse_request(frame: RawFrame) -> Result<ParsedRequest, ParseError> {
    let (head, body) = split_frame(frame.into_bytes())?;
    let mut lines = header_lines(&head);

    let request_line = lines.next().unwrap_or_default();
    let mut tokens = request_line.split_ascii_whitespace();
    let (Some(method), Some(target), Some(version)) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(ParseError::malformed_request_line(request_line));
    };

    if tokens.next().is_some() {
        warn!(request_line, "request line has extra tokens, ignoring them");
    }

    let (path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let request = ParsedRequest {
        method: method.to_owned(),
        path: path.to_owned(),
        raw_query: raw_query.map(str::to_owned),
        query: raw_query.map(parse_query).unwrap_or_default(),
        version: version.to_owned(),
        headers: parse_headers(lines),
        body,
    };

    trace!(method = %request.method, path = %request.path, headers = request.headers.len(), "parsed request");
    Ok(request)
}

/// Parses a frame known to hold a response.
///
/// The status line is `VERSION SP CODE [SP REASON]`; the reason may contain
/// spaces or be missing entirely.
///
/// # Errors
///
/// - [`ParseError::Encoding`] if the frame is not valid UTF-8
/// - [`ParseError::MalformedStatusLine`] if the version or a numeric status code is missing
pub fn parse_response(frame: RawFrame) -> Result<ParsedResponse, ParseError> {
    let (head, body) = split_frame(frame.into_bytes())?;
    let mut lines = header_lines(&head);

    let status_line = lines.next().unwrap_or_default();
    let (version, rest) = status_line.split_once(' ').ok_or_else(|| ParseError::malformed_status_line(status_line))?;
    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));

    if version.is_empty() {
        return Err(ParseError::malformed_status_line(status_line));
    }

    let status = code.parse::<u16>().map_err(|_| ParseError::malformed_status_line(status_line))?;

    Ok(ParsedResponse {
        version: version.to_owned(),
        status,
        reason: reason.to_owned(),
        headers: parse_headers(lines),
        body,
    })
}

/// Splits a frame into its decoded header block and its body.
///
/// A frame without a boundary, which only happens for frames cut short by the
/// peer, is treated as all header block.
fn split_frame(bytes: Bytes) -> Result<(String, Bytes), ParseError> {
    let text = std::str::from_utf8(&bytes)?;

    match find_boundary(&bytes) {
        Some(boundary) => Ok((text[..boundary.header_end].to_owned(), bytes.slice(boundary.body_start..))),
        None => Ok((text.to_owned(), Bytes::new())),
    }
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HeaderFields {
    let mut headers = HeaderFields::new();

    for line in lines.filter(|line| !line.is_empty()) {
        match line.split_once(':') {
            Some((name, value)) => headers.append(name.trim_ascii(), value.trim_ascii()),
            None => warn!(line, "invalid header line without ':', skipping it"),
        }
    }

    headers
}

/// Splits a raw query string into a map; later duplicates override earlier ones.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
