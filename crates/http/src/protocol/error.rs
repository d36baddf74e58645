use std::io;
use std::str::Utf8Error;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no bytes arrived within the idle timeout of {idle:?}")]
    Timeout { idle: Duration },

    #[error("connection closed before any byte was received")]
    EmptyRequest,

    #[error("message is not valid utf-8: {source}")]
    Encoding {
        #[from]
        source: Utf8Error,
    },

    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    #[error("connection closed early after {received} bytes, frame is incomplete")]
    ConnectionClosedEarly { received: usize },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("declared body size {declared} exceed the limit {max_size}")]
    TooLargeBody { declared: u64, max_size: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn timeout(idle: Duration) -> Self {
        Self::Timeout { idle }
    }

    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn malformed_status_line<S: ToString>(line: S) -> Self {
        Self::MalformedStatusLine { line: line.to_string() }
    }

    pub fn connection_closed_early(received: usize) -> Self {
        Self::ConnectionClosedEarly { received }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(declared: u64, max_size: u64) -> Self {
        Self::TooLargeBody { declared, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the peer never produced a usable request, either by
    /// closing immediately or by staying silent past the idle timeout.
    pub fn is_empty_request(&self) -> bool {
        matches!(self, Self::EmptyRequest | Self::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
