//! Raw, unparsed message frames as delimited on the wire.

use bytes::Bytes;

use crate::protocol::ParseError;

/// One complete (or, when the peer hung up early, partial) HTTP message:
/// the header block followed by the body bytes, if any.
///
/// A frame is produced by the frame reader and consumed exactly once by the
/// message parser, which is why the parser takes it by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Bytes,
}

impl RawFrame {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into() }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<&'static [u8]> for RawFrame {
    fn from(bytes: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for RawFrame {
    fn from(str: &'static str) -> Self {
        Self::new(Bytes::from_static(str.as_bytes()))
    }
}

/// How framing of a [`RawFrame`] ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// The boundary was seen and the declared body length, if any, was satisfied
    Complete,
    /// The stream ended before the frame was complete
    Truncated,
}

/// The outcome of reading one frame from a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFrame {
    pub frame: RawFrame,
    pub status: FrameStatus,
}

impl ReadFrame {
    pub fn complete(frame: RawFrame) -> Self {
        Self { frame, status: FrameStatus::Complete }
    }

    pub fn truncated(frame: RawFrame) -> Self {
        Self { frame, status: FrameStatus::Truncated }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.status, FrameStatus::Complete)
    }

    /// Returns the frame, refusing it when the stream was cut short.
    pub fn into_complete(self) -> Result<RawFrame, ParseError> {
        match self.status {
            FrameStatus::Complete => Ok(self.frame),
            FrameStatus::Truncated => Err(ParseError::connection_closed_early(self.frame.len())),
        }
    }
}
