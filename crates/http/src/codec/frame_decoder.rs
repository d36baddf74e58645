//! Frame boundary detection for HTTP messages.
//!
//! [`FrameDecoder`] decides when the bytes accumulated so far hold one complete
//! message. A message is complete once the header/body boundary has been seen
//! and, if the header block declares a `Content-Length`, exactly that many body
//! bytes have followed it. No other heuristic is used: a read that happens to
//! fill the buffer, or a block that happens to end in `\r\n\r\n`, says nothing
//! about whether a declared body is still in flight.
//!
//! # Limits
//!
//! - Maximum header block size: 8KB by default
//! - Maximum declared body size: 1MB by default

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::boundary::{BOUNDARY_OVERLAP, find_boundary_from};
use crate::ensure;
use crate::protocol::{ParseError, RawFrame, parse_content_length};

/// Default maximum size in bytes of the header block
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default maximum declared body size in bytes
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Splits complete frames off the front of a byte buffer.
///
/// The decoder remembers how far it got between calls: while the header is
/// still arriving it only searches bytes it has not seen yet, and once the
/// header is complete it only compares the buffer length against the frame
/// length. Feeding a body in small reads therefore costs time linear in its
/// size.
///
/// Bytes beyond the declared body length stay in the source buffer; the
/// decoder never looks at them.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_header_bytes: usize,
    max_body_bytes: u64,
    state: DecodeState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// No boundary within the first `searched` bytes of the buffer
    Header { searched: usize },
    /// Boundary found, the frame ends `frame_length` bytes into the buffer
    Body { frame_length: usize },
}

impl Default for DecodeState {
    fn default() -> Self {
        Self::Header { searched: 0 }
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_header_bytes: usize, max_body_bytes: u64) -> Self {
        Self { max_header_bytes, max_body_bytes, state: DecodeState::default() }
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }

    /// Forgets any partially decoded frame.
    ///
    /// Call this before decoding from a buffer that was cleared or replaced.
    pub fn reset(&mut self) {
        self.state = DecodeState::default();
    }

    /// Finds the boundary and returns the total frame length, header included.
    fn decode_header(&mut self, src: &[u8], searched: usize) -> Result<Option<usize>, ParseError> {
        let Some(boundary) = find_boundary_from(src, searched) else {
            ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
            self.state = DecodeState::Header { searched: src.len().saturating_sub(BOUNDARY_OVERLAP) };
            return Ok(None);
        };

        ensure!(
            boundary.header_end <= self.max_header_bytes,
            ParseError::too_large_header(boundary.header_end, self.max_header_bytes)
        );

        let body_length = declared_content_length(&src[..boundary.header_end])?.unwrap_or(0);
        ensure!(body_length <= self.max_body_bytes, ParseError::too_large_body(body_length, self.max_body_bytes));

        trace!(header_size = boundary.header_end, body_size = body_length, "found header boundary");
        let body_length = usize::try_from(body_length).map_err(ParseError::invalid_content_length)?;
        Ok(Some(boundary.body_start + body_length))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_BODY_BYTES)
    }
}

impl Decoder for FrameDecoder {
    type Item = RawFrame;
    type Error = ParseError;

    /// Attempts to split one complete frame off `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))`: header block and declared body are both present
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the header block is too large or declares an unusable body length
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame_length = match self.state {
            DecodeState::Body { frame_length } => frame_length,
            DecodeState::Header { searched } => match self.decode_header(src, searched)? {
                Some(frame_length) => frame_length,
                None => return Ok(None),
            },
        };

        if src.len() < frame_length {
            trace!(received = src.len(), expected = frame_length, "waiting for the rest of the body");
            src.reserve(frame_length - src.len());
            self.state = DecodeState::Body { frame_length };
            return Ok(None);
        }

        self.reset();
        trace!(frame_size = frame_length, "framed message");
        Ok(Some(RawFrame::new(src.split_to(frame_length).freeze())))
    }
}

/// Scans a header block for the first `Content-Length` field.
///
/// The request line is skipped, as are lines without a `:`. The name is
/// trimmed and matched case-insensitively, the same way the message parser
/// reads it, and like every other header lookup the first occurrence wins.
fn declared_content_length(header_block: &[u8]) -> Result<Option<u64>, ParseError> {
    const CONTENT_LENGTH: &[u8] = b"content-length";

    for line in header_block.split(|b| *b == b'\n').skip(1) {
        let Some(colon) = line.iter().position(|b| *b == b':') else {
            continue;
        };

        if !line[..colon].trim_ascii().eq_ignore_ascii_case(CONTENT_LENGTH) {
            continue;
        }

        let value = std::str::from_utf8(&line[colon + 1..])
            .map_err(|_| ParseError::invalid_content_length("value is not utf-8"))?;

        let length = parse_content_length(value).ok_or_else(|| {
            ParseError::invalid_content_length(format!("value {} is not a decimal length", value.trim_ascii()))
        })?;

        return Ok(Some(length));
    }

    Ok(None)
}
