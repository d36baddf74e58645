//! Reading one frame from a byte stream without blocking forever.
//!
//! [`FrameReader`] accumulates bytes from any [`AsyncRead`] and feeds them to a
//! [`FrameDecoder`] until one of three things happens:
//!
//! - the decoder reports a complete frame: [`FrameStatus::Complete`]
//! - the stream ends: the bytes so far come back as [`FrameStatus::Truncated`],
//!   or [`ParseError::EmptyRequest`] if there were none
//! - no byte arrives within the idle timeout: [`ParseError::Timeout`]
//!
//! The timeout applies to each read separately, so it measures idle time since
//! the last byte rather than the total time spent on the frame.
//!
//! [`FrameStatus::Complete`]: crate::protocol::FrameStatus::Complete
//! [`FrameStatus::Truncated`]: crate::protocol::FrameStatus::Truncated

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES, FrameDecoder};
use crate::protocol::{ParseError, RawFrame, ReadFrame};

/// Settings for [`FrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Longest time to wait for the next byte
    pub idle_timeout: Duration,
    /// Number of bytes requested from the stream per read
    pub read_buffer_size: usize,
    /// Largest accepted header block
    pub max_header_bytes: usize,
    /// Largest accepted declared body
    pub max_body_bytes: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(3),
            read_buffer_size: 1024,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug)]
pub struct FrameReader {
    decoder: FrameDecoder,
    buffer: BytesMut,
    idle_timeout: Duration,
    read_buffer_size: usize,
}

impl FrameReader {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            decoder: FrameDecoder::with_limits(config.max_header_bytes, config.max_body_bytes),
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            idle_timeout: config.idle_timeout,
            read_buffer_size: config.read_buffer_size.max(1),
        }
    }

    /// Reads from `stream` until one frame is complete, the stream ends, or
    /// the stream stays idle for longer than the idle timeout.
    ///
    /// The stream is only borrowed for this call. Bytes that arrive after the
    /// declared body are discarded, since only one frame is read per connection.
    ///
    /// # Errors
    ///
    /// - [`ParseError::EmptyRequest`] if the stream ended before any byte arrived
    /// - [`ParseError::Timeout`] if a read waited longer than the idle timeout
    /// - any framing error reported by [`FrameDecoder`], or an io error
    pub async fn read_frame<R>(&mut self, stream: &mut R) -> Result<ReadFrame, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        self.buffer.clear();
        self.decoder.reset();

        loop {
            if let Some(frame) = self.decoder.decode(&mut self.buffer)? {
                if !self.buffer.is_empty() {
                    debug!(discarded = self.buffer.len(), "dropping bytes received after the frame");
                    self.buffer.clear();
                }
                return Ok(ReadFrame::complete(frame));
            }

            self.buffer.reserve(self.read_buffer_size);
            let read = timeout(self.idle_timeout, stream.read_buf(&mut self.buffer))
                .await
                .map_err(|_| ParseError::timeout(self.idle_timeout))??;

            if read == 0 {
                if self.buffer.is_empty() {
                    return Err(ParseError::EmptyRequest);
                }

                debug!(received = self.buffer.len(), "stream closed before the frame was complete");
                return Ok(ReadFrame::truncated(RawFrame::new(self.buffer.split().freeze())));
            }

            trace!(read, buffered = self.buffer.len(), "read bytes from stream");
        }
    }
}

/// Reads one frame with a throwaway [`FrameReader`].
pub async fn read_frame<R>(stream: &mut R, config: &ReaderConfig) -> Result<ReadFrame, ParseError>
where
    R: AsyncRead + Unpin,
{
    FrameReader::new(config).read_frame(stream).await
}
