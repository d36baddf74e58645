use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, error, info, warn};

use crate::codec::{ResponseEncoder, parse_request};
use crate::connection::{FrameReader, ReaderConfig};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, ParsedRequest, ResponseSpec, SendError};

/// Settings for one [`HttpConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    pub reader: ReaderConfig,
    /// Parse frames that the peer cut short instead of rejecting them
    pub accept_partial_frames: bool,
}

/// An HTTP connection that serves exactly one request.
///
/// `HttpConnection` drives the whole cycle for one accepted stream:
/// - Reading one frame, bounded by the idle timeout
/// - Parsing it into a [`ParsedRequest`]
/// - Calling the [`Handler`]
/// - Writing the response and shutting the stream down
///
/// Framing and parsing failures are answered with a 400-class response before
/// the stream is closed, and are also returned to the caller.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    writer: W,
    frame_reader: FrameReader,
    accept_partial_frames: bool,
    encoder: ResponseEncoder,
    write_buffer: BytesMut,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ConnectionConfig) -> Self {
        Self {
            reader,
            writer,
            frame_reader: FrameReader::new(&config.reader),
            accept_partial_frames: config.accept_partial_frames,
            encoder: ResponseEncoder::new(),
            write_buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    pub async fn process<H>(mut self, handler: H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let result = self.do_process(&handler).await;

        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown writer failed, peer may have gone");
        }

        result
    }

    async fn do_process<H>(&mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let request = match self.read_request().await {
            Ok(request) => request,
            Err(e) => {
                warn!(cause = %e, "can't read request");
                if let Err(send_error) = self.send_response(&error_response(&e)).await {
                    debug!(cause = %send_error, "can't send error response");
                }
                return Err(e.into());
            }
        };

        info!(method = request.method(), path = request.path(), "received request");

        let response = match handler.call(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = %e, "handle request error");
                ResponseSpec::new(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        info!(status = response.status().as_u16(), reason = response.reason(), "sending response");
        self.send_response(&response).await?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<ParsedRequest, ParseError> {
        let read = self.frame_reader.read_frame(&mut self.reader).await?;

        let frame = if self.accept_partial_frames {
            if !read.is_complete() {
                warn!(received = read.frame.len(), "parsing a frame the peer cut short");
            }
            read.frame
        } else {
            read.into_complete()?
        };

        parse_request(frame)
    }

    async fn send_response(&mut self, response: &ResponseSpec) -> Result<(), SendError> {
        self.write_buffer.clear();
        self.encoder.encode(response, &mut self.write_buffer)?;

        self.writer.write_all(&self.write_buffer).await?;
        Ok(self.writer.flush().await?)
    }
}

/// Maps a fatal read or parse error to the response sent before closing.
fn error_response(e: &ParseError) -> ResponseSpec {
    match e {
        ParseError::EmptyRequest | ParseError::Timeout { .. } => ResponseSpec::bad_request("Empty request"),
        ParseError::TooLargeHeader { .. } => ResponseSpec::new(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE),
        ParseError::TooLargeBody { .. } => ResponseSpec::new(StatusCode::PAYLOAD_TOO_LARGE),
        _ => ResponseSpec::bad_request("Bad request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_response;
    use crate::handler::{BoxError, make_handler};
    use std::sync::Arc;
    use crate::protocol::RawFrame;
    use std::convert::Infallible;
    use std::io;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, duplex};

    async fn exchange(request: &'static [u8], config: ConnectionConfig) -> (Result<(), HttpError>, Vec<u8>) {
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);

        client.write_all(request).await.unwrap();

        let handler = make_handler(|request: ParsedRequest| async move {
            let body = format!("{} {} {:?}", request.method(), request.path(), request.query_param("color1"));
            Ok::<_, Infallible>(ResponseSpec::ok().with_reason("Ooh pretty colors!").body(body))
        });

        let result = HttpConnection::with_config(reader, writer, &config).process(handler).await;

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        (result, response)
    }

    fn quick() -> ConnectionConfig {
        ConnectionConfig {
            reader: ReaderConfig { idle_timeout: Duration::from_millis(100), ..ReaderConfig::default() },
            ..ConnectionConfig::default()
        }
    }

    #[tokio::test]
    async fn serves_one_request() {
        let (result, response) = exchange(b"GET /colors?color1=red HTTP/1.1\r\nAccept: text/html\r\n\r\n", quick()).await;
        result.unwrap();

        let response = parse_response(RawFrame::new(response)).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "Ooh pretty colors!");
        assert_eq!(&response.body()[..], b"GET /colors Some(\"red\")");
    }

    #[tokio::test]
    async fn silent_peer_gets_empty_request() {
        let (result, response) = exchange(b"", quick()).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Timeout { .. } })));
        assert_eq!(response, b"HTTP/1.1 400 Empty request\r\n\r\n");
    }

    #[tokio::test]
    async fn malformed_request_line_gets_bad_request() {
        let (result, response) = exchange(b"Hello, world\r\n\r\n", quick()).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::MalformedRequestLine { .. } })));
        assert_eq!(response, b"HTTP/1.1 400 Bad request\r\n\r\n");
    }

    #[tokio::test]
    async fn oversized_body_is_refused() {
        let config = ConnectionConfig { reader: ReaderConfig { max_body_bytes: 4, ..quick().reader }, ..quick() };
        let (result, response) = exchange(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", config).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::TooLargeBody { .. } })));
        assert!(response.starts_with(b"HTTP/1.1 413 "));
    }

    #[tokio::test]
    async fn handler_error_becomes_internal_server_error() {
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

        let handler = make_handler(|_request: ParsedRequest| async move {
            Err::<ResponseSpec, _>(io::Error::other("store unavailable"))
        });
        HttpConnection::new(reader, writer).process(handler).await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert_eq!(response, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
    }

    #[tokio::test]
    async fn partial_frames_follow_the_config() {
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        client.write_all(b"GET /colors HTTP/1.1\r\nAccept: text/html\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let config = ConnectionConfig { accept_partial_frames: true, ..quick() };
        let handler = make_handler(|request: ParsedRequest| async move {
            Ok::<_, Infallible>(ResponseSpec::ok().body(request.path().to_owned()))
        });
        HttpConnection::with_config(reader, writer, &config).process(handler).await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.ends_with(b"\r\n\r\n/colors"));
    }

    #[tokio::test]
    async fn partial_frames_are_refused_by_default() {
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        client.write_all(b"GET /colors HTTP/1.1\r\nAccept: text/html\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let handler = make_handler(|_request: ParsedRequest| async move { Ok::<_, Infallible>(ResponseSpec::ok()) });
        let result = HttpConnection::with_config(reader, writer, &quick()).process(handler).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::ConnectionClosedEarly { .. } })));
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert_eq!(response, b"HTTP/1.1 400 Bad request\r\n\r\n");
    }

    #[tokio::test]
    async fn shared_handler_runs_in_a_spawned_task() {
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        client.write_all(b"GET /spawned HTTP/1.1\r\n\r\n").await.unwrap();

        let handler: Arc<dyn Handler> = Arc::new(make_handler(|request: ParsedRequest| async move {
            Ok::<_, BoxError>(ResponseSpec::ok().body(request.path().to_owned()))
        }));
        let task = tokio::spawn(HttpConnection::with_config(reader, writer, &quick()).process(Arc::clone(&handler)));
        task.await.unwrap().unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.ends_with(b"\r\n\r\n/spawned"));
    }
}
