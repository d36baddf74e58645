//! Robust HTTP/1.x message framing over raw byte streams
//!
//! This crate turns a byte stream into one structured request, hands it to a
//! handler, and writes the handler's response back. It does not try to be a
//! full HTTP/1.1 server: there is no chunked encoding, no keep-alive and no
//! pipelining. What it does guarantee is consistent, testable framing:
//!
//! - a message ends at the header/body boundary plus exactly the declared
//!   `Content-Length`, never at a read that happened to be short
//! - a silent peer is cut off after an idle timeout instead of blocking forever
//! - every failure surfaces as a typed error instead of being printed and ignored
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use sockapi_http::connection::HttpConnection;
//! use sockapi_http::handler::make_handler;
//! use sockapi_http::protocol::{ParsedRequest, ResponseSpec};
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     info!(port = 3000, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:3000").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: ParsedRequest) -> Result<ResponseSpec, Infallible> {
//!     info!(path = request.path(), "request path");
//!     Ok(ResponseSpec::ok().header("Content-Type", "text/plain").body("Hello World!\r\n"))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: value types (frames, requests, responses, headers) and errors
//! - [`codec`]: frame boundary detection, the message parser and the message writer
//! - [`connection`]: the idle-timeout frame reader and the per-connection driver
//! - [`handler`]: the seam where routing and endpoints plug in
//!
//! # Limitations
//!
//! - One request per connection; bytes after the declared body are dropped
//! - No percent-decoding of paths or of the raw query map
//! - Maximum header size: 8KB by default
//! - Maximum declared body size: 1MB by default

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
