use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use sockapi_http::connection::{ConnectionConfig, HttpConnection};
use sockapi_http::handler::Handler;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::router::{Router, boxed};

type SharedHandler = Arc<dyn Handler>;

pub struct ServerBuilder {
    handler: Option<SharedHandler>,
    address: Option<String>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { handler: None, address: None, config: ConnectionConfig::default() }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.handler = Some(Arc::new(router));
        self
    }

    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.handler = Some(Arc::from(boxed(handler)));
        self
    }

    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let handler = self.handler.ok_or(ServerError::MissingHandler)?;
        let address = self.address.ok_or(ServerError::MissingAddress)?;
        Ok(Server { handler, address, config: self.config })
    }
}

/// A server that owns its listening socket between `start` and `stop`.
///
/// Every accepted connection runs one request cycle in its own task;
/// connections share nothing but the handler.
pub struct Server {
    handler: SharedHandler,
    address: String,
    config: ConnectionConfig,
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("config", &self.config).finish_non_exhaustive()
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("can't bind {address}: {source}")]
    Bind { address: String, source: io::Error },
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listener and starts accepting in a background task.
    pub async fn start(self) -> Result<RunningServer, ServerError> {
        let bind_error = |source| ServerError::Bind { address: self.address.clone(), source };

        let tcp_listener = TcpListener::bind(self.address.as_str()).await.map_err(bind_error)?;
        let local_addr = tcp_listener.local_addr().map_err(bind_error)?;
        info!(address = %local_addr, "start listening");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(tcp_listener, self.handler, self.config, shutdown_rx));

        Ok(RunningServer { local_addr, shutdown: shutdown_tx, accept_task })
    }
}

#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, closes the listener and aborts in-flight connections.
    pub async fn stop(self) {
        info!(address = %self.local_addr, "stopping server");
        // the loop may already be gone, then there is nobody left to tell
        let _ = self.shutdown.send(true);

        if let Err(e) = self.accept_task.await {
            error!(cause = %e, "accept loop ended abnormally");
        }
    }
}

async fn accept_loop(
    tcp_listener: TcpListener,
    handler: SharedHandler,
    config: ConnectionConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    warn!(cause = %e, "connection task failed");
                }
            }

            accepted = tcp_listener.accept() => {
                let (tcp_stream, remote_addr) = match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                };

                let handler = Arc::clone(&handler);
                let span = info_span!("connection", peer = %remote_addr);
                connections.spawn(serve_connection(tcp_stream, handler, config).instrument(span));
            }
        }
    }

    drop(tcp_listener);
    info!(in_flight = connections.len(), "stopped accepting");
    connections.shutdown().await;
}

async fn serve_connection(tcp_stream: TcpStream, handler: SharedHandler, config: ConnectionConfig) {
    let (reader, writer) = tcp_stream.into_split();
    let connection = HttpConnection::with_config(reader, writer, &config);

    match connection.process(handler).await {
        Ok(()) => debug!("finished process, connection shutdown"),
        Err(e) => warn!(cause = %e, "connection finished with error"),
    }
}
