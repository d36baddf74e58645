//! The socket api server built on `sockapi-http`.
//!
//! `sockapi-http` only knows how to frame, parse and answer one request per
//! connection. This crate supplies what sits around it: a [`Server`] owning
//! the listener, a [`Router`], the endpoints, the user store and the
//! configuration of the `sockapi-server` binary.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sockapi_web::endpoints;
//! use sockapi_web::store::JsonFileUserStore;
//! use sockapi_web::Server;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let router = endpoints::router(Arc::new(JsonFileUserStore::new("sample_users.json")))?;
//! let running = Server::builder().address("127.0.0.1:3000").router(router).build()?.start().await?;
//!
//! tokio::signal::ctrl_c().await?;
//! running.stop().await;
//! # Ok(())
//! # }
//! ```

mod server;

pub mod config;
pub mod endpoints;
pub mod router;
pub mod store;

pub use router::Router;
pub use server::RunningServer;
pub use server::Server;
pub use server::ServerBuilder;
pub use server::ServerError;
