//! HTTP connection handling module
//!
//! This module owns the only blocking point of the crate: reading from the
//! byte stream.
//!
//! # Components
//!
//! - [`FrameReader`]: reads until one frame is complete, the stream closes, or
//!   the idle timeout expires
//! - [`HttpConnection`]: one read-parse-handle-write-close cycle, translating
//!   fatal errors into 400-class responses

mod frame_reader;
mod http_connection;

pub use frame_reader::FrameReader;
pub use frame_reader::ReaderConfig;
pub use frame_reader::read_frame;
pub use http_connection::ConnectionConfig;
pub use http_connection::HttpConnection;
