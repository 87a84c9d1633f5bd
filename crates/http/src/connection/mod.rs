//! Connection handling: the per-connection request/response loop.
//!
//! [`HttpConnection`] owns both halves of an accepted byte stream and drives
//! the full lifecycle: decode a request, dispatch it through the route table,
//! serialize the response, and loop while keep-alive holds. One connection is
//! one task; nothing here is shared across connections except the route table
//! and the application globals, both read-only.

mod http_connection;

pub use http_connection::ConnectionConfig;
pub use http_connection::HttpConnection;
