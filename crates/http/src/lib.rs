//! A minimal asynchronous HTTP/1.1 server engine.
//!
//! This crate is the protocol core for resource-constrained deployments: it
//! takes an already-accepted duplex byte stream, decodes requests off it,
//! dispatches them through an exact-match route table, and serializes
//! responses back — including persistent connections and chunked streaming
//! bodies. Listener setup and transport security live outside; any stream
//! implementing `AsyncRead`/`AsyncWrite` passes through untouched.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 request/response framing
//! - Keep-alive connections with separate idle and per-operation timeouts
//! - Fixed-length and chunked response bodies, streamed lazily
//! - Exact-match routing with prefix-composed route groups
//! - Bounded header parsing (8 KiB / 64 fields) instead of unbounded reads
//! - One cooperative task per connection, no cross-connection shared state
//!   beyond the read-only route table and application globals
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pico_http::connection::HttpConnection;
//! use pico_http::handler::{Context, HandlerError, make_handler};
//! use pico_http::protocol::{Method, Response};
//! use pico_http::router::{RouteGroup, RouteTable};
//! use tokio::net::TcpListener;
//!
//! async fn hello(ctx: Context<()>) -> Result<Response, HandlerError> {
//!     Ok(ctx.response.text(200, "Hello World!")?)
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let routes: Arc<RouteTable<()>> =
//!         Arc::new(RouteGroup::root().route("/", Method::Get, make_handler(hello)).into_table());
//!     let globals = Arc::new(());
//!
//!     let listener = TcpListener::bind("127.0.0.1:8000").await.expect("bind failed");
//!     loop {
//!         let (stream, peer) = match listener.accept().await {
//!             Ok(accepted) => accepted,
//!             Err(_) => continue,
//!         };
//!
//!         let routes = Arc::clone(&routes);
//!         let globals = Arc::clone(&globals);
//!         tokio::spawn(async move {
//!             let (reader, writer) = stream.into_split();
//!             let connection = HttpConnection::new(reader, writer).with_peer(peer.to_string());
//!             if let Err(e) = connection.serve(routes, globals).await {
//!                 eprintln!("connection error: {e}");
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the data model — requests, responses, headers, queries,
//!   payload messages and the error taxonomy
//! - [`codec`]: wire parsing and serialization as `tokio_util` codecs
//! - [`router`]: the exact-match route table and composable route groups
//! - [`builder`]: response construction helpers handed to handlers
//! - [`connection`]: the per-connection keep-alive state machine tying the
//!   pieces together
//! - [`handler`]: the application-facing handler contract
//!
//! # Limitations
//!
//! - HTTP/1.x only; no HTTP/2 or HTTP/3
//! - No request pipelining: responses strictly follow their request
//! - No connection cap; each connection polices itself with timeouts

pub mod builder;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod router;

mod utils;
pub(crate) use utils::ensure;
