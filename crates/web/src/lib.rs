//! Thin convenience layer over the [`pico_http`] engine.
//!
//! `pico-web` adds the pieces an application needs around the protocol core:
//!
//! - [`Server`]: bind/accept lifecycle with `start`/`stop` semantics and
//!   in-flight connection draining
//! - [`RequestExt`]: `form()` and `json()` accessors over request bodies
//! - [`percent_decode`] / [`parse_form`]: urlencoded decoding helpers
//!
//! The engine surface an application registers against — route groups,
//! handlers, the response maker — is re-exported here so most programs only
//! depend on this crate.

mod form;
mod request;
mod server;

pub use form::DecodeError;
pub use form::parse_form;
pub use form::percent_decode;
pub use request::BodyError;
pub use request::RequestExt;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
pub use server::ServerError;

pub use pico_http::builder::ResponseMaker;
pub use pico_http::connection::ConnectionConfig;
pub use pico_http::handler::{Context, Handler, HandlerError, make_handler};
pub use pico_http::protocol::{ChunkStream, Method, Request, Response};
pub use pico_http::router::RouteGroup;
