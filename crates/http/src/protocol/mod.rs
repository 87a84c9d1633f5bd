//! Core protocol types and abstractions.
//!
//! This module holds the data model the rest of the engine is built around:
//!
//! - **Requests**: [`RequestHead`] and [`Request`], with [`Method`],
//!   [`Version`], [`QueryMap`] and [`HeaderMap`] as their building blocks.
//! - **Responses**: [`Response`], [`StatusCode`] and the payload modes in
//!   [`ResponseBody`] / [`ChunkStream`].
//! - **Codec-facing messages**: [`Message`], [`PayloadItem`] and
//!   [`PayloadSize`], shared between the decoder and encoder halves.
//! - **Errors**: [`HttpError`] with its [`ParseError`], [`SendError`] and
//!   [`BuildError`] leaves.
//!
//! Requests and responses are value objects created and consumed within one
//! request/response cycle; nothing here is shared across connections.

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod version;
pub use version::Version;

mod method;
pub use method::Method;

mod headers;
pub use headers::HeaderMap;

mod query;
pub use query::QueryMap;
pub use query::split_target;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::Response;
pub use response::ResponseHead;
pub use response::StatusCode;

mod body;
pub use body::ChunkStream;
pub use body::ResponseBody;

mod error;
pub use error::BuildError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
