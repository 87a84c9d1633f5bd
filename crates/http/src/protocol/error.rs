use std::io;

use thiserror::Error;

/// Top-level error for one connection's lifetime.
///
/// Every variant terminates only the connection it occurred on; the listener
/// and other connections are unaffected.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    Request {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    Response {
        #[from]
        source: SendError,
    },

    #[error("handler failed: {cause}")]
    Handler { cause: Box<dyn std::error::Error + Send + Sync> },

    /// An in-flight read or write exceeded the per-operation timeout. The
    /// benign idle keep-alive timeout never produces this variant.
    #[error("timed out while {operation}")]
    Timeout { operation: &'static str },
}

impl HttpError {
    pub fn handler(cause: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Handler { cause }
    }

    pub fn timeout(operation: &'static str) -> Self {
        Self::Timeout { operation }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised while decoding a request from the wire.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request line did not split into method, target and version.
    #[error("malformed start line")]
    MalformedStartLine,

    /// A header line was not a well-formed `name: value` field.
    #[error("malformed header line: {reason}")]
    MalformedHeaderLine { reason: String },

    #[error("unsupported protocol version: {version}")]
    UnsupportedVersion { version: String },

    #[error("unsupported method: {method}")]
    UnsupportedMethod { method: String },

    #[error("header section of {current_size} bytes exceeds the limit of {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header count exceeds the limit of {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_header<S: ToString>(reason: S) -> Self {
        Self::MalformedHeaderLine { reason: reason.to_string() }
    }

    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion { version: version.to_string() }
    }

    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while serializing a response to the wire.
#[derive(Debug, Error)]
pub enum SendError {
    /// Chunked transfer coding was requested on an HTTP/1.0 response.
    #[error("chunked transfer coding requires HTTP/1.1")]
    UnsupportedEncoding,

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised by the response construction helpers.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A streamed body was requested for an HTTP/1.0 response.
    #[error("chunked transfer coding requires HTTP/1.1")]
    UnsupportedEncoding,

    #[error("json serialization failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BuildError {
    pub fn invalid_argument<S: ToString>(reason: S) -> Self {
        Self::InvalidArgument { reason: reason.to_string() }
    }
}
