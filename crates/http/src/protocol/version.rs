use std::fmt;

use crate::protocol::ParseError;

/// HTTP protocol version carried on the request line.
///
/// Only the two HTTP/1.x versions exist for this engine; anything else is
/// rejected while decoding. The version also decides the default `Connection`
/// behavior and whether chunked transfer coding may be used on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }

    /// The `Connection` value assumed when the client sends no header.
    pub const fn default_connection(&self) -> &'static str {
        match self {
            Version::Http10 => "close",
            Version::Http11 => "keep-alive",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Version {
    type Error = ParseError;

    fn try_from(str: &str) -> Result<Self, Self::Error> {
        match str {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            other => Err(ParseError::unsupported_version(other)),
        }
    }
}
