use std::fmt;

use crate::protocol::ParseError;

/// Request methods accepted by the engine.
///
/// The list is closed: a request line carrying any other token is rejected
/// with [`ParseError::UnsupportedMethod`] instead of being passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Method {
    type Error = ParseError;

    fn try_from(str: &str) -> Result<Self, Self::Error> {
        match str {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "PATCH" => Ok(Method::Patch),
            other => Err(ParseError::unsupported_method(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from() {
        assert_eq!(Method::try_from("GET").unwrap(), Method::Get);
        assert_eq!(Method::try_from("POST").unwrap(), Method::Post);
        assert_eq!(Method::try_from("DELETE").unwrap(), Method::Delete);
    }

    #[test]
    fn test_method_from_error() {
        // methods are case-sensitive tokens on the wire
        assert!(Method::try_from("get").is_err());
        assert!(Method::try_from("BREW").is_err());
        assert!(Method::try_from("").is_err());
    }
}
