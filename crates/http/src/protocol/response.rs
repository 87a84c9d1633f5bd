//! Outgoing response representation.

use std::fmt;

use crate::protocol::{BuildError, HeaderMap, ResponseBody, Version};

/// A response status code, restricted to the 100–599 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const HTTP_VERSION_NOT_SUPPORTED: StatusCode = StatusCode(505);

    pub fn new(code: u16) -> Result<Self, BuildError> {
        if !(100..=599).contains(&code) {
            return Err(BuildError::invalid_argument(format!("status code {code} out of range 100-599")));
        }
        Ok(Self(code))
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn is_redirect(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outgoing response: status line, ordered headers and a body in one of
/// the [`ResponseBody`] framing modes.
///
/// The version echoes the request's — that is what decides whether a chunked
/// body is even expressible. Headers stay mutable until the response is
/// handed to the encoder.
#[derive(Debug)]
pub struct Response {
    version: Version,
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    pub fn new(version: Version, status: StatusCode) -> Self {
        Self { version, status, headers: HeaderMap::new(), body: ResponseBody::Empty }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn set_body(&mut self, body: ResponseBody) {
        self.body = body;
    }

    /// Splits into the serializable head and the payload.
    pub fn into_parts(self) -> (ResponseHead, ResponseBody) {
        (ResponseHead { version: self.version, status: self.status, headers: self.headers }, self.body)
    }
}

/// Everything of a response that precedes the payload on the wire.
#[derive(Debug)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_range() {
        assert!(StatusCode::new(100).is_ok());
        assert!(StatusCode::new(599).is_ok());
        assert!(StatusCode::new(99).is_err());
        assert!(StatusCode::new(600).is_err());
    }

    #[test]
    fn test_is_redirect() {
        assert!(StatusCode::new(302).unwrap().is_redirect());
        assert!(!StatusCode::OK.is_redirect());
        assert!(!StatusCode::new(400).unwrap().is_redirect());
    }

    #[test]
    fn test_display_is_numeric_only() {
        assert_eq!(StatusCode::OK.to_string(), "200");
    }
}
