//! Decoded request representation.

use bytes::Bytes;

use crate::protocol::query::split_target;
use crate::protocol::{HeaderMap, Method, QueryMap, Version};

/// The decoded request line and header section, before any body bytes.
///
/// Construction happens exactly once per request inside the decoder; the
/// default `Connection` value for the protocol version is injected here when
/// the client did not send the header, so [`RequestHead::keep_alive`] always
/// sees an effective value.
#[derive(Debug)]
pub struct RequestHead {
    version: Version,
    method: Method,
    path: String,
    query: QueryMap,
    headers: HeaderMap,
}

impl RequestHead {
    /// Builds a head from its parsed parts. Normally only the decoder calls
    /// this; it is public so handlers can be exercised without a socket.
    pub fn new(version: Version, method: Method, target: &str, mut headers: HeaderMap) -> Self {
        let (path, query) = split_target(target);
        if !headers.contains("connection") {
            headers.append("Connection", version.default_connection());
        }
        Self { version, method, path, query, headers }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the client asked to keep the connection open after this
    /// request: the effective `Connection` header, compared to `"close"`
    /// case-insensitively.
    pub fn keep_alive(&self) -> bool {
        !self.headers.get("connection").is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }

    /// Attaches the body, completing the request value.
    pub fn body(self, body: Option<Bytes>) -> Request {
        Request { head: self, body }
    }
}

/// A fully decoded request. Immutable once built; handlers only read it.
#[derive(Debug)]
pub struct Request {
    head: RequestHead,
    body: Option<Bytes>,
}

impl Request {
    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn method(&self) -> Method {
        self.head.method()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn query(&self) -> &QueryMap {
        self.head.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn keep_alive(&self) -> bool {
        self.head.keep_alive()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(version: Version, headers: HeaderMap) -> RequestHead {
        RequestHead::new(version, Method::Get, "/index?a=1", headers)
    }

    #[test]
    fn test_path_and_query_split() {
        let head = head(Version::Http11, HeaderMap::new());
        assert_eq!(head.path(), "/index");
        assert_eq!(head.query().get("a"), Some("1"));
    }

    #[test]
    fn test_default_connection_for_http11() {
        let head = head(Version::Http11, HeaderMap::new());
        assert_eq!(head.headers().get("connection"), Some("keep-alive"));
        assert!(head.keep_alive());
    }

    #[test]
    fn test_default_connection_for_http10() {
        let head = head(Version::Http10, HeaderMap::new());
        assert_eq!(head.headers().get("connection"), Some("close"));
        assert!(!head.keep_alive());
    }

    #[test]
    fn test_explicit_connection_overrides_default() {
        let mut headers = HeaderMap::new();
        headers.append("Connection", "keep-alive");
        let head = head(Version::Http10, headers);
        assert!(head.keep_alive());
    }

    #[test]
    fn test_close_compare_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.append("Connection", "Close");
        let head = head(Version::Http11, headers);
        assert!(!head.keep_alive());
    }
}
