//! Convenience accessors over the decoded request body.

use serde::de::DeserializeOwned;
use thiserror::Error;

use pico_http::protocol::Request;

use crate::form::{DecodeError, parse_form};

#[derive(Debug, Error)]
pub enum BodyError {
    /// The request does not carry an `application/x-www-form-urlencoded`
    /// body.
    #[error("request is not a urlencoded form")]
    NotForm,

    /// The request does not carry an `application/json` body.
    #[error("request is not json")]
    NotJson,

    #[error("body is not valid utf-8")]
    Utf8,

    #[error("form decoding failed: {source}")]
    Decode {
        #[from]
        source: DecodeError,
    },

    #[error("json deserialization failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Extension methods on [`Request`] for the common body shapes.
pub trait RequestExt {
    /// Parses the body as an urlencoded form into ordered pairs.
    fn form(&self) -> Result<Vec<(String, String)>, BodyError>;

    /// Deserializes the body as JSON.
    fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError>;
}

impl RequestExt for Request {
    fn form(&self) -> Result<Vec<(String, String)>, BodyError> {
        if !content_type_is(self, "application/x-www-form-urlencoded") {
            return Err(BodyError::NotForm);
        }
        let Some(body) = self.body() else {
            return Ok(Vec::new());
        };
        let raw = std::str::from_utf8(body).map_err(|_| BodyError::Utf8)?;
        Ok(parse_form(raw)?)
    }

    fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        if !content_type_is(self, "application/json") {
            return Err(BodyError::NotJson);
        }
        let body = self.body().ok_or(BodyError::NotJson)?;
        Ok(serde_json::from_slice(body)?)
    }
}

/// Compares the essence of the `Content-Type` header, ignoring parameters
/// such as `; charset=utf-8`.
fn content_type_is(request: &Request, expected: &str) -> bool {
    request
        .headers()
        .get("content-type")
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pico_http::protocol::{HeaderMap, Method, RequestHead, Version};
    use serde::Deserialize;

    fn request(content_type: Option<&str>, body: Option<&str>) -> Request {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.append("Content-Type", content_type);
        }
        RequestHead::new(Version::Http11, Method::Post, "/", headers)
            .body(body.map(|b| Bytes::copy_from_slice(b.as_bytes())))
    }

    #[test]
    fn form_requires_the_content_type() {
        let request = request(Some("text/plain"), Some("a=1"));
        assert!(matches!(request.form(), Err(BodyError::NotForm)));
    }

    #[test]
    fn form_parses_pairs() {
        let request = request(Some("application/x-www-form-urlencoded"), Some("name=hello+world&zip=42"));
        let pairs = request.form().unwrap();
        assert_eq!(
            pairs,
            vec![("name".to_string(), "hello world".to_string()), ("zip".to_string(), "42".to_string())]
        );
    }

    #[test]
    fn form_with_charset_parameter() {
        let request = request(Some("application/x-www-form-urlencoded; charset=utf-8"), Some("a=1"));
        assert!(request.form().is_ok());
    }

    #[test]
    fn json_deserializes() {
        #[derive(Deserialize)]
        struct User {
            name: String,
        }

        let request = request(Some("application/json"), Some(r#"{"name":"hello"}"#));
        let user: User = request.json().unwrap();
        assert_eq!(user.name, "hello");
    }

    #[test]
    fn json_requires_the_content_type() {
        let request = request(None, Some(r#"{"name":"hello"}"#));
        let result: Result<serde_json::Value, _> = request.json();
        assert!(matches!(result, Err(BodyError::NotJson)));
    }

    #[test]
    fn json_with_missing_body() {
        let request = request(Some("application/json"), None);
        let result: Result<serde_json::Value, _> = request.json();
        assert!(matches!(result, Err(BodyError::NotJson)));
    }
}
