//! Response construction helpers.
//!
//! [`ResponseMaker`] is the convenience layer handlers build responses with.
//! It remembers the request's protocol version so framing decisions —
//! chunked versus fixed-length — can be rejected at construction time rather
//! than blowing up during serialization.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::ensure;
use crate::protocol::{BuildError, ChunkStream, Response, ResponseBody, StatusCode, Version};

/// Read size for streamed files.
const FILE_CHUNK_SIZE: usize = 8 * 1024;

/// Per-request response factory handed to handlers.
#[derive(Debug, Clone, Copy)]
pub struct ResponseMaker {
    version: Version,
}

impl ResponseMaker {
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// A bodyless response.
    pub fn no_content(&self, status: u16) -> Result<Response, BuildError> {
        Ok(Response::new(self.version, StatusCode::new(status)?))
    }

    /// A fixed-length body. `Content-Type` is set only when absent;
    /// `Content-Length` is always overwritten to match the body.
    pub fn content(&self, status: u16, content_type: &str, body: impl Into<Bytes>) -> Result<Response, BuildError> {
        let mut response = self.no_content(status)?;
        let body = body.into();
        if !response.headers().contains("content-type") {
            response.headers_mut().set("Content-Type", content_type);
        }
        response.headers_mut().set("Content-Length", body.len().to_string());
        response.set_body(ResponseBody::Full(body));
        Ok(response)
    }

    pub fn text(&self, status: u16, text: impl Into<String>) -> Result<Response, BuildError> {
        self.content(status, mime::TEXT_PLAIN_UTF_8.as_ref(), text.into())
    }

    pub fn html(&self, status: u16, html: impl Into<String>) -> Result<Response, BuildError> {
        self.content(status, mime::TEXT_HTML_UTF_8.as_ref(), html.into())
    }

    pub fn json<T: Serialize>(&self, status: u16, value: &T) -> Result<Response, BuildError> {
        let body = serde_json::to_vec(value)?;
        self.content(status, mime::APPLICATION_JSON.as_ref(), body)
    }

    /// A chunked streaming body; only expressible over HTTP/1.1.
    pub fn content_stream(&self, status: u16, content_type: &str, stream: ChunkStream) -> Result<Response, BuildError> {
        ensure!(self.version == Version::Http11, BuildError::UnsupportedEncoding);

        let mut response = self.no_content(status)?;
        if !response.headers().contains("content-type") {
            response.headers_mut().set("Content-Type", content_type);
        }
        response.headers_mut().set("Transfer-Encoding", "chunked");
        response.set_body(ResponseBody::Stream(stream));
        Ok(response)
    }

    /// Streams a file as a chunked `200` body.
    ///
    /// The file handle lives inside the stream and is closed when the stream
    /// is dropped. A read failure while streaming surfaces as a stream abort,
    /// never as a silently truncated body.
    pub async fn file(&self, path: impl AsRef<Path>, content_type: &str) -> Result<Response, BuildError> {
        ensure!(self.version == Version::Http11, BuildError::UnsupportedEncoding);

        let file = tokio::fs::File::open(path).await?;
        let stream = ChunkStream::new(ReaderStream::with_capacity(file, FILE_CHUNK_SIZE));
        self.content_stream(200, content_type, stream)
    }

    /// A redirect to `url`; `status` must be in the 3xx range.
    pub fn redirect(&self, status: u16, url: &str) -> Result<Response, BuildError> {
        let status = StatusCode::new(status)?;
        ensure!(
            status.is_redirect(),
            BuildError::invalid_argument(format!("status code {status} given for redirect, must be 300-399"))
        );

        let mut response = Response::new(self.version, status);
        response.headers_mut().set("Location", url);
        Ok(response)
    }
}
