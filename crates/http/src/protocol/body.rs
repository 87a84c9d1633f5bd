//! Response payload representations.

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::protocol::PayloadSize;

/// A forward-only sequence of body chunks, consumed exactly once while the
/// response is serialized.
///
/// Any backing resource (an open file, for instance) lives inside the stream
/// and is released when it is dropped — whether the stream was fully drained,
/// failed mid-way, or was abandoned because the connection went away. A chunk
/// yielding `Err` aborts the response rather than truncating it silently.
pub struct ChunkStream {
    inner: BoxStream<'static, io::Result<Bytes>>,
}

impl ChunkStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self { inner: stream.boxed() }
    }

    /// Wraps already-materialized chunks; handy for generated content.
    pub fn from_iter<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    pub(crate) async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.inner.next().await
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkStream")
    }
}

/// Response payload in one of the two mutually exclusive framing modes, or
/// nothing at all.
///
/// A fixed body is written in one piece under `Content-Length`; a stream is
/// written as chunked transfer coding. The variant decides the framing, so
/// the two modes cannot be combined on one response.
#[derive(Debug)]
pub enum ResponseBody {
    Empty,
    Full(Bytes),
    Stream(ChunkStream),
}

impl ResponseBody {
    /// The wire framing this body requires.
    pub fn payload_size(&self) -> PayloadSize {
        match self {
            ResponseBody::Empty => PayloadSize::Empty,
            ResponseBody::Full(bytes) if bytes.is_empty() => PayloadSize::Empty,
            ResponseBody::Full(bytes) => PayloadSize::Length(bytes.len() as u64),
            ResponseBody::Stream(_) => PayloadSize::Chunked,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ResponseBody::Stream(_))
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Full(bytes)
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        ResponseBody::Full(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        if value.is_empty() { ResponseBody::Empty } else { ResponseBody::Full(Bytes::from_static(value.as_bytes())) }
    }
}

impl From<()> for ResponseBody {
    fn from(_: ()) -> Self {
        ResponseBody::Empty
    }
}
