use bytes::Bytes;

/// One decoded or to-be-encoded protocol item: either a message head or a
/// piece of payload.
///
/// `T` is the head type — `(RequestHead, PayloadSize)` on the read side,
/// `(ResponseHead, PayloadSize)` on the write side.
pub enum Message<T> {
    Head(T),
    Payload(PayloadItem),
}

impl<T> Message<T> {
    #[inline]
    pub fn is_head(&self) -> bool {
        matches!(self, Message::Head(_))
    }

    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    pub fn into_payload_item(self) -> Option<PayloadItem> {
        match self {
            Message::Head(_) => None,
            Message::Payload(item) => Some(item),
        }
    }
}

/// One item of a payload stream: a chunk of bytes, or the end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    Chunk(Bytes),
    Eof,
}

impl PayloadItem {
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

/// How a message's payload is framed on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Fixed-length payload, delimited by `Content-Length`.
    Length(u64),
    /// Chunked transfer coding.
    Chunked,
    /// No payload at all.
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}
