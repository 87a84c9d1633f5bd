//! Framing-dispatch for request payload decoding.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::{ChunkedDecoder, LengthDecoder};
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// Decodes a request payload with whichever framing the head announced.
///
/// An `Empty` payload yields [`PayloadItem::Eof`] straight away, so the
/// connection loop can drain every request body the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    Empty,
}

impl PayloadDecoder {
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn fixed(length: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(length)) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::Empty)
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(size: PayloadSize) -> Self {
        match size {
            PayloadSize::Length(n) => Self::fixed(n),
            PayloadSize::Chunked => Self::chunked(),
            PayloadSize::Empty => Self::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode(src),
            Kind::Chunked(decoder) => decoder.decode(src),
            Kind::Empty => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_eof() {
        let mut decoder = PayloadDecoder::from(PayloadSize::Empty);
        let mut buffer = BytesMut::new();
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_from_payload_size() {
        assert!(PayloadDecoder::from(PayloadSize::Empty).is_empty());
        assert!(!PayloadDecoder::from(PayloadSize::Chunked).is_empty());
        assert!(!PayloadDecoder::from(PayloadSize::Length(1)).is_empty());
    }
}
