//! Encoder for fixed-length payloads.

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::ensure;
use crate::protocol::{PayloadItem, SendError};

/// Writes body bytes verbatim until the declared `Content-Length` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    remaining: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

impl Encoder<PayloadItem> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.remaining == 0 {
            if item.is_chunk() {
                warn!("fixed-length body already complete, dropping extra payload");
            }
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                if bytes.is_empty() {
                    return Ok(());
                }
                ensure!(
                    bytes.len() as u64 <= self.remaining,
                    SendError::invalid_body("body exceeds the declared content-length")
                );
                self.remaining -= bytes.len() as u64;
                dst.extend_from_slice(&bytes);
                Ok(())
            }
            PayloadItem::Eof => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_writes_verbatim() {
        let mut encoder = LengthEncoder::new(5);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst).unwrap();
        assert_eq!(&dst[..], b"hello");
        assert!(encoder.is_finished());
    }

    #[test]
    fn test_rejects_overrun() {
        let mut encoder = LengthEncoder::new(3);
        let mut dst = BytesMut::new();

        let result = encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));
    }
}
