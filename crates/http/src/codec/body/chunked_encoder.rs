//! Encoder for chunked transfer coding.

use std::io::Write;

use bytes::BytesMut;
use tokio_util::codec::Encoder;

use crate::codec::FastWrite;
use crate::protocol::{PayloadItem, SendError};

/// Frames each chunk as `hex(len) CRLF data CRLF` and closes the body with
/// the zero-length frame `0\r\n\r\n` on [`PayloadItem::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finished(&self) -> bool {
        self.eof
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<PayloadItem> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                // a zero-length frame would terminate the body early, so
                // empty chunks are dropped rather than framed
                if bytes.is_empty() {
                    return Ok(());
                }
                write!(FastWrite(dst), "{:X}\r\n", bytes.len())?;
                dst.reserve(bytes.len() + 2);
                dst.extend_from_slice(&bytes);
                dst.extend_from_slice(b"\r\n");
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::body::ChunkedDecoder;
    use bytes::Bytes;
    use tokio_util::codec::Decoder;

    #[test]
    fn test_chunk_framing() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Eof, &mut dst).unwrap();

        assert_eq!(&dst[..], b"5\r\nhello\r\n0\r\n\r\n");
        assert!(encoder.is_finished());
    }

    #[test]
    fn test_size_prefix_is_hex() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        let chunk = Bytes::from(vec![b'x'; 26]);
        encoder.encode(PayloadItem::Chunk(chunk), &mut dst).unwrap();

        assert!(dst.starts_with(b"1A\r\n"));
    }

    #[test]
    fn test_nothing_is_written_after_eof() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Eof, &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"late")), &mut dst).unwrap();

        assert_eq!(&dst[..], b"0\r\n\r\n");
    }

    #[test]
    fn test_round_trip_with_empty_chunk() {
        // empty chunks must vanish rather than terminate the stream
        let chunks = [Bytes::from_static(b"abc"), Bytes::new(), Bytes::from_static(b"de")];

        let mut encoder = ChunkedEncoder::new();
        let mut wire = BytesMut::new();
        for chunk in chunks {
            encoder.encode(PayloadItem::Chunk(chunk), &mut wire).unwrap();
        }
        encoder.encode(PayloadItem::Eof, &mut wire).unwrap();

        assert!(wire.ends_with(b"0\r\n\r\n"));

        let mut decoder = ChunkedDecoder::new();
        let mut decoded = Vec::new();
        loop {
            match decoder.decode(&mut wire).unwrap().unwrap() {
                PayloadItem::Chunk(bytes) => decoded.extend_from_slice(&bytes),
                PayloadItem::Eof => break,
            }
        }

        assert_eq!(&decoded[..], b"abcde");
    }
}
