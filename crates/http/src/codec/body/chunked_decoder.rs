//! Decoder for chunked transfer coding (RFC 9112 §7.1).
//!
//! Each chunk is a hex size line, the data, and a CRLF; a zero-size chunk
//! closes the body. Chunk extensions and trailer fields are tolerated and
//! discarded.

use std::cmp;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

/// Streaming chunked-coding decoder.
///
/// Yields [`PayloadItem::Chunk`] for every piece of chunk data as it becomes
/// available (a single chunk may surface as several pieces) and
/// [`PayloadItem::Eof`] once the terminal `0\r\n\r\n` was consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: State,
    remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Hex digits of the chunk size.
    Size,
    /// Anything between the size and its CR; extensions are skipped.
    Extension,
    /// LF closing the size line.
    SizeLf,
    /// Chunk data.
    Data,
    /// CR after the chunk data.
    DataCr,
    /// LF after the chunk data.
    DataLf,
    /// A trailer field after the last chunk.
    Trailer,
    /// LF closing a trailer field.
    TrailerLf,
    /// CR of the final empty line.
    EndCr,
    /// LF of the final empty line.
    EndLf,
    /// Terminal state.
    End,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: State::Size, remaining: 0 }
    }

    fn push_hex_digit(&mut self, digit: u64) -> Result<(), ParseError> {
        self.remaining = self
            .remaining
            .checked_mul(16)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| ParseError::invalid_body("chunk size overflow"))?;
        Ok(())
    }

    fn step(&mut self, byte: u8) -> Result<State, ParseError> {
        use State::*;
        Ok(match (self.state, byte) {
            (Size, b @ b'0'..=b'9') => {
                self.push_hex_digit((b - b'0') as u64)?;
                Size
            }
            (Size, b @ b'a'..=b'f') => {
                self.push_hex_digit((b - b'a' + 10) as u64)?;
                Size
            }
            (Size, b @ b'A'..=b'F') => {
                self.push_hex_digit((b - b'A' + 10) as u64)?;
                Size
            }
            (Size, b' ' | b'\t' | b';') => Extension,
            (Size, b'\r') => SizeLf,
            (Size, _) => return Err(ParseError::invalid_body("invalid chunk size line")),

            // extensions are ignored, but a bare LF inside one is rejected so
            // that sloppy peers cannot smuggle line endings past us
            (Extension, b'\n') => return Err(ParseError::invalid_body("bare LF in chunk extension")),
            (Extension, b'\r') => SizeLf,
            (Extension, _) => Extension,

            (SizeLf, b'\n') => {
                if self.remaining == 0 {
                    EndCr
                } else {
                    Data
                }
            }
            (SizeLf, _) => return Err(ParseError::invalid_body("chunk size line missing LF")),

            (DataCr, b'\r') => DataLf,
            (DataCr, _) => return Err(ParseError::invalid_body("chunk data missing CR")),
            (DataLf, b'\n') => Size,
            (DataLf, _) => return Err(ParseError::invalid_body("chunk data missing LF")),

            (EndCr, b'\r') => EndLf,
            (EndCr, _) => Trailer,
            (EndLf, b'\n') => End,
            (EndLf, _) => return Err(ParseError::invalid_body("chunked body missing final LF")),

            (Trailer, b'\r') => TrailerLf,
            (Trailer, _) => Trailer,
            (TrailerLf, b'\n') => EndCr,
            (TrailerLf, _) => return Err(ParseError::invalid_body("trailer field missing LF")),

            // Data and End never reach step()
            (Data, _) | (End, _) => self.state,
        })
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == State::End {
                trace!("finished reading chunked body");
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                return Ok(None);
            }

            if self.state == State::Data {
                let len = cmp::min(self.remaining, src.len() as u64) as usize;
                let bytes = src.split_to(len).freeze();
                self.remaining -= bytes.len() as u64;
                if self.remaining == 0 {
                    self.state = State::DataCr;
                }
                trace!(len = bytes.len(), "decoded chunk data");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }

            let byte = src.get_u8();
            self.state = self.step(byte)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_single_chunk() {
        let mut buffer = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"1234567890abcdef");

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_multiple_chunks() {
        let mut buffer = BytesMut::from(&b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.into_bytes().unwrap(), Bytes::from_static(b"hello"));

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.into_bytes().unwrap(), Bytes::from_static(b", world"));

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_uppercase_hex_size() {
        let mut buffer = BytesMut::from(&b"A\r\n0123456789\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().len(), 10);
    }

    #[test]
    fn test_chunk_extension_is_skipped() {
        let mut buffer = BytesMut::from(&b"5;ext=value\r\nhello\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"hello");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_trailers_are_skipped() {
        let mut buffer = BytesMut::from(&b"5\r\nhello\r\n0\r\nExpires: never\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"hello");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_incomplete_chunk_resumes() {
        let mut buffer = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"hel");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"lo\r\n0\r\n\r\n");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"lo");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_invalid_size_line() {
        let mut buffer = BytesMut::from(&b"xyz\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn test_missing_crlf_after_data() {
        let mut buffer = BytesMut::from(&b"5\r\nhelloBad"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"hello");
        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn test_size_overflow() {
        let mut buffer = BytesMut::from(&b"fffffffffffffffff\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn test_zero_chunk_only() {
        let mut buffer = BytesMut::from(&b"0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }
}
