//! Response head encoder.
//!
//! Serializes the status line and header section. The status line carries the
//! numeric code only — `"HTTP/1.1 200\r\n"` — no reason phrase; clients key on
//! the code and the phrase is dead weight on constrained links.
//!
//! The framing headers are forced to agree with the payload mode here:
//! `Content-Length` always matches a fixed body, `Transfer-Encoding: chunked`
//! always accompanies a streamed one, never both.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::FastWrite;
use crate::protocol::{PayloadSize, ResponseHead, SendError, Version};

/// Initial space reserved for a serialized head.
const INIT_HEAD_SIZE: usize = 4 * 1024;

/// Encoder for a [`ResponseHead`] plus the [`PayloadSize`] of the body that
/// follows it.
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, payload_size) = item;

        // chunked framing does not exist in HTTP/1.0
        if payload_size.is_chunked() && head.version() != Version::Http11 {
            return Err(SendError::UnsupportedEncoding);
        }

        dst.reserve(INIT_HEAD_SIZE);
        write!(FastWrite(dst), "{} {}\r\n", head.version(), head.status())?;

        match payload_size {
            PayloadSize::Length(n) => {
                head.headers_mut().set("Content-Length", n.to_string());
                head.headers_mut().remove("Transfer-Encoding");
            }
            PayloadSize::Chunked => {
                head.headers_mut().set("Transfer-Encoding", "chunked");
                head.headers_mut().remove("Content-Length");
            }
            PayloadSize::Empty => {
                head.headers_mut().set("Content-Length", "0");
                head.headers_mut().remove("Transfer-Encoding");
            }
        }

        for (name, value) in head.headers().iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
