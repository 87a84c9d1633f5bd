//! Wire codec: streaming decode of requests and encode of responses.
//!
//! Both halves are state machines over byte buffers, plugged into
//! `tokio_util`'s [`Decoder`](tokio_util::codec::Decoder) and
//! [`Encoder`](tokio_util::codec::Encoder) traits:
//!
//! - [`RequestDecoder`] first parses the head via the [`header`] module, then
//!   switches to the payload decoder selected by the head's framing headers.
//! - [`ResponseEncoder`] serializes a response head and then frames payload
//!   chunks either under `Content-Length` or as chunked transfer coding.

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;

use bytes::{BufMut, BytesMut};
use std::io;

/// `io::Write` adapter over `BytesMut`, so `write!` can format straight into
/// the output buffer. Writes cannot fail; space was reserved by the caller.
pub(crate) struct FastWrite<'a>(pub &'a mut BytesMut);

impl io::Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
