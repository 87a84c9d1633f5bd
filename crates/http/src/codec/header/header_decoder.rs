//! Request head decoder.
//!
//! Parses the request line and header section out of the read buffer using
//! `httparse`, converts the result into the engine's own [`RequestHead`], and
//! selects the payload framing for the body that may follow.
//!
//! Unlike a naive byte-at-a-time line reader, parsing is bounded: a header
//! section larger than [`MAX_HEADER_BYTES`] or with more than
//! [`MAX_HEADER_NUM`] fields fails fast instead of growing the buffer until
//! memory runs out.

use std::mem::MaybeUninit;

use bytes::{Buf, BytesMut};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{HeaderMap, Method, ParseError, PayloadSize, RequestHead, Version};

/// Maximum number of header fields accepted in one request.
pub const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes of the request line plus header section.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for the head of a request, yielding the parsed [`RequestHead`]
/// together with the [`PayloadSize`] announced by its framing headers.
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a complete request head from `src`.
    ///
    /// Returns `Ok(None)` while the head is still incomplete. Errors:
    ///
    /// - [`ParseError::MalformedStartLine`] — request line does not split
    ///   into method, target and version
    /// - [`ParseError::MalformedHeaderLine`] — a header field without a valid
    ///   `name: value` shape
    /// - [`ParseError::UnsupportedMethod`] / [`ParseError::UnsupportedVersion`]
    ///   — token parsed but outside the supported set
    /// - [`ParseError::TooLargeHeader`] / [`ParseError::TooManyHeaders`] —
    ///   resource bounds exceeded
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut req = httparse::Request::new(&mut []);
        let mut headers: [MaybeUninit<httparse::Header<'_>>; MAX_HEADER_NUM] =
            [const { MaybeUninit::uninit() }; MAX_HEADER_NUM];

        let parsed = req.parse_with_uninit_headers(&src[..], &mut headers).map_err(map_httparse_error)?;

        match parsed {
            Status::Complete(head_len) => {
                ensure!(head_len <= MAX_HEADER_BYTES, ParseError::too_large_header(head_len, MAX_HEADER_BYTES));

                let version = match req.version {
                    Some(0) => Version::Http10,
                    Some(1) => Version::Http11,
                    other => return Err(ParseError::unsupported_version(format!("HTTP/1.{other:?}"))),
                };

                let method = Method::try_from(req.method.ok_or(ParseError::MalformedStartLine)?)?;
                let target = req.path.ok_or(ParseError::MalformedStartLine)?;

                let mut header_map = HeaderMap::with_capacity(req.headers.len());
                for header in req.headers.iter() {
                    let value = std::str::from_utf8(header.value)
                        .map_err(|_| ParseError::malformed_header("header value is not valid utf-8"))?;
                    header_map.append(header.name, value);
                }

                let head = RequestHead::new(version, method, target, header_map);
                let payload_size = parse_payload(&head)?;

                src.advance(head_len);
                trace!(head_len, "decoded request head");
                Ok(Some((head, payload_size)))
            }
            Status::Partial => {
                // an attacker cannot grow the head indefinitely
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

fn map_httparse_error(e: httparse::Error) -> ParseError {
    match e {
        httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        httparse::Error::HeaderName | httparse::Error::HeaderValue => ParseError::malformed_header(e.to_string()),
        httparse::Error::Version => ParseError::unsupported_version("unrecognized version token"),
        // token and newline faults surface while the request line is read
        _ => ParseError::MalformedStartLine,
    }
}

/// Selects the payload framing announced by the head.
///
/// `Content-Length: n` (n > 0) wins a fixed-length body; a
/// `Transfer-Encoding` ending in `chunked` wins a chunked body; both headers
/// at once are a framing conflict and rejected, per RFC 9112 §6.
fn parse_payload(head: &RequestHead) -> Result<PayloadSize, ParseError> {
    let te_header = head.headers().get("transfer-encoding");
    let cl_header = head.headers().get("content-length");

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::Empty),

        (Some(te_value), None) => {
            if is_chunked(te_value) { Ok(PayloadSize::Chunked) } else { Ok(PayloadSize::Empty) }
        }

        (None, Some(cl_value)) => {
            let length = cl_value
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_value} is not u64")))?;
            if length == 0 { Ok(PayloadSize::Empty) } else { Ok(PayloadSize::Length(length)) }
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer-encoding and content-length both present"))
        }
    }
}

/// Chunked must be the final coding listed to count, per RFC 9112 §6.1.
fn is_chunked(value: &str) -> bool {
    value.rsplit(',').next().is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}
