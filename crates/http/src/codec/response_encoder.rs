//! Response encoder: head first, then payload.

use std::io;
use std::io::ErrorKind;

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadItem, PayloadSize, ResponseHead, SendError};

pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl Encoder<Message<(ResponseHead, PayloadSize)>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize)>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Head((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expected payload item but received a response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.header_encoder.encode((head, payload_size), dst)?;

                let payload_encoder = PayloadEncoder::from(payload_size);
                // a bodyless response is complete after its head
                if !payload_encoder.is_finished() {
                    self.payload_encoder = Some(payload_encoder);
                }
                Ok(())
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expected response head but received a payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let result = payload_encoder.encode(payload_item, dst);

                if payload_encoder.is_finished() {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}
