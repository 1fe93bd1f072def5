use std::cell::Cell;

use ntex_bytes::{Buf, BytesMut};
use ntex_codec::{Decoder, Encoder};

use crate::decode::decode_packet;
use crate::encode::{encode_to, Encode};
use crate::error::{DecodeError, EncodeError};
use crate::packet::Packet;
use crate::reader::PacketReader;
use crate::types::FixedHeader;
use crate::utils::decode_variable_length;

#[derive(Debug, Clone)]
/// Mqtt v3.1 protocol codec
///
/// Frames packets out of a growing byte buffer, for use with
/// `ntex_codec` framed transports.
pub struct Codec {
    state: Cell<DecodeState>,
    max_size: Cell<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DecodeState {
    FrameHeader,
    Frame(FixedHeader),
}

impl Codec {
    /// Create `Codec` instance
    pub fn new() -> Self {
        Codec { state: Cell::new(DecodeState::FrameHeader), max_size: Cell::new(0) }
    }

    /// Set max frame size.
    ///
    /// Applies to the remaining length of inbound and outbound packets.
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_size(&self, size: u32) {
        self.max_size.set(size);
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Codec {
    type Item = Packet;
    type Error = DecodeError;

    fn decode(&self, src: &mut BytesMut) -> Result<Option<Self::Item>, DecodeError> {
        loop {
            match self.state.get() {
                DecodeState::FrameHeader => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    let first_byte = src[0];
                    match decode_variable_length(&src[1..])? {
                        Some((remaining_length, consumed)) => {
                            let fixed = FixedHeader::from_first_byte(first_byte, remaining_length)?;

                            // check max message size
                            let max_size = self.max_size.get();
                            if max_size != 0 && max_size < remaining_length {
                                log::debug!(
                                    "MaxSizeExceeded max-size: {}, remaining: {}",
                                    max_size,
                                    remaining_length
                                );
                                return Err(DecodeError::MaxSizeExceeded);
                            }
                            src.advance(consumed + 1);
                            self.state.set(DecodeState::Frame(fixed));

                            let remaining_length = remaining_length as usize;
                            if src.len() < remaining_length {
                                // extend receiving buffer to fit the whole frame
                                src.reserve(remaining_length - src.len());
                                return Ok(None);
                            }
                        }
                        None => {
                            return Ok(None);
                        }
                    }
                }
                DecodeState::Frame(fixed) => {
                    let len = fixed.remaining_length as usize;
                    if src.len() < len {
                        return Ok(None);
                    }
                    let packet_buf = src.split_to(len).freeze();
                    self.state.set(DecodeState::FrameHeader);
                    src.reserve(2);

                    let mut body = packet_buf.as_ref();
                    let mut reader = PacketReader::new(&mut body, fixed.remaining_length);
                    let packet = decode_packet(&mut reader, fixed)?;
                    if reader.has_remaining() {
                        log::trace!(
                            "Ignored {} trailing bytes of {:?} packet",
                            reader.remaining(),
                            fixed.packet_type
                        );
                    }
                    return Ok(Some(packet));
                }
            }
        }
    }
}

impl Encoder for Codec {
    type Item = Packet;
    type Error = EncodeError;

    fn encode(&self, item: Self::Item, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let content_size = item.encoded_size();
        let max_size = self.max_size.get();
        if max_size != 0 && content_size > max_size as usize {
            return Err(EncodeError::MaxSizeExceeded(content_size));
        }
        encode_to(&item, dst)
    }
}
