use std::io::Write;

use ntex_bytes::{BufMut, Bytes, BytesMut};

use crate::error::EncodeError;
use crate::packet::*;
use crate::types::{ConnectFlags, MAX_PACKET_SIZE};
use crate::utils::{var_int_len, write_variable_length};
use crate::validate::validate_packet;

pub(crate) trait Encode {
    fn encoded_size(&self) -> usize;

    fn encode(&self, buf: &mut BytesMut);
}

/// Encode packet into a new buffer.
pub fn encode(packet: &Packet) -> Result<Bytes, EncodeError> {
    let mut dst = BytesMut::new();
    encode_to(packet, &mut dst)?;
    Ok(dst.freeze())
}

/// Encode packet and write it to `dst` with a single `write_all`.
///
/// Nothing is written if the packet fails validation.
pub fn encode_write<W: Write + ?Sized>(dst: &mut W, packet: &Packet) -> Result<(), EncodeError> {
    let buf = encode(packet)?;
    dst.write_all(&buf)?;
    Ok(())
}

/// Append encoded packet to `dst`.
///
/// `dst` is left untouched if the packet fails validation.
pub fn encode_to(packet: &Packet, dst: &mut BytesMut) -> Result<(), EncodeError> {
    validate_packet(packet)?;

    let content_size = packet.encoded_size();
    ensure!(content_size <= MAX_PACKET_SIZE as usize, EncodeError::MessageTooLong(content_size));

    let header = packet.fixed_header(content_size as u32);
    log::debug!(
        "write FixedHeader {{ type={:?}, first_byte={:#04x}, remaining_length={} }}",
        header.packet_type,
        header.first_byte(),
        content_size
    );

    dst.reserve(1 + var_int_len(header.remaining_length) + content_size);
    dst.put_u8(header.first_byte());
    write_variable_length(header.remaining_length, dst);
    packet.encode(dst);
    Ok(())
}

impl Encode for Packet {
    fn encoded_size(&self) -> usize {
        match self {
            Packet::Connect(connect) => connect.encoded_size(),
            Packet::Publish(publish) => publish.encoded_size(),

            Packet::ConnectAck { .. } | // Reserved + Return Code
            Packet::PublishAck { .. } | // Packet Id
            Packet::PublishReceived { .. } | // Packet Id
            Packet::PublishRelease { .. } | // Packet Id
            Packet::PublishComplete { .. } | // Packet Id
            Packet::UnsubscribeAck { .. } => 2, // Packet Id

            Packet::Subscribe { packet_id, topic_filters } => {
                packet_id.map_or(0, |_| 2)
                    + topic_filters
                        .iter()
                        .fold(0, |acc, (filter, _)| acc + filter.encoded_size() + 1)
            }

            Packet::SubscribeAck { status, .. } => 2 + status.len(),

            Packet::Unsubscribe { packet_id, topic_filters } => {
                packet_id.map_or(0, |_| 2)
                    + topic_filters.iter().fold(0, |acc, filter| acc + filter.encoded_size())
            }

            Packet::PingRequest | Packet::PingResponse | Packet::Disconnect => 0,
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        match self {
            Packet::Connect(connect) => connect.encode(dst),
            Packet::ConnectAck { return_code } => {
                dst.put_slice(&[0, u8::from(*return_code)]);
            }
            Packet::Publish(publish) => publish.encode(dst),
            Packet::PublishAck { packet_id }
            | Packet::PublishReceived { packet_id }
            | Packet::PublishRelease { packet_id }
            | Packet::PublishComplete { packet_id }
            | Packet::UnsubscribeAck { packet_id } => {
                dst.put_u16(*packet_id);
            }
            Packet::Subscribe { packet_id, topic_filters } => {
                if let Some(packet_id) = packet_id {
                    dst.put_u16(*packet_id);
                }
                for (filter, qos) in topic_filters {
                    filter.encode(dst);
                    dst.put_u8((*qos).into());
                }
            }
            Packet::SubscribeAck { packet_id, status } => {
                dst.put_u16(*packet_id);
                for code in status {
                    dst.put_u8((*code).into());
                }
            }
            Packet::Unsubscribe { packet_id, topic_filters } => {
                if let Some(packet_id) = packet_id {
                    dst.put_u16(*packet_id);
                }
                for filter in topic_filters {
                    filter.encode(dst);
                }
            }
            Packet::PingRequest | Packet::PingResponse | Packet::Disconnect => {}
        }
    }
}

impl Encode for Connect {
    fn encoded_size(&self) -> usize {
        let Connect { protocol_name, last_will, client_id, username, password, .. } = self;

        // Protocol Name + Protocol Level + Connect Flags + Keep Alive
        let mut n = protocol_name.encoded_size() + 1 + 1 + 2;

        // Client Id
        n += client_id.encoded_size();

        // Will Topic + Will Message
        if let Some(LastWill { topic, message, .. }) = last_will {
            n += topic.encoded_size() + message.encoded_size();
        }

        if let Some(s) = username {
            n += s.encoded_size();
        }

        if let Some(s) = password {
            n += s.encoded_size();
        }

        n
    }

    fn encode(&self, dst: &mut BytesMut) {
        let Connect {
            protocol_name,
            protocol_level,
            clean_session,
            keep_alive,
            last_will,
            client_id,
            username,
            password,
        } = self;

        protocol_name.encode(dst);

        let mut flags = ConnectFlags::empty();
        flags.set(ConnectFlags::USERNAME, username.is_some());
        flags.set(ConnectFlags::PASSWORD, password.is_some());
        flags.set(ConnectFlags::CLEAN_SESSION, *clean_session);
        if let Some(will) = last_will {
            flags.set(ConnectFlags::WILL_RETAIN, will.retain);
            flags = flags.with_will_qos(will.qos) | ConnectFlags::WILL;
        }

        dst.put_slice(&[*protocol_level, flags.bits()]);
        dst.put_u16(*keep_alive);

        client_id.encode(dst);

        if let Some(LastWill { topic, message, .. }) = last_will {
            topic.encode(dst);
            message.encode(dst);
        }

        if let Some(s) = username {
            s.encode(dst);
        }

        if let Some(s) = password {
            s.encode(dst);
        }
    }
}

impl Encode for Publish {
    fn encoded_size(&self) -> usize {
        // Topic + Packet Id + Payload
        self.topic.encoded_size() + self.packet_id.map_or(0, |_| 2) + self.payload.len()
    }

    fn encode(&self, dst: &mut BytesMut) {
        self.topic.encode(dst);
        if let Some(packet_id) = self.packet_id {
            dst.put_u16(packet_id);
        }
        dst.put_slice(&self.payload);
    }
}

/// Length prefixed byte string
impl Encode for Bytes {
    fn encoded_size(&self) -> usize {
        2 + self.len()
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u16(self.len() as u16);
        dst.put_slice(self);
    }
}
