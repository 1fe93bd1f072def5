use std::io::Read;

use ntex_bytes::Bytes;

use crate::error::DecodeError;
use crate::packet::*;
use crate::reader::{Decode, PacketReader};
use crate::types::{ConnectFlags, FixedHeader, PacketType, QoS};
use crate::utils::{decode_variable_length, MAX_VARIABLE_LENGTH_BYTES};

/// Decode one packet from a byte slice.
///
/// Bytes following the packet are ignored.
pub fn decode(src: &[u8]) -> Result<Packet, DecodeError> {
    let mut src = src;
    decode_read(&mut src)
}

/// Decode one packet from a byte source.
///
/// Reads exactly the bytes of a single packet, so consecutive calls on the
/// same source yield consecutive packets.
pub fn decode_read<R: Read + ?Sized>(src: &mut R) -> Result<Packet, DecodeError> {
    let header = read_fixed_header(src)?;
    let mut reader = PacketReader::new(src, header.remaining_length);
    let packet = decode_packet(&mut reader, header)?;
    if reader.has_remaining() {
        let skipped = reader.skip_remaining()?;
        log::trace!("Skipped {} trailing bytes of {:?} packet", skipped, header.packet_type);
    }
    Ok(packet)
}

/// Read the first header byte and the remaining length.
pub fn read_fixed_header<R: Read + ?Sized>(src: &mut R) -> Result<FixedHeader, DecodeError> {
    let mut first_byte = [0u8; 1];
    src.read_exact(&mut first_byte)?;

    let mut buf = [0u8; MAX_VARIABLE_LENGTH_BYTES];
    for idx in 0..MAX_VARIABLE_LENGTH_BYTES {
        src.read_exact(&mut buf[idx..=idx])?;
        if let Some((remaining_length, _)) = decode_variable_length(&buf[..=idx])? {
            let header = FixedHeader::from_first_byte(first_byte[0], remaining_length)?;
            log::trace!("Decoded {:?}", header);
            return Ok(header);
        }
    }
    // decode_variable_length rejects a fourth continuation byte
    Err(DecodeError::LengthEncodingExceeded)
}

/// Decode packet body described by `header`.
pub(crate) fn decode_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
    header: FixedHeader,
) -> Result<Packet, DecodeError> {
    match header.packet_type {
        PacketType::Connect => decode_connect_packet(src),
        PacketType::ConnectAck => decode_connect_ack_packet(src),
        PacketType::Publish => decode_publish_packet(src, header),
        PacketType::PublishAck => Ok(Packet::PublishAck { packet_id: u16::decode(src)? }),
        PacketType::PublishReceived => {
            Ok(Packet::PublishReceived { packet_id: u16::decode(src)? })
        }
        PacketType::PublishRelease => {
            Ok(Packet::PublishRelease { packet_id: u16::decode(src)? })
        }
        PacketType::PublishComplete => {
            Ok(Packet::PublishComplete { packet_id: u16::decode(src)? })
        }
        PacketType::Subscribe => decode_subscribe_packet(src, header.qos),
        PacketType::SubscribeAck => decode_subscribe_ack_packet(src),
        PacketType::Unsubscribe => decode_unsubscribe_packet(src, header.qos),
        PacketType::UnsubscribeAck => {
            Ok(Packet::UnsubscribeAck { packet_id: u16::decode(src)? })
        }
        PacketType::PingRequest => Ok(Packet::PingRequest),
        PacketType::PingResponse => Ok(Packet::PingResponse),
        PacketType::Disconnect => Ok(Packet::Disconnect),
    }
}

fn decode_connect_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
) -> Result<Packet, DecodeError> {
    let protocol_name = Bytes::decode(src)?;
    let protocol_level = u8::decode(src)?;
    let flags = ConnectFlags::from_bits_retain(u8::decode(src)?);
    let will_qos = flags.will_qos()?;
    let keep_alive = u16::decode(src)?;
    let client_id = Bytes::decode(src)?;

    let last_will = if flags.contains(ConnectFlags::WILL) {
        let topic = Bytes::decode(src)?;
        let message = Bytes::decode(src)?;
        Some(LastWill {
            qos: will_qos,
            retain: flags.contains(ConnectFlags::WILL_RETAIN),
            topic,
            message,
        })
    } else {
        None
    };
    let username = if flags.contains(ConnectFlags::USERNAME) {
        Some(Bytes::decode(src)?)
    } else {
        None
    };
    let password = if flags.contains(ConnectFlags::PASSWORD) {
        Some(Bytes::decode(src)?)
    } else {
        None
    };
    Ok(Packet::Connect(Box::new(Connect {
        protocol_name,
        protocol_level,
        clean_session: flags.contains(ConnectFlags::CLEAN_SESSION),
        keep_alive,
        last_will,
        client_id,
        username,
        password,
    })))
}

fn decode_connect_ack_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
) -> Result<Packet, DecodeError> {
    let _reserved = u8::decode(src)?;
    let return_code = ConnectAckReason::try_from(u8::decode(src)?)?;
    Ok(Packet::ConnectAck { return_code })
}

fn decode_publish_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
    header: FixedHeader,
) -> Result<Packet, DecodeError> {
    let topic = Bytes::decode(src)?;
    let packet_id = if header.qos.has_packet_id() { Some(u16::decode(src)?) } else { None };

    Ok(Packet::Publish(Publish {
        dup: header.dup,
        qos: header.qos,
        retain: header.retain,
        topic,
        packet_id,
        payload: src.take_remaining()?,
    }))
}

fn decode_subscribe_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
    qos: QoS,
) -> Result<Packet, DecodeError> {
    let packet_id = if qos.has_packet_id() { Some(u16::decode(src)?) } else { None };
    let mut topic_filters = Vec::new();
    while src.has_remaining() {
        let topic = Bytes::decode(src)?;
        // requested qos must be 0, 1 or 2, it is never kept as a raw byte
        let qos = QoS::try_from(u8::decode(src)?)?;
        topic_filters.push((topic, qos));
    }

    Ok(Packet::Subscribe { packet_id, topic_filters })
}

fn decode_subscribe_ack_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
) -> Result<Packet, DecodeError> {
    let packet_id = u16::decode(src)?;
    let mut status = Vec::new();
    while src.has_remaining() {
        let code = u8::decode(src)?;
        // anything besides 0x80 must be a granted qos
        status.push(if code == SubscribeReturnCode::FAILURE {
            SubscribeReturnCode::Failure
        } else {
            SubscribeReturnCode::Success(QoS::try_from(code)?)
        });
    }
    Ok(Packet::SubscribeAck { packet_id, status })
}

fn decode_unsubscribe_packet<R: Read + ?Sized>(
    src: &mut PacketReader<'_, R>,
    qos: QoS,
) -> Result<Packet, DecodeError> {
    let packet_id = if qos.has_packet_id() { Some(u16::decode(src)?) } else { None };
    let mut topic_filters = Vec::new();
    while src.has_remaining() {
        topic_filters.push(Bytes::decode(src)?);
    }
    Ok(Packet::Unsubscribe { packet_id, topic_filters })
}
