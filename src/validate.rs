//! Checks run on a packet before any of its bytes are produced.
//!
//! Packet type, header QoS and will QoS can not hold invalid values once
//! they are typed; raw values are rejected by the `TryFrom<u8>` conversions.
//! What is left are the constraints the wire format puts on typed values.
use ntex_bytes::Bytes;

use crate::error::EncodeError;
use crate::packet::{Connect, LastWill, Packet, Publish};

const MAX_STRING_LEN: usize = u16::MAX as usize;

pub(crate) fn validate_packet(packet: &Packet) -> Result<(), EncodeError> {
    match packet {
        Packet::Connect(connect) => validate_connect(connect),
        Packet::Publish(publish) => validate_publish(publish),
        Packet::Subscribe { topic_filters, .. } => {
            topic_filters.iter().try_for_each(|(filter, _)| validate_string(filter))
        }
        Packet::Unsubscribe { topic_filters, .. } => {
            topic_filters.iter().try_for_each(validate_string)
        }
        Packet::ConnectAck { .. }
        | Packet::PublishAck { .. }
        | Packet::PublishReceived { .. }
        | Packet::PublishRelease { .. }
        | Packet::PublishComplete { .. }
        | Packet::SubscribeAck { .. }
        | Packet::UnsubscribeAck { .. }
        | Packet::PingRequest
        | Packet::PingResponse
        | Packet::Disconnect => Ok(()),
    }
}

fn validate_connect(connect: &Connect) -> Result<(), EncodeError> {
    validate_string(&connect.protocol_name)?;
    validate_string(&connect.client_id)?;
    if let Some(LastWill { ref topic, ref message, .. }) = connect.last_will {
        validate_string(topic)?;
        validate_string(message)?;
    }
    if let Some(ref username) = connect.username {
        validate_string(username)?;
    }
    if let Some(ref password) = connect.password {
        validate_string(password)?;
    }
    Ok(())
}

fn validate_publish(publish: &Publish) -> Result<(), EncodeError> {
    match (publish.qos.has_packet_id(), publish.packet_id) {
        (true, None) => return Err(EncodeError::PacketIdRequired),
        (false, Some(_)) => return Err(EncodeError::PacketIdNotAllowed),
        _ => (),
    }
    validate_string(&publish.topic)
}

fn validate_string(s: &Bytes) -> Result<(), EncodeError> {
    ensure!(s.len() <= MAX_STRING_LEN, EncodeError::StringTooLong(s.len()));
    Ok(())
}
