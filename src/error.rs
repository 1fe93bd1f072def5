use std::io;

/// Errors produced while reading a packet.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Packet type nibble is 0 or 15
    #[error("Invalid packet type: {0}")]
    InvalidPacketType(u8),
    /// QoS value is not 0, 1 or 2
    #[error("Invalid QoS: {0}")]
    InvalidQoS(u8),
    /// Will QoS bits of connect flags hold 3
    #[error("Invalid will QoS: {0}")]
    InvalidWillQoS(u8),
    #[error("Invalid connect return code: {0}")]
    InvalidConnectAckCode(u8),
    /// Remaining length field needs more than 4 bytes
    #[error("Remaining length field exceeded maximum of 4 bytes")]
    LengthEncodingExceeded,
    /// Field does not fit into the remaining packet length, or the source
    /// ended before the declared packet length was read
    #[error("Data exceeds packet length")]
    DataExceedsPacket,
    #[error("Max size exceeded")]
    MaxSizeExceeded,
    /// Error of the underlying byte source
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors produced while writing a packet.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Packet id is required")]
    PacketIdRequired,
    /// Publish packet with QoS 0 carries packet id
    #[error("Packet id is not allowed for QoS 0")]
    PacketIdNotAllowed,
    /// Length prefixed field is longer than 65535 bytes
    #[error("String is too long: {0} bytes")]
    StringTooLong(usize),
    /// Packet body is longer than the remaining length field can express
    #[error("Message is too long: {0} bytes")]
    MessageTooLong(usize),
    #[error("Max size exceeded: {0} bytes")]
    MaxSizeExceeded(usize),
    /// Error of the underlying byte sink
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
}

impl PartialEq for DecodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DecodeError::InvalidPacketType(a), DecodeError::InvalidPacketType(b)) => a == b,
            (DecodeError::InvalidQoS(a), DecodeError::InvalidQoS(b)) => a == b,
            (DecodeError::InvalidWillQoS(a), DecodeError::InvalidWillQoS(b)) => a == b,
            (DecodeError::InvalidConnectAckCode(a), DecodeError::InvalidConnectAckCode(b)) => {
                a == b
            }
            (DecodeError::LengthEncodingExceeded, DecodeError::LengthEncodingExceeded) => true,
            (DecodeError::DataExceedsPacket, DecodeError::DataExceedsPacket) => true,
            (DecodeError::MaxSizeExceeded, DecodeError::MaxSizeExceeded) => true,
            (DecodeError::Io(a), DecodeError::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl PartialEq for EncodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EncodeError::PacketIdRequired, EncodeError::PacketIdRequired) => true,
            (EncodeError::PacketIdNotAllowed, EncodeError::PacketIdNotAllowed) => true,
            (EncodeError::StringTooLong(a), EncodeError::StringTooLong(b)) => a == b,
            (EncodeError::MessageTooLong(a), EncodeError::MessageTooLong(b)) => a == b,
            (EncodeError::MaxSizeExceeded(a), EncodeError::MaxSizeExceeded(b)) => a == b,
            (EncodeError::Io(a), EncodeError::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
