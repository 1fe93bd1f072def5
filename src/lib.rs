//! MQTT v3.1 control packet codec
//!
//! Packets are decoded from any `std::io::Read` source or from an in-memory
//! buffer, and encoded into `BytesMut` or any `std::io::Write` sink.
//! [`Codec`] frames packets for `ntex_codec` based transports.

#[macro_use]
mod utils;

mod codec;
mod decode;
mod encode;
mod error;
mod packet;
mod reader;
mod types;
mod validate;

pub use self::codec::Codec;
pub use self::decode::{decode, decode_read, read_fixed_header};
pub use self::encode::{encode, encode_to, encode_write};
pub use self::error::{DecodeError, EncodeError};
pub use self::packet::{
    Connect, ConnectAckReason, LastWill, Packet, Publish, SubscribeReturnCode,
};
pub use self::types::{
    ConnectFlags, FixedHeader, PacketType, QoS, MAX_PACKET_SIZE, MQISDP, MQTT_LEVEL_31,
};
pub use self::utils::decode_variable_length;
