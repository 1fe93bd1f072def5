use crate::error::DecodeError;

/// Protocol name of MQTT v3.1
pub const MQISDP: &[u8] = b"MQIsdp";
/// Protocol level of MQTT v3.1
pub const MQTT_LEVEL_31: u8 = 3;
pub const WILL_QOS_SHIFT: u8 = 3;

/// Max possible packet size
pub const MAX_PACKET_SIZE: u32 = 0xF_FF_FF_FF;

prim_enum! {
    /// Quality of Service
    pub enum QoS => InvalidQoS {
        /// At most once delivery
        ///
        /// The message is delivered according to the capabilities of the underlying network.
        /// No response is sent by the receiver and no retry is performed by the sender.
        AtMostOnce = 0,
        /// At least once delivery
        ///
        /// A QoS 1 PUBLISH Packet has a Packet Identifier in its variable header
        /// and is acknowledged by a PUBACK Packet.
        AtLeastOnce = 1,
        /// Exactly once delivery
        ExactlyOnce = 2
    }
}

impl QoS {
    /// Packets sent with this QoS carry a packet identifier.
    pub fn has_packet_id(self) -> bool {
        matches!(self, QoS::AtLeastOnce | QoS::ExactlyOnce)
    }
}

prim_enum! {
    /// MQTT Control Packet type
    pub enum PacketType => InvalidPacketType {
        Connect = 1,
        ConnectAck = 2,
        Publish = 3,
        PublishAck = 4,
        PublishReceived = 5,
        PublishRelease = 6,
        PublishComplete = 7,
        Subscribe = 8,
        SubscribeAck = 9,
        Unsubscribe = 10,
        UnsubscribeAck = 11,
        PingRequest = 12,
        PingResponse = 13,
        Disconnect = 14
    }
}

bitflags::bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ConnectFlags: u8 {
        const USERNAME      = 0b1000_0000;
        const PASSWORD      = 0b0100_0000;
        const WILL_RETAIN   = 0b0010_0000;
        const WILL_QOS      = 0b0001_1000;
        const WILL          = 0b0000_0100;
        const CLEAN_SESSION = 0b0000_0010;
    }
}

impl ConnectFlags {
    /// QoS of the will message stored in the flags
    pub fn will_qos(self) -> Result<QoS, DecodeError> {
        let bits = (self & ConnectFlags::WILL_QOS).bits() >> WILL_QOS_SHIFT;
        QoS::try_from(bits).map_err(|_| DecodeError::InvalidWillQoS(bits))
    }

    pub(crate) fn with_will_qos(self, qos: QoS) -> Self {
        self | ConnectFlags::from_bits_truncate(u8::from(qos) << WILL_QOS_SHIFT)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FixedHeader {
    /// MQTT Control Packet type
    pub packet_type: PacketType,
    /// this might be re-delivery of an earlier attempt to send the Packet.
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    /// the number of bytes remaining within the current packet,
    /// including data in the variable header and the payload.
    pub remaining_length: u32,
}

impl FixedHeader {
    /// Unpack the first header byte.
    ///
    /// Packet type and QoS are validated, in this order.
    pub fn from_first_byte(first_byte: u8, remaining_length: u32) -> Result<Self, DecodeError> {
        let packet_type = PacketType::try_from(first_byte >> 4)?;
        let qos = QoS::try_from((first_byte & 0b0110) >> 1)?;
        Ok(FixedHeader {
            packet_type,
            dup: (first_byte & 0b1000) == 0b1000,
            qos,
            retain: (first_byte & 0b0001) == 0b0001,
            remaining_length,
        })
    }

    /// Pack type and flags into the first header byte.
    pub fn first_byte(&self) -> u8 {
        (u8::from(self.packet_type) << 4)
            | ((self.dup as u8) << 3)
            | (u8::from(self.qos) << 1)
            | (self.retain as u8)
    }
}
