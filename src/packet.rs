use ntex_bytes::Bytes;

use crate::types::{FixedHeader, PacketType, QoS, MQISDP, MQTT_LEVEL_31};

prim_enum! {
    /// Connect Return Code
    pub enum ConnectAckReason => InvalidConnectAckCode {
        /// Connection accepted
        ConnectionAccepted = 0,
        /// Connection Refused, unacceptable protocol version
        UnacceptableProtocolVersion = 1,
        /// Connection Refused, identifier rejected
        IdentifierRejected = 2,
        /// Connection Refused, Server unavailable
        ServiceUnavailable = 3,
        /// Connection Refused, bad user name or password
        BadUserNameOrPassword = 4,
        /// Connection Refused, not authorized
        NotAuthorized = 5
    }
}

impl ConnectAckReason {
    pub fn reason(self) -> &'static str {
        match self {
            ConnectAckReason::ConnectionAccepted => "Connection Accepted",
            ConnectAckReason::UnacceptableProtocolVersion => {
                "Connection Refused, unacceptable protocol version"
            }
            ConnectAckReason::IdentifierRejected => "Connection Refused, identifier rejected",
            ConnectAckReason::ServiceUnavailable => "Connection Refused, Server unavailable",
            ConnectAckReason::BadUserNameOrPassword => {
                "Connection Refused, bad user name or password"
            }
            ConnectAckReason::NotAuthorized => "Connection Refused, not authorized",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// Connection Will
pub struct LastWill {
    /// the QoS level to be used when publishing the Will Message.
    pub qos: QoS,
    /// the Will Message is to be Retained when it is published.
    pub retain: bool,
    /// the Will Topic
    pub topic: Bytes,
    /// defines the Application Message that is to be published to the Will Topic
    pub message: Bytes,
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// Connect packet content
pub struct Connect {
    /// protocol name, `MQIsdp` for MQTT v3.1
    pub protocol_name: Bytes,
    /// revision level of the protocol
    pub protocol_level: u8,
    /// the handling of the Session state.
    pub clean_session: bool,
    /// a time interval measured in seconds.
    pub keep_alive: u16,
    /// Will Message be stored on the Server and associated with the Network Connection.
    pub last_will: Option<LastWill>,
    /// identifies the Client to the Server.
    pub client_id: Bytes,
    /// username can be used by the Server for authentication and authorization.
    pub username: Option<Bytes>,
    /// password can be used by the Server for authentication and authorization.
    pub password: Option<Bytes>,
}

impl Default for Connect {
    fn default() -> Self {
        Connect {
            protocol_name: Bytes::from_static(MQISDP),
            protocol_level: MQTT_LEVEL_31,
            clean_session: false,
            keep_alive: 0,
            last_will: None,
            client_id: Bytes::new(),
            username: None,
            password: None,
        }
    }
}

impl Connect {
    /// Set client_id value
    pub fn client_id<T>(mut self, client_id: T) -> Self
    where
        Bytes: From<T>,
    {
        self.client_id = client_id.into();
        self
    }

    /// Set keep alive interval in seconds
    pub fn keep_alive(mut self, keep_alive: u16) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Request a clean session
    pub fn clean_session(mut self) -> Self {
        self.clean_session = true;
        self
    }

    /// Set will message
    pub fn last_will(mut self, last_will: LastWill) -> Self {
        self.last_will = Some(last_will);
        self
    }

    /// Set username and optional password
    pub fn credentials<U, P>(mut self, username: U, password: Option<P>) -> Self
    where
        Bytes: From<U> + From<P>,
    {
        self.username = Some(username.into());
        self.password = password.map(Bytes::from);
        self
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// Publish message
pub struct Publish {
    /// this might be re-delivery of an earlier attempt to send the Packet.
    pub dup: bool,
    pub retain: bool,
    /// the level of assurance for delivery of an Application Message.
    pub qos: QoS,
    /// the information channel to which payload data is published.
    pub topic: Bytes,
    /// only present in PUBLISH Packets where the QoS level is 1 or 2.
    pub packet_id: Option<u16>,
    /// the Application Message that is being published.
    pub payload: Bytes,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Subscribe Return Code
pub enum SubscribeReturnCode {
    Success(QoS),
    Failure,
}

impl SubscribeReturnCode {
    pub(crate) const FAILURE: u8 = 0x80;
}

impl From<SubscribeReturnCode> for u8 {
    fn from(code: SubscribeReturnCode) -> u8 {
        match code {
            SubscribeReturnCode::Success(qos) => qos.into(),
            SubscribeReturnCode::Failure => SubscribeReturnCode::FAILURE,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// MQTT Control Packets
pub enum Packet {
    /// Client request to connect to Server
    Connect(Box<Connect>),
    /// Connect acknowledgment
    ConnectAck {
        /// the reserved byte preceding it is always written as zero
        return_code: ConnectAckReason,
    },
    /// Publish message
    Publish(Publish),
    /// Publish acknowledgment
    PublishAck {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish received (assured delivery part 1)
    PublishReceived {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish release (assured delivery part 2)
    PublishRelease {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish complete (assured delivery part 3)
    PublishComplete {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Client subscribe request
    Subscribe {
        /// Packet Identifier, present only when the header QoS is 1 or 2
        packet_id: Option<u16>,
        /// the list of Topic Filters and QoS to which the Client wants to subscribe.
        topic_filters: Vec<(Bytes, QoS)>,
    },
    /// Subscribe acknowledgment
    SubscribeAck {
        packet_id: u16,
        /// corresponds to a Topic Filter in the SUBSCRIBE Packet being acknowledged.
        status: Vec<SubscribeReturnCode>,
    },
    /// Unsubscribe request
    Unsubscribe {
        /// Packet Identifier, present only when the header QoS is 1 or 2
        packet_id: Option<u16>,
        /// the list of Topic Filters that the Client wishes to unsubscribe from.
        topic_filters: Vec<Bytes>,
    },
    /// Unsubscribe acknowledgment
    UnsubscribeAck {
        /// Packet Identifier
        packet_id: u16,
    },
    /// PING request
    PingRequest,
    /// PING response
    PingResponse,
    /// Client is disconnecting
    Disconnect,
}

impl From<Connect> for Packet {
    fn from(val: Connect) -> Packet {
        Packet::Connect(Box::new(val))
    }
}

impl From<Publish> for Packet {
    fn from(val: Publish) -> Packet {
        Packet::Publish(val)
    }
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnectAck { .. } => PacketType::ConnectAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PublishAck { .. } => PacketType::PublishAck,
            Packet::PublishReceived { .. } => PacketType::PublishReceived,
            Packet::PublishRelease { .. } => PacketType::PublishRelease,
            Packet::PublishComplete { .. } => PacketType::PublishComplete,
            Packet::Subscribe { .. } => PacketType::Subscribe,
            Packet::SubscribeAck { .. } => PacketType::SubscribeAck,
            Packet::Unsubscribe { .. } => PacketType::Unsubscribe,
            Packet::UnsubscribeAck { .. } => PacketType::UnsubscribeAck,
            Packet::PingRequest => PacketType::PingRequest,
            Packet::PingResponse => PacketType::PingResponse,
            Packet::Disconnect => PacketType::Disconnect,
        }
    }

    /// Fixed header this packet is written with.
    pub fn fixed_header(&self, remaining_length: u32) -> FixedHeader {
        let (dup, qos, retain) = match self {
            Packet::Publish(publish) => (publish.dup, publish.qos, publish.retain),
            Packet::PublishRelease { .. } => (false, QoS::AtLeastOnce, false),
            Packet::Subscribe { packet_id, .. } | Packet::Unsubscribe { packet_id, .. } => {
                let qos = if packet_id.is_some() { QoS::AtLeastOnce } else { QoS::AtMostOnce };
                (false, qos, false)
            }
            _ => (false, QoS::AtMostOnce, false),
        };
        FixedHeader { packet_type: self.packet_type(), dup, qos, retain, remaining_length }
    }
}
