use std::io::{self, Cursor, Read, Write};

use ntex_bytes::{Bytes, BytesMut};
use ntex_codec::{Decoder, Encoder};
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_case::test_case;

use mqtt_wire::*;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn publish(qos: QoS, packet_id: Option<u16>, payload: Bytes) -> Packet {
    Packet::Publish(Publish {
        dup: false,
        retain: false,
        qos,
        topic: Bytes::from_static(b"sensors/temperature"),
        packet_id,
        payload,
    })
}

fn assert_round_trip(packet: Packet) {
    let buf = encode(&packet).unwrap();
    assert_eq!(decode(&buf).unwrap(), packet);
}

#[test]
fn test_ping_request_header() {
    init_log();

    let mut src: &[u8] = b"\xc0\x00";
    let header = read_fixed_header(&mut src).unwrap();
    assert_eq!(
        header,
        FixedHeader {
            packet_type: PacketType::PingRequest,
            dup: false,
            qos: QoS::AtMostOnce,
            retain: false,
            remaining_length: 0,
        }
    );
    assert!(src.is_empty());
    assert_eq!(decode(b"\xc0\x00"), Ok(Packet::PingRequest));
}

#[test]
fn test_connect_ack_accepted() {
    assert_eq!(
        decode(b"\x20\x02\x00\x00"),
        Ok(Packet::ConnectAck { return_code: ConnectAckReason::ConnectionAccepted })
    );
}

#[test]
fn test_connect_round_trip() {
    init_log();

    let connect = Connect::default().client_id("test").keep_alive(60).clean_session();
    let buf = encode(&connect.clone().into()).unwrap();
    assert_eq!(&buf[..], b"\x10\x12\x00\x06MQIsdp\x03\x02\x00\x3c\x00\x04test");

    match decode(&buf).unwrap() {
        Packet::Connect(decoded) => {
            assert_eq!(decoded.protocol_name, Bytes::from_static(MQISDP));
            assert_eq!(decoded.protocol_level, MQTT_LEVEL_31);
            assert!(decoded.clean_session);
            assert_eq!(decoded.keep_alive, 60);
            assert_eq!(decoded.client_id, Bytes::from_static(b"test"));
            assert_eq!(*decoded, connect);
        }
        packet => panic!("unexpected packet: {:?}", packet),
    }
}

#[test]
fn test_connect_with_will_and_credentials() {
    assert_round_trip(
        Connect::default()
            .client_id("client")
            .keep_alive(30)
            .last_will(LastWill {
                qos: QoS::AtLeastOnce,
                retain: true,
                topic: Bytes::from_static(b"clients/client/status"),
                message: Bytes::from_static(b"offline"),
            })
            .credentials("user", Some("secret"))
            .into(),
    );
    assert_round_trip(Connect::default().credentials("user", None::<&str>).into());
}

#[test]
fn test_publish_missing_packet_id() {
    // QoS 1 publish whose body ends right after the topic
    assert_eq!(decode(b"\x32\x07\x00\x05topic"), Err(DecodeError::DataExceedsPacket));
}

#[test]
fn test_truncated_packet() {
    // declares 10 body bytes, carries 4
    assert_eq!(decode(b"\x30\x0a\x00\x02ab"), Err(DecodeError::DataExceedsPacket));
    assert_eq!(decode(b"\xb0\x02\x00"), Err(DecodeError::DataExceedsPacket));
}

#[test_case(0x00 ; "reserved zero")]
#[test_case(0xf0 ; "reserved fifteen")]
#[test_case(0xf2 ; "reserved fifteen with flags")]
fn test_invalid_packet_type(first_byte: u8) {
    assert_eq!(
        decode(&[first_byte, 0x00]),
        Err(DecodeError::InvalidPacketType(first_byte >> 4))
    );
}

#[test]
fn test_invalid_header_qos() {
    assert_eq!(decode(b"\x36\x00"), Err(DecodeError::InvalidQoS(3)));
    assert_eq!(QoS::try_from(3u8), Err(DecodeError::InvalidQoS(3)));
}

#[test]
fn test_length_encoding_exceeded() {
    let mut src: &[u8] = b"\x30\xff\xff\xff\xff\x01";
    assert_eq!(read_fixed_header(&mut src), Err(DecodeError::LengthEncodingExceeded));
    // the fifth length byte is left unread
    assert_eq!(src, b"\x01");
}

#[test_case(b"\x00", 0 ; "zero")]
#[test_case(b"\x7f", 127 ; "one byte max")]
#[test_case(b"\x80\x01", 128 ; "two bytes min")]
#[test_case(b"\xff\x7f", 16_383 ; "two bytes max")]
#[test_case(b"\x80\x80\x01", 16_384 ; "three bytes min")]
#[test_case(b"\xff\xff\x7f", 2_097_151 ; "three bytes max")]
#[test_case(b"\x80\x80\x80\x01", 2_097_152 ; "four bytes min")]
#[test_case(b"\xff\xff\xff\x7f", 268_435_455 ; "four bytes max")]
fn test_remaining_length_boundaries(length: &[u8], size: u32) {
    assert_eq!(decode_variable_length(length), Ok(Some((size, length.len()))));

    let mut header = vec![0xd0];
    header.extend_from_slice(length);
    let mut src: &[u8] = &header;
    let fixed = read_fixed_header(&mut src).unwrap();
    assert_eq!(fixed.packet_type, PacketType::PingResponse);
    assert_eq!(fixed.remaining_length, size);

    // suback body is a packet id plus one byte per code
    if (2..=2_097_152).contains(&size) {
        let packet = Packet::SubscribeAck {
            packet_id: 1,
            status: vec![SubscribeReturnCode::Failure; size as usize - 2],
        };
        let buf = encode(&packet).unwrap();
        assert_eq!(buf[0], 0x90);
        assert_eq!(&buf[1..=length.len()], length);
        assert_eq!(buf.len(), 1 + length.len() + size as usize);
    }
}

#[test_case(0 ; "empty payload")]
#[test_case(50 ; "short body")]
#[test_case(200 ; "two byte length")]
#[test_case(20_000 ; "three byte length")]
fn test_publish_round_trip(payload_len: usize) {
    let payload = Bytes::from(vec![0xa5; payload_len]);
    assert_round_trip(publish(QoS::AtMostOnce, None, payload.clone()));
    assert_round_trip(publish(QoS::AtLeastOnce, Some(1), payload.clone()));
    assert_round_trip(publish(QoS::ExactlyOnce, Some(u16::MAX), payload));
}

#[test]
fn test_round_trip_all_packet_types() {
    init_log();

    let long_filter = Bytes::from(vec![b'f'; 300]);
    let packets = vec![
        Connect::default().client_id("c").into(),
        Packet::ConnectAck { return_code: ConnectAckReason::ServiceUnavailable },
        publish(QoS::AtLeastOnce, Some(10), Bytes::from_static(b"21.5")),
        Packet::PublishAck { packet_id: 0 },
        Packet::PublishReceived { packet_id: 1 },
        Packet::PublishRelease { packet_id: 2 },
        Packet::PublishComplete { packet_id: 3 },
        Packet::Subscribe {
            packet_id: Some(4),
            topic_filters: vec![
                (Bytes::from_static(b"a/+"), QoS::AtMostOnce),
                (long_filter.clone(), QoS::ExactlyOnce),
            ],
        },
        Packet::SubscribeAck {
            packet_id: 4,
            status: vec![
                SubscribeReturnCode::Success(QoS::AtMostOnce),
                SubscribeReturnCode::Failure,
            ],
        },
        Packet::Unsubscribe { packet_id: Some(5), topic_filters: vec![long_filter] },
        Packet::UnsubscribeAck { packet_id: 5 },
        Packet::PingRequest,
        Packet::PingResponse,
        Packet::Disconnect,
    ];
    for packet in packets {
        assert_round_trip(packet);
    }
}

#[test]
fn test_subscribe_packet_id_follows_header_qos() {
    // header QoS 1 carries the packet id
    assert_eq!(
        decode(b"\x82\x08\x00\x01\x00\x03a/b\x01"),
        Ok(Packet::Subscribe {
            packet_id: Some(1),
            topic_filters: vec![(Bytes::from_static(b"a/b"), QoS::AtLeastOnce)],
        })
    );
    // header QoS 0 goes straight to the topic filters
    assert_eq!(
        decode(b"\x80\x06\x00\x03a/b\x01"),
        Ok(Packet::Subscribe {
            packet_id: None,
            topic_filters: vec![(Bytes::from_static(b"a/b"), QoS::AtLeastOnce)],
        })
    );
    assert_round_trip(Packet::Subscribe {
        packet_id: None,
        topic_filters: vec![(Bytes::from_static(b"x"), QoS::ExactlyOnce)],
    });

    assert_eq!(
        decode(b"\xa0\x05\x00\x03a/b"),
        Ok(Packet::Unsubscribe {
            packet_id: None,
            topic_filters: vec![Bytes::from_static(b"a/b")],
        })
    );
    let unsubscribe = Packet::Unsubscribe { packet_id: Some(9), topic_filters: vec![] };
    assert_eq!(&encode(&unsubscribe).unwrap()[..], b"\xa2\x02\x00\x09");
}

#[test]
fn test_encode_errors_write_nothing() {
    let mut dst = BytesMut::new();
    dst.extend_from_slice(b"prefix");

    assert_eq!(
        encode_to(&publish(QoS::AtLeastOnce, None, Bytes::new()), &mut dst),
        Err(EncodeError::PacketIdRequired)
    );
    assert_eq!(
        encode_to(&publish(QoS::AtMostOnce, Some(1), Bytes::new()), &mut dst),
        Err(EncodeError::PacketIdNotAllowed)
    );
    let topic = Bytes::from(vec![b't'; 70_000]);
    let unsubscribe = Packet::Unsubscribe { packet_id: Some(1), topic_filters: vec![topic] };
    assert_eq!(encode_to(&unsubscribe, &mut dst), Err(EncodeError::StringTooLong(70_000)));
    assert_eq!(&dst[..], b"prefix");
}

#[test]
fn test_encode_write_sink_error() {
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    assert_eq!(
        encode_write(&mut Closed, &Packet::PingRequest),
        Err(EncodeError::Io(io::ErrorKind::BrokenPipe.into()))
    );
}

#[test]
fn test_strings_are_raw_bytes() {
    let raw = Bytes::from_static(b"\xff\xfe\x00\xc3");

    assert_round_trip(
        Connect::default()
            .client_id(raw.clone())
            .last_will(LastWill {
                qos: QoS::AtMostOnce,
                retain: false,
                topic: raw.clone(),
                message: raw.clone(),
            })
            .credentials(raw.clone(), Some(raw.clone()))
            .into(),
    );
    assert_round_trip(Packet::Publish(Publish {
        dup: false,
        retain: false,
        qos: QoS::AtLeastOnce,
        topic: raw.clone(),
        packet_id: Some(3),
        payload: raw.clone(),
    }));
    assert_round_trip(Packet::Subscribe {
        packet_id: Some(4),
        topic_filters: vec![(raw.clone(), QoS::AtLeastOnce)],
    });
    assert_round_trip(Packet::Unsubscribe { packet_id: Some(5), topic_filters: vec![raw] });

    assert_eq!(
        decode(b"\xa2\x06\x00\x05\x00\x02\xff\xfe"),
        Ok(Packet::Unsubscribe {
            packet_id: Some(5),
            topic_filters: vec![Bytes::from_static(b"\xff\xfe")],
        })
    );
}

#[test]
fn test_stream_of_packets() {
    init_log();

    let mut rng = StdRng::seed_from_u64(0x6d717474);
    let mut packets = Vec::new();
    for idx in 0..64u16 {
        let len = rng.gen_range(0..1024);
        let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let packet = match rng.gen_range(0..3u8) {
            0 => publish(QoS::AtMostOnce, None, payload.into()),
            1 => publish(QoS::AtLeastOnce, Some(idx), payload.into()),
            _ => Packet::PublishAck { packet_id: idx },
        };
        packets.push(packet);
    }

    let mut out = Vec::new();
    for packet in &packets {
        encode_write(&mut out, packet).unwrap();
    }

    let mut src = Cursor::new(out);
    for packet in &packets {
        assert_eq!(&decode_read(&mut src).unwrap(), packet);
    }
    assert_eq!(
        decode_read(&mut src),
        Err(DecodeError::Io(io::ErrorKind::UnexpectedEof.into()))
    );
}

#[test]
fn test_trailing_bytes_are_skipped() {
    // PUBACK declaring 4 body bytes, followed by PINGREQ
    let mut src: &[u8] = b"\x40\x04\x00\x01\xde\xad\xc0\x00";
    assert_eq!(decode_read(&mut src), Ok(Packet::PublishAck { packet_id: 1 }));
    assert_eq!(decode_read(&mut src), Ok(Packet::PingRequest));
    assert!(src.is_empty());
}

#[test]
fn test_decode_from_chained_reader() {
    // body split across two sources
    let head: &[u8] = b"\x30\x0b\x00\x05top";
    let tail: &[u8] = b"icdata";
    let mut src = head.chain(tail);
    assert_eq!(
        decode_read(&mut src),
        Ok(Packet::Publish(Publish {
            dup: false,
            retain: false,
            qos: QoS::AtMostOnce,
            topic: Bytes::from_static(b"topic"),
            packet_id: None,
            payload: Bytes::from_static(b"data"),
        }))
    );
}

#[test]
fn test_codec_byte_by_byte() {
    init_log();

    let codec = Codec::new();
    let packets = vec![
        Connect::default().client_id("codec").into(),
        publish(QoS::ExactlyOnce, Some(77), Bytes::from(vec![1u8; 300])),
        Packet::PublishRelease { packet_id: 77 },
        Packet::Disconnect,
    ];

    let mut wire = BytesMut::new();
    for packet in &packets {
        codec.encode(packet.clone(), &mut wire).unwrap();
    }

    let mut buf = BytesMut::new();
    let mut decoded = Vec::new();
    for byte in wire.iter() {
        buf.extend_from_slice(&[*byte]);
        if let Some(packet) = codec.decode(&mut buf).unwrap() {
            decoded.push(packet);
        }
    }
    assert_eq!(decoded, packets);
    assert!(buf.is_empty());
}
