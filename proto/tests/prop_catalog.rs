use bytestream::Writer;
use proptest::prelude::*;
use proto::{
    client_registry, decode_message, decode_server_message, encode_message, server_registry,
    ClientMessage, OpcodeFormat, ServerMessage,
};

fn client_message_strategy() -> impl Strategy<Value = ClientMessage> {
    prop_oneof![
        Just(ClientMessage::KeepAlive),
        (any::<u32>(), any::<u8>(), any::<u16>()).prop_map(|(position_hash, flags, time)| {
            ClientMessage::MouseClick {
                position_hash,
                flags,
                time,
            }
        }),
        "[ -~]{0,40}".prop_map(|command| ClientMessage::ChatCommand { command }),
    ]
}

fn server_message_strategy() -> impl Strategy<Value = ServerMessage> {
    prop_oneof![
        any::<u32>().prop_map(|delay| ServerMessage::SystemUpdate { delay }),
        (any::<u32>(), "[ -~]{0,40}").prop_map(|(interface_hash, text)| {
            ServerMessage::IfSetText {
                interface_hash,
                text,
            }
        }),
        (any::<u32>(), any::<u32>()).prop_map(|(interface_hash, npc_id)| {
            ServerMessage::IfSetNpcHead {
                interface_hash,
                npc_id,
            }
        }),
        ("[ -~]{1,12}", prop::collection::vec(any::<u8>(), 0..64)).prop_map(
            |(sender, payload)| ServerMessage::PrivateMessage { sender, payload }
        ),
        prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(|block| ServerMessage::FriendsChatChannel { block }),
    ]
}

proptest! {
    #[test]
    fn prop_client_messages_roundtrip(message in client_message_strategy()) {
        let client = client_registry(OpcodeFormat::Byte).unwrap();

        let mut writer = Writer::new();
        message.encode_body(&mut writer).unwrap();
        let body = writer.finish();

        let decoded = decode_message(&client, message.opcode(), &body).unwrap();
        prop_assert_eq!(&decoded, &message);

        let mut rewriter = Writer::new();
        decoded.encode_body(&mut rewriter).unwrap();
        prop_assert_eq!(rewriter.finish(), body);
    }

    #[test]
    fn prop_server_messages_roundtrip_framed(message in server_message_strategy()) {
        let server = server_registry(OpcodeFormat::Byte).unwrap();

        let mut writer = Writer::new();
        encode_message(&server, &message, &mut writer).unwrap();
        let framed = writer.finish();

        // Strip the opcode header and size field the same way the peer does.
        let opcode = proto::Opcode::new(u16::from(framed[0]));
        let kind = server.lookup(opcode).unwrap();
        let body = match kind.descriptor().body_len {
            proto::BodyLen::Fixed(n) => &framed[1..1 + n],
            proto::BodyLen::VarByte => &framed[2..2 + framed[1] as usize],
            proto::BodyLen::VarShort => {
                let len = u16::from_le_bytes([framed[1], framed[2]]) as usize;
                &framed[3..3 + len]
            }
        };
        let decoded = decode_server_message(&server, opcode, body).unwrap();
        prop_assert_eq!(decoded, message);
    }
}
