#![no_main]

use bytestream::{Reader, Writer};
use libfuzzer_sys::fuzz_target;
use proto::{
    client_registry, decode_message, server_registry, BodyLen, OpcodeFormat,
};

fuzz_target!(|data: &[u8]| {
    let client = client_registry(OpcodeFormat::Byte).unwrap();
    let server = server_registry(OpcodeFormat::Byte).unwrap();

    // Walk the input as a serverbound capture; malformed frames must fail
    // cleanly, and every decodable message must re-encode byte-identically.
    let mut reader = Reader::new(data);
    while !reader.is_empty() {
        let Ok(opcode) = OpcodeFormat::Byte.read(&mut reader) else {
            break;
        };
        let Ok(kind) = client.lookup(opcode) else {
            break;
        };
        let body = match kind.descriptor().body_len {
            BodyLen::Fixed(n) => reader.read_bytes(n),
            BodyLen::VarByte => {
                let Ok(n) = reader.read_u8() else { break };
                reader.read_bytes(usize::from(n))
            }
            BodyLen::VarShort => {
                let Ok(n) = reader.read_le_u16() else { break };
                reader.read_bytes(usize::from(n))
            }
        };
        let Ok(body) = body else { break };

        if let Ok(message) = decode_message(&client, opcode, body) {
            let mut writer = Writer::new();
            if message.encode_body(&mut writer).is_ok() {
                let mut check = Reader::new(writer.as_slice());
                let again = kind.decode_body(&mut check).unwrap();
                assert_eq!(again, message);
            }
        }
    }

    // Clientbound lookups over the raw input must never panic either.
    let mut reader = Reader::new(data);
    while let Ok(opcode) = OpcodeFormat::Byte.read(&mut reader) {
        let _ = server.lookup(opcode);
    }
});
