//! The fixed message catalog.
//!
//! Every message shape the peer understands, as two closed sum types, one
//! per direction. The catalog is configuration data: opcodes, field order
//! and per-field encoding modes are pinned by protocol compatibility and
//! must not drift (see [`catalog_hash`](crate::catalog_hash)).
//!
//! Each kind decodes its body from and encodes its body to a cursor; the
//! two must reproduce byte-identical output for every well-formed input,
//! since the stream carries no message boundaries beyond what each decoder
//! consumes.

use bytestream::{Reader, Writer};

use crate::error::ProtoResult;
use crate::opcode::{Direction, Opcode, OpcodeFormat};
use crate::registry::{Registry, RegistryBuilder};

/// Wire encoding mode of one message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldMode {
    /// Raw byte.
    U8,
    /// Offset byte (value ± 128 modulo 256).
    OffsetU8,
    /// Little-endian 2-byte integer.
    LeU16,
    /// Little-endian 4-byte integer.
    LeU32,
    /// Mixed-order "V1" 4-byte integer.
    V1U32,
    /// Big-endian 7-bit variable-length integer.
    VarU32,
    /// Zero-terminated legacy code page text.
    CString,
    /// Var-u32 length-prefixed byte string.
    VarBytes,
    /// Var-u32 length-prefixed UTF-8 text.
    VarString,
    /// Pass-through raw bytes of known external length.
    Raw,
}

/// Body length class used by outbound framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyLen {
    /// Body is always exactly this many bytes.
    Fixed(usize),
    /// Variable body, u8 length prefix.
    VarByte,
    /// Variable body, little-endian u16 length prefix.
    VarShort,
}

/// Binds one opcode, in one direction, to a message shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub direction: Direction,
    pub opcode: Opcode,
    pub body_len: BodyLen,
    pub fields: &'static [FieldMode],
}

/// Serverbound (client to server) message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClientKind {
    KeepAlive,
    MouseClick,
    ChatCommand,
}

/// A decoded serverbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClientMessage {
    /// Periodic no-op keeping the connection warm.
    KeepAlive,
    /// A mouse button press with the client's idle-time counter.
    MouseClick {
        position_hash: u32,
        flags: u8,
        time: u16,
    },
    /// A `::command` typed into the chat box.
    ChatCommand { command: String },
}

impl ClientKind {
    /// Every serverbound kind, in catalog order.
    pub const ALL: [Self; 3] = [Self::KeepAlive, Self::MouseClick, Self::ChatCommand];

    /// Returns the catalog descriptor for this kind.
    #[must_use]
    pub const fn descriptor(self) -> Descriptor {
        match self {
            Self::KeepAlive => Descriptor {
                direction: Direction::Serverbound,
                opcode: Opcode::new(0),
                body_len: BodyLen::Fixed(0),
                fields: &[],
            },
            Self::MouseClick => Descriptor {
                direction: Direction::Serverbound,
                opcode: Opcode::new(9),
                body_len: BodyLen::Fixed(7),
                fields: &[FieldMode::LeU32, FieldMode::OffsetU8, FieldMode::LeU16],
            },
            Self::ChatCommand => Descriptor {
                direction: Direction::Serverbound,
                opcode: Opcode::new(41),
                body_len: BodyLen::VarByte,
                fields: &[FieldMode::CString],
            },
        }
    }

    /// Decodes a message body of this kind.
    pub fn decode_body(self, reader: &mut Reader<'_>) -> ProtoResult<ClientMessage> {
        match self {
            Self::KeepAlive => Ok(ClientMessage::KeepAlive),
            Self::MouseClick => {
                let position_hash = reader.read_le_u32()?;
                let flags = reader.read_offset_u8()?;
                let time = reader.read_le_u16()?;
                Ok(ClientMessage::MouseClick {
                    position_hash,
                    flags,
                    time,
                })
            }
            Self::ChatCommand => {
                let command = reader.read_cstring()?;
                Ok(ClientMessage::ChatCommand { command })
            }
        }
    }
}

impl ClientMessage {
    /// Returns the kind of this message.
    #[must_use]
    pub const fn kind(&self) -> ClientKind {
        match self {
            Self::KeepAlive => ClientKind::KeepAlive,
            Self::MouseClick { .. } => ClientKind::MouseClick,
            Self::ChatCommand { .. } => ClientKind::ChatCommand,
        }
    }

    /// Returns the opcode of this message.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.kind().descriptor().opcode
    }

    /// Encodes this message's body.
    pub fn encode_body(&self, writer: &mut Writer) -> ProtoResult<()> {
        match self {
            Self::KeepAlive => Ok(()),
            Self::MouseClick {
                position_hash,
                flags,
                time,
            } => {
                writer.write_le_u32(*position_hash)?;
                writer.write_offset_u8(*flags)?;
                writer.write_le_u16(*time)?;
                Ok(())
            }
            Self::ChatCommand { command } => {
                writer.write_cstring(command)?;
                Ok(())
            }
        }
    }
}

/// Clientbound (server to client) message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerKind {
    SystemUpdate,
    IfSetText,
    IfSetNpcHead,
    PrivateMessage,
    FriendsChatChannel,
}

/// A clientbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerMessage {
    /// Countdown until a server restart, in ticks.
    SystemUpdate { delay: u32 },
    /// Replaces the text of an interface component.
    IfSetText { interface_hash: u32, text: String },
    /// Points an interface component's model at an NPC head.
    IfSetNpcHead { interface_hash: u32, npc_id: u32 },
    /// A private message: visible sender name plus the compressed body,
    /// which is produced and consumed by the chat compressor collaborator.
    PrivateMessage { sender: String, payload: Vec<u8> },
    /// Pre-built friends chat roster block, copied verbatim.
    FriendsChatChannel { block: Vec<u8> },
}

impl ServerKind {
    /// Every clientbound kind, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::SystemUpdate,
        Self::IfSetText,
        Self::IfSetNpcHead,
        Self::PrivateMessage,
        Self::FriendsChatChannel,
    ];

    /// Returns the catalog descriptor for this kind.
    #[must_use]
    pub const fn descriptor(self) -> Descriptor {
        match self {
            Self::SystemUpdate => Descriptor {
                direction: Direction::Clientbound,
                opcode: Opcode::new(5),
                body_len: BodyLen::Fixed(4),
                fields: &[FieldMode::LeU32],
            },
            Self::IfSetText => Descriptor {
                direction: Direction::Clientbound,
                opcode: Opcode::new(43),
                body_len: BodyLen::VarShort,
                fields: &[FieldMode::CString, FieldMode::V1U32],
            },
            Self::IfSetNpcHead => Descriptor {
                direction: Direction::Clientbound,
                opcode: Opcode::new(71),
                body_len: BodyLen::Fixed(8),
                fields: &[FieldMode::LeU32, FieldMode::V1U32],
            },
            Self::PrivateMessage => Descriptor {
                direction: Direction::Clientbound,
                opcode: Opcode::new(89),
                body_len: BodyLen::VarShort,
                fields: &[FieldMode::CString, FieldMode::VarBytes],
            },
            Self::FriendsChatChannel => Descriptor {
                direction: Direction::Clientbound,
                opcode: Opcode::new(115),
                body_len: BodyLen::VarShort,
                fields: &[FieldMode::Raw],
            },
        }
    }

    /// Decodes a message body of this kind.
    pub fn decode_body(self, reader: &mut Reader<'_>) -> ProtoResult<ServerMessage> {
        match self {
            Self::SystemUpdate => {
                let delay = reader.read_le_u32()?;
                Ok(ServerMessage::SystemUpdate { delay })
            }
            Self::IfSetText => {
                let text = reader.read_cstring()?;
                let interface_hash = reader.read_v1_u32()?;
                Ok(ServerMessage::IfSetText {
                    interface_hash,
                    text,
                })
            }
            Self::IfSetNpcHead => {
                let interface_hash = reader.read_le_u32()?;
                let npc_id = reader.read_v1_u32()?;
                Ok(ServerMessage::IfSetNpcHead {
                    interface_hash,
                    npc_id,
                })
            }
            Self::PrivateMessage => {
                let sender = reader.read_cstring()?;
                let payload = reader.read_var_bytes()?.to_vec();
                Ok(ServerMessage::PrivateMessage { sender, payload })
            }
            Self::FriendsChatChannel => {
                let block = reader.read_remaining().to_vec();
                Ok(ServerMessage::FriendsChatChannel { block })
            }
        }
    }
}

impl ServerMessage {
    /// Returns the kind of this message.
    #[must_use]
    pub const fn kind(&self) -> ServerKind {
        match self {
            Self::SystemUpdate { .. } => ServerKind::SystemUpdate,
            Self::IfSetText { .. } => ServerKind::IfSetText,
            Self::IfSetNpcHead { .. } => ServerKind::IfSetNpcHead,
            Self::PrivateMessage { .. } => ServerKind::PrivateMessage,
            Self::FriendsChatChannel { .. } => ServerKind::FriendsChatChannel,
        }
    }

    /// Returns the opcode of this message.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.kind().descriptor().opcode
    }

    /// Encodes this message's body.
    pub fn encode_body(&self, writer: &mut Writer) -> ProtoResult<()> {
        match self {
            Self::SystemUpdate { delay } => {
                writer.write_le_u32(*delay)?;
                Ok(())
            }
            Self::IfSetText {
                interface_hash,
                text,
            } => {
                writer.write_cstring(text)?;
                writer.write_v1_u32(*interface_hash)?;
                Ok(())
            }
            Self::IfSetNpcHead {
                interface_hash,
                npc_id,
            } => {
                writer.write_le_u32(*interface_hash)?;
                writer.write_v1_u32(*npc_id)?;
                Ok(())
            }
            Self::PrivateMessage { sender, payload } => {
                writer.write_cstring(sender)?;
                writer.write_var_bytes(payload)?;
                Ok(())
            }
            Self::FriendsChatChannel { block } => {
                writer.write_bytes(block)?;
                Ok(())
            }
        }
    }
}

/// Builds the serverbound registry from the catalog.
pub fn client_registry(format: OpcodeFormat) -> ProtoResult<Registry<ClientKind>> {
    let mut builder = RegistryBuilder::new(Direction::Serverbound, format);
    for kind in ClientKind::ALL {
        builder = builder.register(kind.descriptor().opcode, kind);
    }
    builder.build()
}

/// Builds the clientbound registry from the catalog.
pub fn server_registry(format: OpcodeFormat) -> ProtoResult<Registry<ServerKind>> {
    let mut builder = RegistryBuilder::new(Direction::Clientbound, format);
    for kind in ServerKind::ALL {
        builder = builder.register(kind.descriptor().opcode, kind);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_registries_build() {
        let client = client_registry(OpcodeFormat::Byte).unwrap();
        let server = server_registry(OpcodeFormat::Byte).unwrap();
        assert_eq!(client.len(), ClientKind::ALL.len());
        assert_eq!(server.len(), ServerKind::ALL.len());
    }

    #[test]
    fn descriptors_match_direction() {
        for kind in ClientKind::ALL {
            assert_eq!(kind.descriptor().direction, Direction::Serverbound);
        }
        for kind in ServerKind::ALL {
            assert_eq!(kind.descriptor().direction, Direction::Clientbound);
        }
    }

    #[test]
    fn mouse_click_field_layout() {
        // positionHash (LE int), flags (offset byte), time (LE short).
        let mut writer = Writer::new();
        let message = ClientMessage::MouseClick {
            position_hash: 0x0102_0304,
            flags: 1,
            time: 0x0506,
        };
        message.encode_body(&mut writer).unwrap();
        assert_eq!(
            writer.as_slice(),
            &[0x04, 0x03, 0x02, 0x01, 129, 0x06, 0x05]
        );
    }

    #[test]
    fn if_set_text_writes_text_before_hash() {
        let mut writer = Writer::new();
        let message = ServerMessage::IfSetText {
            interface_hash: 0x0102_0304,
            text: "ok".to_owned(),
        };
        message.encode_body(&mut writer).unwrap();
        assert_eq!(writer.as_slice(), &[b'o', b'k', 0, 0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn keep_alive_body_is_empty() {
        let mut writer = Writer::new();
        ClientMessage::KeepAlive.encode_body(&mut writer).unwrap();
        assert!(writer.is_empty());
    }

    #[test]
    fn friends_chat_channel_is_verbatim() {
        let block = vec![9, 8, 7, 6];
        let mut writer = Writer::new();
        ServerMessage::FriendsChatChannel {
            block: block.clone(),
        }
        .encode_body(&mut writer)
        .unwrap();
        assert_eq!(writer.as_slice(), &block[..]);

        let mut reader = Reader::new(&block);
        let decoded = ServerKind::FriendsChatChannel
            .decode_body(&mut reader)
            .unwrap();
        assert_eq!(decoded, ServerMessage::FriendsChatChannel { block });
    }

    #[test]
    fn every_kind_roundtrips() {
        let client_samples = [
            ClientMessage::KeepAlive,
            ClientMessage::MouseClick {
                position_hash: 0xDEAD_BEEF,
                flags: 200,
                time: 1_000,
            },
            ClientMessage::ChatCommand {
                command: "home".to_owned(),
            },
        ];
        for message in client_samples {
            let mut writer = Writer::new();
            message.encode_body(&mut writer).unwrap();
            let bytes = writer.finish();
            let mut reader = Reader::new(&bytes);
            let decoded = message.kind().decode_body(&mut reader).unwrap();
            assert_eq!(decoded, message);
            assert!(reader.is_empty(), "decoder must consume the whole body");
        }

        let server_samples = [
            ServerMessage::SystemUpdate { delay: 300 },
            ServerMessage::IfSetText {
                interface_hash: (548 << 16) | 12,
                text: "Welcome".to_owned(),
            },
            ServerMessage::IfSetNpcHead {
                interface_hash: (1_186 << 16) | 9,
                npc_id: 4_296,
            },
            ServerMessage::PrivateMessage {
                sender: "Mod Ash".to_owned(),
                payload: vec![0x11, 0x22, 0x33],
            },
            ServerMessage::FriendsChatChannel {
                block: vec![1, 2, 3, 4, 5],
            },
        ];
        for message in server_samples {
            let mut writer = Writer::new();
            message.encode_body(&mut writer).unwrap();
            let bytes = writer.finish();
            let mut reader = Reader::new(&bytes);
            let decoded = message.kind().decode_body(&mut reader).unwrap();
            assert_eq!(decoded, message);
            assert!(reader.is_empty(), "decoder must consume the whole body");
        }
    }
}
