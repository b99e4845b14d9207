//! Opcode, direction and opcode header format types.

use std::fmt;

use bytestream::{Reader, StreamResult, Writer};

/// A message opcode.
///
/// Opcode values are direction-scoped: the serverbound and clientbound
/// spaces are independent and may collide numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opcode(u16);

impl Opcode {
    /// Creates a new opcode.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw opcode value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for Opcode {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Opcode> for u16 {
    fn from(opcode: Opcode) -> Self {
        opcode.0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of travel for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Serverbound => "serverbound",
            Self::Clientbound => "clientbound",
        };
        write!(f, "{name}")
    }
}

/// Layout of the opcode header on the wire.
///
/// Protocol revisions with more than 256 message shapes per direction use
/// the extended two-byte form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeFormat {
    /// Single opcode byte.
    Byte,
    /// Little-endian two-byte opcode.
    Short,
}

impl OpcodeFormat {
    /// Returns the largest opcode value the format can carry.
    #[must_use]
    pub const fn max_opcode(self) -> u16 {
        match self {
            Self::Byte => u8::MAX as u16,
            Self::Short => u16::MAX,
        }
    }

    /// Reads an opcode header.
    pub fn read(self, reader: &mut Reader<'_>) -> StreamResult<Opcode> {
        let raw = match self {
            Self::Byte => u16::from(reader.read_u8()?),
            Self::Short => reader.read_le_u16()?,
        };
        Ok(Opcode::new(raw))
    }

    /// Writes an opcode header.
    ///
    /// The opcode is assumed to fit the format; registries validate that at
    /// build time.
    pub fn write(self, writer: &mut Writer, opcode: Opcode) -> StreamResult<()> {
        match self {
            Self::Byte => writer.write_u8(opcode.raw() as u8),
            Self::Short => writer.write_le_u16(opcode.raw()),
        }
    }
}
