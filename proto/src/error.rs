//! Error types for protocol operations.

use std::fmt;

use bytestream::StreamError;

use crate::opcode::{Direction, Opcode};

/// Result type for protocol operations.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// Errors that can occur while building registries or coding messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Cursor-level failure (truncation, size cap, bad seek).
    Stream(StreamError),

    /// Opcode not present in the active direction's registry.
    ///
    /// Whether to drop the message or terminate the connection is session
    /// policy, decided outside the codec.
    UnknownOpcode { opcode: Opcode, direction: Direction },

    /// Duplicate opcode registered within one direction. Startup only.
    RegistryConflict { opcode: Opcode, direction: Direction },

    /// Opcode does not fit the registry's opcode header format. Startup only.
    OpcodeOutOfRange { opcode: Opcode, max: u16 },

    /// A fixed-size body encoded to a different length than declared.
    BodyLengthMismatch {
        opcode: Opcode,
        declared: usize,
        actual: usize,
    },
}

impl From<StreamError> for ProtoError {
    fn from(err: StreamError) -> Self {
        Self::Stream(err)
    }
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(err) => write!(f, "stream error: {err}"),
            Self::UnknownOpcode { opcode, direction } => {
                write!(f, "unknown {direction} opcode {opcode}")
            }
            Self::RegistryConflict { opcode, direction } => {
                write!(f, "duplicate {direction} opcode {opcode} registered")
            }
            Self::OpcodeOutOfRange { opcode, max } => {
                write!(f, "opcode {opcode} exceeds header format maximum {max}")
            }
            Self::BodyLengthMismatch {
                opcode,
                declared,
                actual,
            } => {
                write!(
                    f,
                    "opcode {opcode} body declared {declared} bytes but encoded {actual}"
                )
            }
        }
    }
}

impl std::error::Error for ProtoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}
