//! Deterministic catalog hashing.
//!
//! Peers exchange this hash at login to detect catalog drift before any
//! message is misinterpreted.

use blake3::Hasher;

use crate::message::{BodyLen, ClientKind, Descriptor, FieldMode, ServerKind};
use crate::opcode::Direction;

/// Computes a deterministic hash over the whole message catalog: direction,
/// opcode, body length class and field layout of every entry.
#[must_use]
pub fn catalog_hash() -> u64 {
    let mut hasher = Hasher::new();

    write_u32(&mut hasher, ClientKind::ALL.len() as u32);
    for kind in ClientKind::ALL {
        write_descriptor(&mut hasher, kind.descriptor());
    }

    write_u32(&mut hasher, ServerKind::ALL.len() as u32);
    for kind in ServerKind::ALL {
        write_descriptor(&mut hasher, kind.descriptor());
    }

    let hash = hasher.finalize();
    let bytes = hash.as_bytes();
    u64::from_le_bytes(bytes[0..8].try_into().unwrap())
}

fn write_descriptor(hasher: &mut Hasher, descriptor: Descriptor) {
    write_u8(
        hasher,
        match descriptor.direction {
            Direction::Serverbound => 0,
            Direction::Clientbound => 1,
        },
    );
    write_u16(hasher, descriptor.opcode.raw());
    match descriptor.body_len {
        BodyLen::Fixed(n) => {
            write_u8(hasher, 0);
            write_u32(hasher, n as u32);
        }
        BodyLen::VarByte => write_u8(hasher, 1),
        BodyLen::VarShort => write_u8(hasher, 2),
    }
    write_u32(hasher, descriptor.fields.len() as u32);
    for field in descriptor.fields {
        write_u8(hasher, field_code(*field));
    }
}

const fn field_code(mode: FieldMode) -> u8 {
    match mode {
        FieldMode::U8 => 0,
        FieldMode::OffsetU8 => 1,
        FieldMode::LeU16 => 2,
        FieldMode::LeU32 => 3,
        FieldMode::V1U32 => 4,
        FieldMode::VarU32 => 5,
        FieldMode::CString => 6,
        FieldMode::VarBytes => 7,
        FieldMode::VarString => 8,
        FieldMode::Raw => 9,
    }
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_hash_is_stable() {
        assert_eq!(catalog_hash(), catalog_hash());
    }

    #[test]
    fn catalog_hash_is_nonzero() {
        // Zero would collide with "no catalog negotiated" sentinels.
        assert_ne!(catalog_hash(), 0);
    }
}
