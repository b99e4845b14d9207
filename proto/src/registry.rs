//! Direction-scoped opcode registries.
//!
//! A registry is built once at process start from the message catalog and is
//! immutable afterwards; it can be shared by reference across every active
//! connection. Lookup is a dense table indexed by opcode.

use crate::error::{ProtoError, ProtoResult};
use crate::opcode::{Direction, Opcode, OpcodeFormat};

/// An immutable opcode-to-kind table for one direction.
#[derive(Debug, Clone)]
pub struct Registry<K> {
    direction: Direction,
    format: OpcodeFormat,
    table: Vec<Option<K>>,
}

impl<K: Copy> Registry<K> {
    /// Returns the direction this registry covers.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the opcode header format.
    #[must_use]
    pub const fn format(&self) -> OpcodeFormat {
        self.format
    }

    /// Looks up the kind registered for `opcode`.
    pub fn lookup(&self, opcode: Opcode) -> ProtoResult<K> {
        self.get(opcode).ok_or(ProtoError::UnknownOpcode {
            opcode,
            direction: self.direction,
        })
    }

    /// Returns the kind registered for `opcode`, if any.
    #[must_use]
    pub fn get(&self, opcode: Opcode) -> Option<K> {
        self.table.get(opcode.raw() as usize).copied().flatten()
    }

    /// Returns the number of registered opcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if no opcodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(opcode, kind)` entries in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, K)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(raw, slot)| slot.map(|kind| (Opcode::new(raw as u16), kind)))
    }
}

/// Builder for a [`Registry`]. Validation happens in [`build`](Self::build):
/// a duplicate or out-of-format-range opcode is a fatal configuration error
/// raised at startup, never per-message.
#[derive(Debug)]
pub struct RegistryBuilder<K> {
    direction: Direction,
    format: OpcodeFormat,
    entries: Vec<(Opcode, K)>,
}

impl<K: Copy> RegistryBuilder<K> {
    /// Creates an empty builder for one direction.
    #[must_use]
    pub const fn new(direction: Direction, format: OpcodeFormat) -> Self {
        Self {
            direction,
            format,
            entries: Vec::new(),
        }
    }

    /// Adds one `(opcode, kind)` binding.
    #[must_use]
    pub fn register(mut self, opcode: Opcode, kind: K) -> Self {
        self.entries.push((opcode, kind));
        self
    }

    /// Validates the entries and builds the immutable registry.
    pub fn build(self) -> ProtoResult<Registry<K>> {
        let max = self.format.max_opcode();
        let mut table: Vec<Option<K>> = Vec::new();
        for (opcode, kind) in self.entries {
            if opcode.raw() > max {
                return Err(ProtoError::OpcodeOutOfRange { opcode, max });
            }
            let index = opcode.raw() as usize;
            if table.len() <= index {
                table.resize(index + 1, None);
            }
            if table[index].is_some() {
                return Err(ProtoError::RegistryConflict {
                    opcode,
                    direction: self.direction,
                });
            }
            table[index] = Some(kind);
        }
        Ok(Registry {
            direction: self.direction,
            format: self.format,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn lookup_registered() {
        let registry = RegistryBuilder::new(Direction::Serverbound, OpcodeFormat::Byte)
            .register(Opcode::new(1), Kind::A)
            .register(Opcode::new(9), Kind::B)
            .build()
            .unwrap();
        assert_eq!(registry.lookup(Opcode::new(1)).unwrap(), Kind::A);
        assert_eq!(registry.lookup(Opcode::new(9)).unwrap(), Kind::B);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_unregistered_fails() {
        let registry = RegistryBuilder::new(Direction::Serverbound, OpcodeFormat::Byte)
            .register(Opcode::new(1), Kind::A)
            .build()
            .unwrap();
        let err = registry.lookup(Opcode::new(2)).unwrap_err();
        assert_eq!(
            err,
            ProtoError::UnknownOpcode {
                opcode: Opcode::new(2),
                direction: Direction::Serverbound,
            }
        );
    }

    #[test]
    fn duplicate_opcode_conflicts() {
        let err = RegistryBuilder::new(Direction::Clientbound, OpcodeFormat::Byte)
            .register(Opcode::new(5), Kind::A)
            .register(Opcode::new(5), Kind::B)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ProtoError::RegistryConflict {
                opcode: Opcode::new(5),
                direction: Direction::Clientbound,
            }
        );
    }

    #[test]
    fn opcode_out_of_byte_range() {
        let err = RegistryBuilder::new(Direction::Clientbound, OpcodeFormat::Byte)
            .register(Opcode::new(300), Kind::A)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ProtoError::OpcodeOutOfRange {
                opcode: Opcode::new(300),
                max: 255,
            }
        );
    }

    #[test]
    fn short_format_allows_wide_opcodes() {
        let registry = RegistryBuilder::new(Direction::Clientbound, OpcodeFormat::Short)
            .register(Opcode::new(300), Kind::A)
            .build()
            .unwrap();
        assert_eq!(registry.lookup(Opcode::new(300)).unwrap(), Kind::A);
    }

    #[test]
    fn iter_in_opcode_order() {
        let registry = RegistryBuilder::new(Direction::Serverbound, OpcodeFormat::Byte)
            .register(Opcode::new(9), Kind::B)
            .register(Opcode::new(1), Kind::A)
            .build()
            .unwrap();
        let entries: Vec<_> = registry.iter().collect();
        assert_eq!(entries, vec![(Opcode::new(1), Kind::A), (Opcode::new(9), Kind::B)]);
    }

    #[test]
    fn empty_registry() {
        let registry = RegistryBuilder::<Kind>::new(Direction::Serverbound, OpcodeFormat::Byte)
            .build()
            .unwrap();
        assert!(registry.is_empty());
    }
}
