//! Opcode registry, message catalog and session dispatch for the opwire
//! protocol.
//!
//! This crate turns framed `(opcode, body)` pairs into typed messages and
//! typed messages back into framed bytes. The transport layer owns sockets
//! and framing; game logic owns handlers; this crate owns the wire catalog.
//!
//! # Design Principles
//!
//! - **Closed catalog** - Every message shape is a variant of one of two sum
//!   types; the opcode tables are built once at startup and never mutated.
//! - **Bit-exact** - Field order and encoding modes reproduce the peer's
//!   wire format exactly; a round trip is byte-identical.
//! - **No I/O** - Encode and decode are pure transformations over in-memory
//!   buffers.
//! - **Explicit errors** - Configuration mistakes fail at startup; malformed
//!   input fails with structured errors, never a panic.

mod error;
mod hash;
mod limits;
mod message;
mod opcode;
mod registry;
mod session;

pub use error::{ProtoError, ProtoResult};
pub use hash::catalog_hash;
pub use limits::Limits;
pub use message::{
    client_registry, server_registry, BodyLen, ClientKind, ClientMessage, Descriptor, FieldMode,
    ServerKind, ServerMessage,
};
pub use opcode::{Direction, Opcode, OpcodeFormat};
pub use registry::{Registry, RegistryBuilder};
pub use session::{
    decode_message, decode_server_message, encode_message, Handler, Session,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Opcode::new(0);
        let _ = Direction::Serverbound;
        let _ = OpcodeFormat::Byte;
        let _ = Limits::default();
        let _ = catalog_hash();
        let _: ProtoResult<()> = Ok(());
    }

    #[test]
    fn registries_shareable_across_threads() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Registry<ClientKind>>();
        assert_sync::<Registry<ServerKind>>();
    }
}
