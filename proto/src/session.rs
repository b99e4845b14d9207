//! Per-connection dispatch and outbound framing.
//!
//! The transport collaborator frames raw socket bytes into `(opcode, body)`
//! pairs and hands them to a [`Session`]; the session decodes, passes the
//! entity to the [`Handler`], and queues the handler's replies into the
//! outbound buffer for the transport to drain. The codec itself never
//! performs I/O.

use bytestream::{Reader, StreamError, Writer};

use crate::error::{ProtoError, ProtoResult};
use crate::limits::Limits;
use crate::message::{BodyLen, ClientKind, ClientMessage, ServerKind, ServerMessage};
use crate::opcode::Opcode;
use crate::registry::Registry;

/// Decodes one framed serverbound message.
pub fn decode_message(
    registry: &Registry<ClientKind>,
    opcode: Opcode,
    body: &[u8],
) -> ProtoResult<ClientMessage> {
    let kind = registry.lookup(opcode)?;
    let mut reader = Reader::new(body);
    kind.decode_body(&mut reader)
}

/// Decodes one framed clientbound message (used by tooling and tests; the
/// live peer for this direction is the game client).
pub fn decode_server_message(
    registry: &Registry<ServerKind>,
    opcode: Opcode,
    body: &[u8],
) -> ProtoResult<ServerMessage> {
    let kind = registry.lookup(opcode)?;
    let mut reader = Reader::new(body);
    kind.decode_body(&mut reader)
}

/// Encodes one clientbound message: opcode header, size field for variable
/// bodies, then the body. The size field is written as a placeholder,
/// patched after the body length is known.
pub fn encode_message(
    registry: &Registry<ServerKind>,
    message: &ServerMessage,
    writer: &mut Writer,
) -> ProtoResult<()> {
    let descriptor = message.kind().descriptor();
    registry.format().write(writer, descriptor.opcode)?;

    let size_at = writer.position();
    match descriptor.body_len {
        BodyLen::Fixed(_) => {}
        BodyLen::VarByte => writer.write_u8(0)?,
        BodyLen::VarShort => writer.write_le_u16(0)?,
    }

    let body_start = writer.position();
    message.encode_body(writer)?;
    let end = writer.position();
    let body_len = end - body_start;

    match descriptor.body_len {
        BodyLen::Fixed(declared) => {
            if body_len != declared {
                return Err(ProtoError::BodyLengthMismatch {
                    opcode: descriptor.opcode,
                    declared,
                    actual: body_len,
                });
            }
        }
        BodyLen::VarByte => {
            let len = check_prefix_range(body_len, usize::from(u8::MAX))?;
            writer.set_position(size_at)?;
            writer.write_u8(len as u8)?;
            writer.set_position(end)?;
        }
        BodyLen::VarShort => {
            let len = check_prefix_range(body_len, usize::from(u16::MAX))?;
            writer.set_position(size_at)?;
            writer.write_le_u16(len as u16)?;
            writer.set_position(end)?;
        }
    }
    Ok(())
}

fn check_prefix_range(body_len: usize, max: usize) -> ProtoResult<usize> {
    if body_len > max {
        return Err(ProtoError::Stream(StreamError::MessageTooLarge {
            attempted: body_len,
            max,
        }));
    }
    Ok(body_len)
}

/// Application callback for decoded messages.
pub trait Handler {
    /// Handles one decoded message, returning zero or more replies to send.
    fn handle(&mut self, message: ClientMessage) -> Vec<ServerMessage>;
}

/// Per-connection codec state.
///
/// One session per connection; the registries are shared by reference and
/// never mutated. Messages are processed strictly in the order the
/// transport framed them.
#[derive(Debug)]
pub struct Session<'r> {
    client: &'r Registry<ClientKind>,
    server: &'r Registry<ServerKind>,
    scratch: Writer,
    outbound: Vec<u8>,
}

impl<'r> Session<'r> {
    /// Creates a session over the two direction registries.
    #[must_use]
    pub fn new(
        client: &'r Registry<ClientKind>,
        server: &'r Registry<ServerKind>,
        limits: &Limits,
    ) -> Self {
        Self {
            client,
            server,
            scratch: Writer::with_max(limits.max_message_bytes),
            outbound: Vec::new(),
        }
    }

    /// Decodes one framed serverbound message.
    pub fn decode(&self, opcode: Opcode, body: &[u8]) -> ProtoResult<ClientMessage> {
        decode_message(self.client, opcode, body)
    }

    /// Decodes one framed message and hands it to `handler`, queueing every
    /// reply. A decode failure leaves the outbound buffer untouched.
    pub fn dispatch<H: Handler>(
        &mut self,
        opcode: Opcode,
        body: &[u8],
        handler: &mut H,
    ) -> ProtoResult<()> {
        let message = self.decode(opcode, body)?;
        for reply in handler.handle(message) {
            self.queue(&reply)?;
        }
        Ok(())
    }

    /// Encodes one clientbound message into the outbound buffer.
    ///
    /// A message that fails to encode is not queued, not even partially.
    pub fn queue(&mut self, message: &ServerMessage) -> ProtoResult<()> {
        self.scratch.clear();
        encode_message(self.server, message, &mut self.scratch)?;
        self.outbound.extend_from_slice(self.scratch.as_slice());
        Ok(())
    }

    /// Returns the bytes queued for the transport to send.
    #[must_use]
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Takes the queued outbound bytes, leaving the buffer empty.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}
