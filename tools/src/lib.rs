//! Introspection and debugging tools for the opwire protocol.
//!
//! This crate provides utilities for understanding captured traffic and
//! exported track assets:
//!
//! - Split a capture into frames and report per-message sizes
//! - Decode captures into structured JSON
//! - Dump and verify audio track files
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not
//!   afterthoughts.
//! - **Human-readable output** - Make it easy to see what the codec is doing.

use anyhow::{Context, Result};
use bytestream::Reader;
use proto::{
    client_registry, server_registry, BodyLen, ClientMessage, Opcode, OpcodeFormat, ServerMessage,
};
use serde::Serialize;
use serde_json::json;
use track::{EventBody, Score};

/// One frame of a capture, as reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    /// Byte offset of the opcode header within the capture.
    pub offset: usize,
    pub opcode: u16,
    pub kind: String,
    pub body_bytes: usize,
}

fn read_frame<'a>(reader: &mut Reader<'a>, body_len: BodyLen) -> Result<&'a [u8]> {
    let body = match body_len {
        BodyLen::Fixed(n) => reader.read_bytes(n)?,
        BodyLen::VarByte => {
            let n = usize::from(reader.read_u8()?);
            reader.read_bytes(n)?
        }
        BodyLen::VarShort => {
            let n = usize::from(reader.read_le_u16()?);
            reader.read_bytes(n)?
        }
    };
    Ok(body)
}

/// Decodes a serverbound capture into messages.
pub fn decode_client_capture(bytes: &[u8]) -> Result<Vec<ClientMessage>> {
    let registry = client_registry(OpcodeFormat::Byte)?;
    let mut reader = Reader::new(bytes);
    let mut messages = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position();
        let opcode = OpcodeFormat::Byte.read(&mut reader)?;
        let kind = registry
            .lookup(opcode)
            .with_context(|| format!("frame at offset {offset}"))?;
        let body = read_frame(&mut reader, kind.descriptor().body_len)?;
        messages.push(proto::decode_message(&registry, opcode, body)?);
    }
    Ok(messages)
}

/// Decodes a clientbound capture into messages.
pub fn decode_server_capture(bytes: &[u8]) -> Result<Vec<ServerMessage>> {
    let registry = server_registry(OpcodeFormat::Byte)?;
    let mut reader = Reader::new(bytes);
    let mut messages = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position();
        let opcode = OpcodeFormat::Byte.read(&mut reader)?;
        let kind = registry
            .lookup(opcode)
            .with_context(|| format!("frame at offset {offset}"))?;
        let body = read_frame(&mut reader, kind.descriptor().body_len)?;
        messages.push(proto::decode_server_message(&registry, opcode, body)?);
    }
    Ok(messages)
}

/// Splits a serverbound capture into frame reports without decoding bodies.
pub fn inspect_client_capture(bytes: &[u8]) -> Result<Vec<FrameReport>> {
    let registry = client_registry(OpcodeFormat::Byte)?;
    inspect(bytes, |reader| {
        let opcode = OpcodeFormat::Byte.read(reader)?;
        let kind = registry.lookup(opcode)?;
        Ok((opcode, format!("{kind:?}"), kind.descriptor().body_len))
    })
}

/// Splits a clientbound capture into frame reports without decoding bodies.
pub fn inspect_server_capture(bytes: &[u8]) -> Result<Vec<FrameReport>> {
    let registry = server_registry(OpcodeFormat::Byte)?;
    inspect(bytes, |reader| {
        let opcode = OpcodeFormat::Byte.read(reader)?;
        let kind = registry.lookup(opcode)?;
        Ok((opcode, format!("{kind:?}"), kind.descriptor().body_len))
    })
}

fn inspect<F>(bytes: &[u8], mut head: F) -> Result<Vec<FrameReport>>
where
    F: FnMut(&mut Reader<'_>) -> Result<(Opcode, String, BodyLen)>,
{
    let mut reader = Reader::new(bytes);
    let mut reports = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position();
        let (opcode, kind, body_len) =
            head(&mut reader).with_context(|| format!("frame at offset {offset}"))?;
        let body = read_frame(&mut reader, body_len)?;
        reports.push(FrameReport {
            offset,
            opcode: opcode.raw(),
            kind,
            body_bytes: body.len(),
        });
    }
    Ok(reports)
}

/// Renders a score as JSON.
#[must_use]
pub fn score_to_json(score: &Score) -> serde_json::Value {
    json!({
        "resolution": score.resolution,
        "tracks": score
            .tracks
            .iter()
            .map(|track| track.events.iter().map(event_to_json).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    })
}

fn event_to_json(event: &track::TrackEvent) -> serde_json::Value {
    let body = match event.body {
        EventBody::NoteOn {
            channel,
            note,
            velocity,
        } => json!({"type": "note_on", "channel": channel, "note": note, "velocity": velocity}),
        EventBody::NoteOff {
            channel,
            note,
            velocity,
        } => json!({"type": "note_off", "channel": channel, "note": note, "velocity": velocity}),
        EventBody::KeyPressure {
            channel,
            note,
            pressure,
        } => json!({"type": "key_pressure", "channel": channel, "note": note, "pressure": pressure}),
        EventBody::ControlChange {
            channel,
            controller,
            value,
        } => {
            json!({"type": "control_change", "channel": channel, "controller": controller, "value": value})
        }
        EventBody::ProgramChange { channel, program } => {
            json!({"type": "program_change", "channel": channel, "program": program})
        }
        EventBody::ChannelPressure { channel, pressure } => {
            json!({"type": "channel_pressure", "channel": channel, "pressure": pressure})
        }
        EventBody::PitchBend { channel, lsb, msb } => {
            json!({"type": "pitch_bend", "channel": channel, "lsb": lsb, "msb": msb})
        }
        EventBody::Tempo { payload } => json!({"type": "tempo", "payload": payload}),
        EventBody::EndOfTrack => json!({"type": "end_of_track"}),
    };
    let mut object = body;
    object["tick"] = json!(event.tick);
    object
}
