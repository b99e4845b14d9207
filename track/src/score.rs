//! The binary score format.
//!
//! Layout, in order: one tag byte per event for every track (a track ends
//! at its end-of-track tag); per-event var-int timestamp deltas with the
//! baseline reset at each track; the attribute columns in a fixed order;
//! raw tempo payloads; a footer holding the track count and the timing
//! resolution. Column baselines run across track boundaries; only the tag
//! channel state and the timestamp baseline are per track.
//!
//! The decoder reads the footer first, from the end of the buffer, then
//! replays every section symmetrically.

use bytestream::{Reader, Writer};

use crate::delta::{read_column, write_column, KeyedDeltaState};
use crate::error::{TrackError, TrackResult};
use crate::event::{EventBody, Score, Track, TrackEvent, MAX_CHANNEL};

const TAG_NOTE_ON: u8 = 0;
const TAG_NOTE_OFF: u8 = 1;
const TAG_CONTROL_CHANGE: u8 = 2;
const TAG_PITCH_BEND: u8 = 3;
const TAG_CHANNEL_PRESSURE: u8 = 4;
const TAG_KEY_PRESSURE: u8 = 5;
const TAG_PROGRAM_CHANGE: u8 = 6;
const TAG_END_OF_TRACK: u8 = 7;
const TAG_TEMPO: u8 = 23;

const FOOTER_SIZE: usize = 3;

/// Sustain/sostenuto and channel-mode switches, given their own early
/// column group.
const SWITCH_CONTROLLERS: [u8; 5] = [64, 65, 120, 121, 123];

/// Controllers with dedicated columns later in the layout.
const DEDICATED_CONTROLLERS: [u8; 12] = [0, 32, 1, 33, 7, 39, 10, 42, 99, 98, 101, 100];

fn is_grouped(controller: u8) -> bool {
    SWITCH_CONTROLLERS.contains(&controller) || DEDICATED_CONTROLLERS.contains(&controller)
}

fn events(score: &Score) -> impl Iterator<Item = &TrackEvent> {
    score.tracks.iter().flat_map(|track| track.events.iter())
}

fn events_mut(score: &mut Score) -> impl Iterator<Item = &mut TrackEvent> {
    score
        .tracks
        .iter_mut()
        .flat_map(|track| track.events.iter_mut())
}

/// Encodes a score to its binary form.
pub fn encode_score(score: &Score) -> TrackResult<Vec<u8>> {
    validate(score)?;

    let mut writer = Writer::with_max(usize::MAX);
    write_tags(&mut writer, score)?;
    write_times(&mut writer, score)?;
    write_columns(&mut writer, score)?;

    writer.write_u8(score.tracks.len() as u8)?;
    writer.write_bytes(&score.resolution.to_be_bytes())?;
    Ok(writer.finish())
}

/// Decodes a score from its binary form.
pub fn decode_score(bytes: &[u8]) -> TrackResult<Score> {
    if bytes.len() < FOOTER_SIZE {
        return Err(TrackError::MissingFooter { len: bytes.len() });
    }
    let body_len = bytes.len() - FOOTER_SIZE;
    let track_count = bytes[body_len] as usize;
    let resolution = u16::from_be_bytes([bytes[body_len + 1], bytes[body_len + 2]]);

    let mut reader = Reader::new(&bytes[..body_len]);
    let mut score = Score::new(Vec::with_capacity(track_count), resolution);
    for _ in 0..track_count {
        let track = read_track_tags(&mut reader)?;
        score.tracks.push(track);
    }

    read_times(&mut reader, &mut score)?;
    read_columns(&mut reader, &mut score)?;

    if !reader.is_empty() {
        return Err(TrackError::TrailingData {
            remaining: reader.remaining(),
        });
    }
    Ok(score)
}

fn validate(score: &Score) -> TrackResult<()> {
    if score.tracks.len() > usize::from(u8::MAX) {
        return Err(TrackError::TooManyTracks {
            count: score.tracks.len(),
        });
    }
    for (track_index, track) in score.tracks.iter().enumerate() {
        let Some((last, rest)) = track.events.split_last() else {
            return Err(TrackError::MisplacedEndOfTrack { track: track_index });
        };
        if last.body != EventBody::EndOfTrack
            || rest.iter().any(|event| event.body == EventBody::EndOfTrack)
        {
            return Err(TrackError::MisplacedEndOfTrack { track: track_index });
        }

        let mut last_tick = 0u32;
        for (index, event) in track.events.iter().enumerate() {
            if event.tick < last_tick {
                return Err(TrackError::NonMonotonicTick {
                    track: track_index,
                    index,
                });
            }
            last_tick = event.tick;
            if let Some(channel) = event.body.channel() {
                if channel > MAX_CHANNEL {
                    return Err(TrackError::ChannelOutOfRange { channel });
                }
            }
        }
    }
    Ok(())
}

const fn tag_parts(body: &EventBody) -> (u8, Option<u8>) {
    match body {
        EventBody::NoteOn { channel, .. } => (TAG_NOTE_ON, Some(*channel)),
        EventBody::NoteOff { channel, .. } => (TAG_NOTE_OFF, Some(*channel)),
        EventBody::ControlChange { channel, .. } => (TAG_CONTROL_CHANGE, Some(*channel)),
        EventBody::PitchBend { channel, .. } => (TAG_PITCH_BEND, Some(*channel)),
        EventBody::ChannelPressure { channel, .. } => (TAG_CHANNEL_PRESSURE, Some(*channel)),
        EventBody::KeyPressure { channel, .. } => (TAG_KEY_PRESSURE, Some(*channel)),
        EventBody::ProgramChange { channel, .. } => (TAG_PROGRAM_CHANGE, Some(*channel)),
        EventBody::Tempo { .. } => (TAG_TEMPO, None),
        EventBody::EndOfTrack => (TAG_END_OF_TRACK, None),
    }
}

fn write_tags(writer: &mut Writer, score: &Score) -> TrackResult<()> {
    for track in &score.tracks {
        let mut prev_channel = 0u8;
        for event in &track.events {
            let tag = match tag_parts(&event.body) {
                (kind, Some(channel)) => {
                    let tag = kind | ((channel ^ prev_channel) << 4);
                    prev_channel = channel;
                    tag
                }
                (kind, None) => kind,
            };
            writer.write_u8(tag)?;
        }
    }
    Ok(())
}

fn read_track_tags(reader: &mut Reader<'_>) -> TrackResult<Track> {
    let mut events = Vec::new();
    let mut prev_channel = 0u8;
    loop {
        let tag = reader.read_u8()?;
        if tag == TAG_TEMPO {
            events.push(TrackEvent::new(0, EventBody::Tempo { payload: [0; 3] }));
            continue;
        }
        if tag == TAG_END_OF_TRACK {
            events.push(TrackEvent::new(0, EventBody::EndOfTrack));
            return Ok(Track::new(events));
        }

        let channel = (tag >> 4) ^ prev_channel;
        let body = match tag & 0x0F {
            TAG_NOTE_ON => EventBody::NoteOn {
                channel,
                note: 0,
                velocity: 0,
            },
            TAG_NOTE_OFF => EventBody::NoteOff {
                channel,
                note: 0,
                velocity: 0,
            },
            TAG_CONTROL_CHANGE => EventBody::ControlChange {
                channel,
                controller: 0,
                value: 0,
            },
            TAG_PITCH_BEND => EventBody::PitchBend {
                channel,
                lsb: 0,
                msb: 0,
            },
            TAG_CHANNEL_PRESSURE => EventBody::ChannelPressure {
                channel,
                pressure: 0,
            },
            TAG_KEY_PRESSURE => EventBody::KeyPressure {
                channel,
                note: 0,
                pressure: 0,
            },
            TAG_PROGRAM_CHANGE => EventBody::ProgramChange {
                channel,
                program: 0,
            },
            _ => return Err(TrackError::InvalidEventTag { tag }),
        };
        prev_channel = channel;
        events.push(TrackEvent::new(0, body));
    }
}

fn write_times(writer: &mut Writer, score: &Score) -> TrackResult<()> {
    for track in &score.tracks {
        let mut last_tick = 0u32;
        for event in &track.events {
            writer.write_var_u32(event.tick - last_tick)?;
            last_tick = event.tick;
        }
    }
    Ok(())
}

fn read_times(reader: &mut Reader<'_>, score: &mut Score) -> TrackResult<()> {
    for (track_index, track) in score.tracks.iter_mut().enumerate() {
        let mut last_tick = 0u32;
        for (index, event) in track.events.iter_mut().enumerate() {
            let delta = reader.read_var_u32()?;
            last_tick = last_tick
                .checked_add(delta)
                .ok_or(TrackError::NonMonotonicTick {
                    track: track_index,
                    index,
                })?;
            event.tick = last_tick;
        }
    }
    Ok(())
}

fn write_cc_values<F>(
    writer: &mut Writer,
    score: &Score,
    bank: &mut KeyedDeltaState,
    mut select: F,
) -> TrackResult<()>
where
    F: FnMut(u8) -> bool,
{
    for event in events(score) {
        if let EventBody::ControlChange {
            controller, value, ..
        } = event.body
        {
            if select(controller) {
                writer.write_u8(bank.encode(controller, value))?;
            }
        }
    }
    Ok(())
}

fn read_cc_values<F>(
    reader: &mut Reader<'_>,
    score: &mut Score,
    bank: &mut KeyedDeltaState,
    mut select: F,
) -> TrackResult<()>
where
    F: FnMut(u8) -> bool,
{
    for event in events_mut(score) {
        if let EventBody::ControlChange {
            controller, value, ..
        } = &mut event.body
        {
            if select(*controller) {
                let delta = reader.read_u8()?;
                *value = bank.decode(*controller, delta);
            }
        }
    }
    Ok(())
}

fn write_columns(writer: &mut Writer, score: &Score) -> TrackResult<()> {
    let mut bank = KeyedDeltaState::new();

    // Controller numbers.
    write_column(writer, events(score), |event| match event.body {
        EventBody::ControlChange { controller, .. } => Some(controller),
        _ => None,
    })?;

    write_cc_values(writer, score, &mut bank, |c| {
        SWITCH_CONTROLLERS.contains(&c)
    })?;

    write_column(writer, events(score), |event| match event.body {
        EventBody::KeyPressure { pressure, .. } => Some(pressure),
        _ => None,
    })?;

    write_column(writer, events(score), |event| match event.body {
        EventBody::ChannelPressure { pressure, .. } => Some(pressure),
        _ => None,
    })?;

    write_column(writer, events(score), |event| match event.body {
        EventBody::PitchBend { msb, .. } => Some(msb),
        _ => None,
    })?;

    for dedicated in [1u8, 7, 10] {
        write_cc_values(writer, score, &mut bank, |c| c == dedicated)?;
    }

    // Note numbers: note-on, note-off and key pressure share one column.
    write_column(writer, events(score), |event| match event.body {
        EventBody::NoteOn { note, .. }
        | EventBody::NoteOff { note, .. }
        | EventBody::KeyPressure { note, .. } => Some(note),
        _ => None,
    })?;

    write_column(writer, events(score), |event| match event.body {
        EventBody::NoteOn { velocity, .. } => Some(velocity),
        _ => None,
    })?;

    // Everything without a dedicated column, grouped for better ratios.
    write_cc_values(writer, score, &mut bank, |c| !is_grouped(c))?;

    write_column(writer, events(score), |event| match event.body {
        EventBody::NoteOff { velocity, .. } => Some(velocity),
        _ => None,
    })?;

    for dedicated in [33u8, 39, 42] {
        write_cc_values(writer, score, &mut bank, |c| c == dedicated)?;
    }

    // Bank selects interleaved with raw program numbers, in event order.
    for event in events(score) {
        match event.body {
            EventBody::ControlChange {
                controller, value, ..
            } if controller == 0 || controller == 32 => {
                writer.write_u8(bank.encode(controller, value))?;
            }
            EventBody::ProgramChange { program, .. } => {
                writer.write_u8(program)?;
            }
            _ => {}
        }
    }

    write_column(writer, events(score), |event| match event.body {
        EventBody::PitchBend { lsb, .. } => Some(lsb),
        _ => None,
    })?;

    for dedicated in [99u8, 98, 101, 100] {
        write_cc_values(writer, score, &mut bank, |c| c == dedicated)?;
    }

    // Tempo payloads are opaque vendor bytes, copied verbatim.
    for event in events(score) {
        if let EventBody::Tempo { payload } = event.body {
            writer.write_bytes(&payload)?;
        }
    }

    Ok(())
}

fn read_columns(reader: &mut Reader<'_>, score: &mut Score) -> TrackResult<()> {
    let mut bank = KeyedDeltaState::new();

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::ControlChange { controller, .. } => Some(controller),
        _ => None,
    })?;

    read_cc_values(reader, score, &mut bank, |c| SWITCH_CONTROLLERS.contains(&c))?;

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::KeyPressure { pressure, .. } => Some(pressure),
        _ => None,
    })?;

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::ChannelPressure { pressure, .. } => Some(pressure),
        _ => None,
    })?;

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::PitchBend { msb, .. } => Some(msb),
        _ => None,
    })?;

    for dedicated in [1u8, 7, 10] {
        read_cc_values(reader, score, &mut bank, |c| c == dedicated)?;
    }

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::NoteOn { note, .. }
        | EventBody::NoteOff { note, .. }
        | EventBody::KeyPressure { note, .. } => Some(note),
        _ => None,
    })?;

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::NoteOn { velocity, .. } => Some(velocity),
        _ => None,
    })?;

    read_cc_values(reader, score, &mut bank, |c| !is_grouped(c))?;

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::NoteOff { velocity, .. } => Some(velocity),
        _ => None,
    })?;

    for dedicated in [33u8, 39, 42] {
        read_cc_values(reader, score, &mut bank, |c| c == dedicated)?;
    }

    for event in events_mut(score) {
        match &mut event.body {
            EventBody::ControlChange {
                controller, value, ..
            } if *controller == 0 || *controller == 32 => {
                let delta = reader.read_u8()?;
                *value = bank.decode(*controller, delta);
            }
            EventBody::ProgramChange { program, .. } => {
                *program = reader.read_u8()?;
            }
            _ => {}
        }
    }

    read_column(reader, events_mut(score), |event| match &mut event.body {
        EventBody::PitchBend { lsb, .. } => Some(lsb),
        _ => None,
    })?;

    for dedicated in [99u8, 98, 101, 100] {
        read_cc_values(reader, score, &mut bank, |c| c == dedicated)?;
    }

    for event in events_mut(score) {
        if let EventBody::Tempo { payload } = &mut event.body {
            payload.copy_from_slice(reader.read_bytes(3)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(tick: u32, channel: u8, note: u8, velocity: u8) -> TrackEvent {
        TrackEvent::new(
            tick,
            EventBody::NoteOn {
                channel,
                note,
                velocity,
            },
        )
    }

    fn end(tick: u32) -> TrackEvent {
        TrackEvent::new(tick, EventBody::EndOfTrack)
    }

    #[test]
    fn minimal_score_roundtrip() {
        let score = Score::new(vec![Track::new(vec![end(0)])], 96);
        let bytes = encode_score(&score).unwrap();
        assert_eq!(decode_score(&bytes).unwrap(), score);
    }

    #[test]
    fn footer_is_trailing() {
        let score = Score::new(vec![Track::new(vec![end(0)])], 0x0180);
        let bytes = encode_score(&score).unwrap();
        let n = bytes.len();
        assert_eq!(bytes[n - 3], 1, "track count");
        assert_eq!(&bytes[n - 2..], &[0x01, 0x80], "big-endian resolution");
    }

    #[test]
    fn tag_channel_is_xor_of_previous() {
        let score = Score::new(
            vec![Track::new(vec![
                note_on(0, 3, 60, 100),
                note_on(0, 3, 64, 100),
                note_on(0, 5, 67, 100),
                end(0),
            ])],
            96,
        );
        let bytes = encode_score(&score).unwrap();
        // First tag: channel 3 xor 0; second: 3 xor 3 = 0; third: 5 xor 3.
        assert_eq!(bytes[0], TAG_NOTE_ON | (3 << 4));
        assert_eq!(bytes[1], TAG_NOTE_ON);
        assert_eq!(bytes[2], TAG_NOTE_ON | ((5 ^ 3) << 4));
        assert_eq!(bytes[3], TAG_END_OF_TRACK);
    }

    #[test]
    fn empty_track_rejected() {
        let score = Score::new(vec![Track::new(Vec::new())], 96);
        let err = encode_score(&score).unwrap_err();
        assert_eq!(err, TrackError::MisplacedEndOfTrack { track: 0 });
    }

    #[test]
    fn end_of_track_must_be_last() {
        let score = Score::new(
            vec![Track::new(vec![end(0), note_on(0, 0, 60, 100), end(0)])],
            96,
        );
        let err = encode_score(&score).unwrap_err();
        assert_eq!(err, TrackError::MisplacedEndOfTrack { track: 0 });
    }

    #[test]
    fn decreasing_ticks_rejected() {
        let score = Score::new(
            vec![Track::new(vec![
                note_on(10, 0, 60, 100),
                note_on(5, 0, 62, 100),
                end(5),
            ])],
            96,
        );
        let err = encode_score(&score).unwrap_err();
        assert_eq!(err, TrackError::NonMonotonicTick { track: 0, index: 1 });
    }

    #[test]
    fn wide_channel_rejected() {
        let score = Score::new(
            vec![Track::new(vec![note_on(0, 16, 60, 100), end(0)])],
            96,
        );
        let err = encode_score(&score).unwrap_err();
        assert_eq!(err, TrackError::ChannelOutOfRange { channel: 16 });
    }

    #[test]
    fn invalid_tag_rejected() {
        // Low nibble 7 with a channel nibble is not a legal meta tag.
        let bytes = [0x27u8, 0x00, 1, 0, 96];
        let err = decode_score(&bytes).unwrap_err();
        assert_eq!(err, TrackError::InvalidEventTag { tag: 0x27 });
    }

    #[test]
    fn short_buffer_missing_footer() {
        let err = decode_score(&[1, 2]).unwrap_err();
        assert_eq!(err, TrackError::MissingFooter { len: 2 });
    }

    #[test]
    fn trailing_bytes_rejected() {
        let score = Score::new(vec![Track::new(vec![end(0)])], 96);
        let mut bytes = encode_score(&score).unwrap();
        // Inject a stray byte between the sections and the footer.
        let footer_at = bytes.len() - FOOTER_SIZE;
        bytes.insert(footer_at, 0xEE);
        let err = decode_score(&bytes).unwrap_err();
        assert_eq!(err, TrackError::TrailingData { remaining: 1 });
    }
}
