//! Event and score types for the audio track format.

/// Highest channel the tag byte's 4-bit channel field can carry.
pub const MAX_CHANNEL: u8 = 15;

/// Ticks-per-beat resolution stored in the footer.
pub type Resolution = u16;

/// One timed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    /// Absolute timestamp in ticks, non-decreasing within a track.
    pub tick: u32,
    pub body: EventBody,
}

impl TrackEvent {
    /// Creates an event at `tick`.
    #[must_use]
    pub const fn new(tick: u32, body: EventBody) -> Self {
        Self { tick, body }
    }
}

/// The payload of one event.
///
/// Channel events carry a 0-15 channel; the two meta events carry none.
/// `Tempo` holds the vendor format's three opaque payload bytes verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBody {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    KeyPressure { channel: u8, note: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, lsb: u8, msb: u8 },
    Tempo { payload: [u8; 3] },
    EndOfTrack,
}

impl EventBody {
    /// Returns the channel for channel events, `None` for meta events.
    #[must_use]
    pub const fn channel(&self) -> Option<u8> {
        match self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::KeyPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(*channel),
            Self::Tempo { .. } | Self::EndOfTrack => None,
        }
    }
}

/// One ordered sequence of events, terminated by [`EventBody::EndOfTrack`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    pub events: Vec<TrackEvent>,
}

impl Track {
    /// Creates a track from events.
    #[must_use]
    pub const fn new(events: Vec<TrackEvent>) -> Self {
        Self { events }
    }
}

/// A complete score: every track plus the timing resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub tracks: Vec<Track>,
    pub resolution: Resolution,
}

impl Score {
    /// Creates a score.
    #[must_use]
    pub const fn new(tracks: Vec<Track>, resolution: Resolution) -> Self {
        Self { tracks, resolution }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_events_expose_channel() {
        let body = EventBody::NoteOn {
            channel: 9,
            note: 35,
            velocity: 100,
        };
        assert_eq!(body.channel(), Some(9));
    }

    #[test]
    fn meta_events_have_no_channel() {
        assert_eq!(EventBody::EndOfTrack.channel(), None);
        assert_eq!(
            EventBody::Tempo {
                payload: [7, 0xA1, 0x20],
            }
            .channel(),
            None
        );
    }
}
