//! Error types for track encoding/decoding.

use std::fmt;

use bytestream::StreamError;

/// Result type for track operations.
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors that can occur while encoding or decoding a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// Cursor-level failure (truncation, size cap).
    Stream(StreamError),

    /// Event tag byte not in the catalog.
    InvalidEventTag { tag: u8 },

    /// Buffer too short to hold the trailing footer.
    MissingFooter { len: usize },

    /// A track is empty, ends without an end-of-track marker, or carries
    /// one before its final event.
    MisplacedEndOfTrack { track: usize },

    /// Event timestamps must be non-decreasing within a track.
    NonMonotonicTick { track: usize, index: usize },

    /// Channel does not fit the tag's 4-bit channel field.
    ChannelOutOfRange { channel: u8 },

    /// More tracks than the footer's count byte can hold.
    TooManyTracks { count: usize },

    /// Bytes left over after the last column was decoded.
    TrailingData { remaining: usize },
}

impl From<StreamError> for TrackError {
    fn from(err: StreamError) -> Self {
        Self::Stream(err)
    }
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(err) => write!(f, "stream error: {err}"),
            Self::InvalidEventTag { tag } => write!(f, "invalid event tag 0x{tag:02X}"),
            Self::MissingFooter { len } => {
                write!(f, "buffer of {len} bytes cannot hold a footer")
            }
            Self::MisplacedEndOfTrack { track } => {
                write!(f, "track {track} must end with exactly one end-of-track")
            }
            Self::NonMonotonicTick { track, index } => {
                write!(f, "track {track} event {index} moves backwards in time")
            }
            Self::ChannelOutOfRange { channel } => {
                write!(f, "channel {channel} does not fit 4 bits")
            }
            Self::TooManyTracks { count } => {
                write!(f, "{count} tracks exceed the footer's count byte")
            }
            Self::TrailingData { remaining } => {
                write!(f, "{remaining} bytes left after the last column")
            }
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}
