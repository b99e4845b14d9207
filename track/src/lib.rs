//! Column-wise delta event codec and the audio track format built on it.
//!
//! Ordered event streams with repeated attributes compress poorly row by
//! row: most attribute values barely change between consecutive events of
//! the same kind. This crate serializes such streams column-wise (all
//! values of one attribute together, each as a wrapping byte delta from the
//! previous value of that column) with event timing as var-int deltas.
//! The [`delta`] module is the generic machinery; [`Score`] and its codec
//! are the concrete audio asset format the game exports.
//!
//! # Design Principles
//!
//! - **Bit-exact** - The layout reproduces the external asset format; a
//!   decode/encode round trip is byte-identical.
//! - **Baselines survive skips** - An event without an attribute never
//!   perturbs that column's running delta.
//! - **Explicit errors** - Malformed input fails with structured errors,
//!   never a panic.
//!
//! # Example
//!
//! ```
//! use track::{decode_score, encode_score, EventBody, Score, Track, TrackEvent};
//!
//! let score = Score::new(
//!     vec![Track::new(vec![
//!         TrackEvent::new(0, EventBody::NoteOn { channel: 0, note: 60, velocity: 96 }),
//!         TrackEvent::new(48, EventBody::NoteOff { channel: 0, note: 60, velocity: 0 }),
//!         TrackEvent::new(48, EventBody::EndOfTrack),
//!     ])],
//!     96,
//! );
//!
//! let bytes = encode_score(&score).unwrap();
//! assert_eq!(decode_score(&bytes).unwrap(), score);
//! ```

pub mod delta;
mod error;
mod event;
mod score;

pub use error::{TrackError, TrackResult};
pub use event::{EventBody, Resolution, Score, Track, TrackEvent, MAX_CHANNEL};
pub use score::{decode_score, encode_score};
