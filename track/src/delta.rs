//! Column-wise running-delta primitives.
//!
//! An ordered event stream is serialized attribute by attribute: all values
//! of one attribute across all events form a column, and each value is
//! written as a wrapping byte delta from the previous value *of that
//! column*. Most deltas in real streams are near zero, which compresses far
//! better downstream than row-major layout. Events that do not carry the
//! attribute are skipped and leave the column baseline untouched.

use bytestream::{Reader, StreamResult, Writer};

/// Running baseline for one column.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaState {
    last: u8,
}

impl DeltaState {
    /// Creates a fresh baseline at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Returns the wire delta for `value` and advances the baseline.
    pub fn encode(&mut self, value: u8) -> u8 {
        let delta = value.wrapping_sub(self.last);
        self.last = value;
        delta
    }

    /// Applies a wire delta and returns the reconstructed value.
    pub fn decode(&mut self, delta: u8) -> u8 {
        self.last = self.last.wrapping_add(delta);
        self.last
    }
}

/// Per-attribute-key baselines for columns that fan out by a key byte
/// (one running delta per key, interleaved on the wire in event order).
#[derive(Debug, Clone)]
pub struct KeyedDeltaState {
    states: [DeltaState; 256],
}

impl Default for KeyedDeltaState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyedDeltaState {
    /// Creates fresh baselines at zero for every key.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: [DeltaState::new(); 256],
        }
    }

    /// Returns the wire delta for `value` under `key` and advances that
    /// key's baseline.
    pub fn encode(&mut self, key: u8, value: u8) -> u8 {
        self.states[key as usize].encode(value)
    }

    /// Applies a wire delta under `key` and returns the reconstructed value.
    pub fn decode(&mut self, key: u8, delta: u8) -> u8 {
        self.states[key as usize].decode(delta)
    }
}

/// Writes one column: for every event where `get` yields a value, emits the
/// wrapping delta from the previous carried value.
pub fn write_column<'a, E: 'a, I, F>(writer: &mut Writer, events: I, mut get: F) -> StreamResult<()>
where
    I: IntoIterator<Item = &'a E>,
    F: FnMut(&E) -> Option<u8>,
{
    let mut state = DeltaState::new();
    for event in events {
        if let Some(value) = get(event) {
            writer.write_u8(state.encode(value))?;
        }
    }
    Ok(())
}

/// Reads one column back: for every event where `slot` yields a slot, reads
/// a delta byte and stores the reconstructed value.
pub fn read_column<'a, E: 'a, I, F>(reader: &mut Reader<'_>, events: I, mut slot: F) -> StreamResult<()>
where
    I: IntoIterator<Item = &'a mut E>,
    F: FnMut(&mut E) -> Option<&mut u8>,
{
    let mut state = DeltaState::new();
    for event in events {
        if let Some(place) = slot(event) {
            let delta = reader.read_u8()?;
            *place = state.decode(delta);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_state_roundtrip() {
        let mut enc = DeltaState::new();
        let mut dec = DeltaState::new();
        for value in [60u8, 60, 64, 62, 0, 255, 1] {
            let delta = enc.encode(value);
            assert_eq!(dec.decode(delta), value);
        }
    }

    #[test]
    fn repeated_values_encode_as_zero() {
        let mut state = DeltaState::new();
        state.encode(100);
        assert_eq!(state.encode(100), 0);
        assert_eq!(state.encode(100), 0);
    }

    #[test]
    fn deltas_wrap_modulo_256() {
        let mut state = DeltaState::new();
        state.encode(250);
        // 5 - 250 wraps to 11.
        assert_eq!(state.encode(5), 11);
    }

    #[test]
    fn keyed_state_isolates_keys() {
        let mut enc = KeyedDeltaState::new();
        let mut dec = KeyedDeltaState::new();
        // Interleaved writes under two keys must not disturb each other.
        let script = [(7u8, 100u8), (10, 50), (7, 101), (10, 50), (7, 99)];
        for (key, value) in script {
            let delta = enc.encode(key, value);
            assert_eq!(dec.decode(key, delta), value, "key {key}");
        }
    }

    #[test]
    fn skipped_events_preserve_baseline() {
        struct Ev {
            carries: bool,
            value: u8,
        }
        let events = [
            Ev { carries: true, value: 10 },
            Ev { carries: false, value: 99 },
            Ev { carries: true, value: 11 },
        ];

        let mut writer = Writer::new();
        write_column(&mut writer, &events, |e: &Ev| e.carries.then_some(e.value)).unwrap();
        let bytes = writer.finish();

        // Two carried values only; the second delta is 11 - 10, not 11 - 99.
        assert_eq!(bytes, vec![10, 1]);

        let mut decoded = [
            Ev { carries: true, value: 0 },
            Ev { carries: false, value: 99 },
            Ev { carries: true, value: 0 },
        ];
        let mut reader = Reader::new(&bytes);
        read_column(&mut reader, &mut decoded, |e: &mut Ev| {
            e.carries.then_some(&mut e.value)
        })
        .unwrap();
        assert_eq!(decoded[0].value, 10);
        assert_eq!(decoded[1].value, 99);
        assert_eq!(decoded[2].value, 11);
    }
}
