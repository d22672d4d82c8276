//! # Melody Module
//!
//! Decode backend melody payloads into timed note events.
//!
//! ## Purpose
//! The generation backend returns, for every chord of the progression, a
//! base64 string of newline-delimited `pitch duration wait velocity` lines.
//! This module turns that into:
//! 1. **Note events** - MIDI pitch, duration, velocity and derived start time
//! 2. **Chord tracks** - the events of one chord plus its loop length
//! 3. **Chord melodies** - all tracks in progression order
//!
//! ## Sub-modules
//! - `types` - NoteEvent, DecodedMelody, ChordTrack, ChordMelody
//! - `decoder` - base64 and line decoding
//!
//! ## Timing Model
//!
//! `wait` is the gap from the previous event's start to this event's start,
//! not a duration. Start times are the running sum of the waits up to and
//! including the event's own:
//!
//! ```text
//! pitch duration wait velocity      start
//! 60    500      0    100           0
//! 64    500      250  90            250
//! 67    500      250  90            500
//! ```
//!
//! The total of all waits is the start of the last event.
//!
//! ## Example
//! ```rust
//! use base64::{engine::general_purpose::STANDARD, Engine};
//! use jam::melody::decode_melody;
//!
//! let blob = STANDARD.encode("60 500 0 100\n64 500 250 90\n");
//! let melody = decode_melody(&blob).unwrap();
//!
//! assert_eq!(melody.events.len(), 2);
//! assert_eq!(melody.events[1].start_time_ms, 250.0);
//! assert_eq!(melody.total_wait_ms, 250.0);
//! ```

mod decoder;
mod types;


pub use decoder::{decode_melody, parse_melody_text, DEFAULT_VELOCITY};
pub use types::{ChordMelody, ChordTrack, DecodedMelody, NoteEvent};
