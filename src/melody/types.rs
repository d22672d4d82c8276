//! Melody data type definitions

use serde::{Deserialize, Serialize};

use super::decoder::decode_melody;
use crate::error::JamError;

/// A single decoded note event
///
/// # Fields
/// - `pitch`: MIDI note number (0-127)
/// - `duration_ms`: How long the note sounds
/// - `wait_ms`: Gap from the previous event's start to this one's (not a duration)
/// - `velocity`: MIDI velocity (0-127)
/// - `start_time_ms`: Derived start offset within the chord, the sum of the
///   waits of this event and all earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub pitch: u8,
    pub duration_ms: f64,
    pub wait_ms: f64,
    pub velocity: u8,
    pub start_time_ms: f64,
}

/// Result of decoding one chord's payload
///
/// `total_wait_ms` is the running total after the last event, i.e. the loop
/// length of the chord in wait units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMelody {
    pub events: Vec<NoteEvent>,
    pub total_wait_ms: f64,
}

/// The decoded melody of one chord in the progression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordTrack {
    /// Response label, possibly with a duplicate suffix (`"Dm7_2"`)
    pub label: String,
    pub events: Vec<NoteEvent>,
    pub total_wait_ms: f64,
}

impl ChordTrack {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// All chord tracks of a generation, in progression order
///
/// Order is the key order of the backend's `chord_melodies` object: one chord
/// per measure, looped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordMelody {
    tracks: Vec<ChordTrack>,
}

impl ChordMelody {
    /// Decode `(label, base64)` pairs in order.
    ///
    /// A chord whose payload is not valid base64 or UTF-8 fails the whole
    /// melody; malformed lines inside a valid payload are only dropped.
    pub fn from_encoded<I, L, B>(pairs: I) -> Result<Self, JamError>
    where
        I: IntoIterator<Item = (L, B)>,
        L: Into<String>,
        B: AsRef<str>,
    {
        let mut tracks = Vec::new();
        for (label, blob) in pairs {
            let label = label.into();
            let decoded = decode_melody(blob.as_ref()).map_err(|e| match e {
                JamError::DecodeError { message, .. } => JamError::DecodeError {
                    chord: Some(label.clone()),
                    message,
                },
                other => other,
            })?;
            tracks.push(ChordTrack {
                label,
                events: decoded.events,
                total_wait_ms: decoded.total_wait_ms,
            });
        }
        Ok(ChordMelody { tracks })
    }

    pub fn from_tracks(tracks: Vec<ChordTrack>) -> Self {
        ChordMelody { tracks }
    }

    pub fn tracks(&self) -> &[ChordTrack] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&ChordTrack> {
        self.tracks.get(index)
    }

    pub fn get(&self, label: &str) -> Option<&ChordTrack> {
        self.tracks.iter().find(|t| t.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.label.as_str())
    }

    /// Number of chords, which is also the number of measures in the loop.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
