//! Backing-track and piano-roll scheduling
//!
//! Lays a [`ChordMelody`] out on the transport: one chord per measure, every
//! decoded note at its absolute tick.

use serde::Serialize;

use crate::chord::{parse_chord_name, strip_label_suffix};
use crate::melody::ChordMelody;
use crate::transport::{split_at_loop, TickSegment, Transport};

/// Backing chord for one measure
///
/// # Fields
/// - `label`: Response label of the chord (`"Am"`, `"Am_2"`)
/// - `midi_notes`: Voicing in the C3 octave, empty if the chord name is unknown
/// - `start_tick`: Measure start
/// - `duration_ticks`: One full measure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackingChord {
    pub label: String,
    pub measure: usize,
    pub midi_notes: Vec<u8>,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

/// A decoded melody note placed on the loop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNote {
    pub measure: usize,
    pub pitch: u8,
    pub velocity: u8,
    pub start_tick: u64,
    pub duration_ticks: u64,
    /// Visible intervals; two when the note crosses the loop end
    pub segments: Vec<TickSegment>,
}

/// Backing accompaniment, one chord per measure in progression order
pub fn backing_schedule(melody: &ChordMelody, transport: &Transport) -> Vec<BackingChord> {
    let measure_ticks = transport.ticks_per_measure();

    melody
        .tracks()
        .iter()
        .enumerate()
        .map(|(measure, track)| {
            let name = strip_label_suffix(&track.label);
            let midi_notes = match parse_chord_name(name) {
                Ok(info) => info.voicing(),
                Err(e) => {
                    tracing::warn!(label = %track.label, error = %e, "no backing voicing for chord");
                    Vec::new()
                }
            };
            BackingChord {
                label: track.label.clone(),
                measure,
                midi_notes,
                start_tick: measure as u64 * measure_ticks,
                duration_ticks: measure_ticks,
            }
        })
        .collect()
}

/// Every decoded note at its absolute position on the loop
///
/// A note starts at its measure's first tick plus its start time. Notes that
/// run past the last measure wrap to the loop start.
pub fn melody_schedule(melody: &ChordMelody, transport: &Transport) -> Vec<ScheduledNote> {
    let measure_ticks = transport.ticks_per_measure();
    let loop_ticks = transport.loop_ticks(melody.len());

    melody
        .tracks()
        .iter()
        .enumerate()
        .flat_map(|(measure, track)| {
            track.events.iter().map(move |event| {
                let start_tick = measure as u64 * measure_ticks + transport.ms_to_ticks(event.start_time_ms);
                let duration_ticks = transport.ms_to_ticks(event.duration_ms);
                ScheduledNote {
                    measure,
                    pitch: event.pitch,
                    velocity: event.velocity,
                    start_tick,
                    duration_ticks,
                    segments: split_at_loop(start_tick, duration_ticks, loop_ticks),
                }
            })
        })
        .collect()
}
