//! Melody payload decoding
//!
//! Converts a base64 payload of `pitch duration wait velocity` lines into
//! [`NoteEvent`]s with derived start times.

use base64::{engine::general_purpose::STANDARD, Engine};

use super::types::{DecodedMelody, NoteEvent};
use crate::error::JamError;

/// Velocity used when a line has no usable velocity field
pub const DEFAULT_VELOCITY: u8 = 100;

/// Decode a base64 melody payload
///
/// ASCII whitespace inside the payload is ignored, so line-wrapped base64 is
/// accepted. The decoded text must be UTF-8.
///
/// # Errors
/// Returns [`JamError::DecodeError`] if the payload is not valid base64 or the
/// decoded bytes are not UTF-8. Malformed lines are not errors; they are
/// dropped (see [`parse_melody_text`]).
///
/// # Example
/// ```
/// use base64::{engine::general_purpose::STANDARD, Engine};
/// use jam::melody::decode_melody;
///
/// let blob = STANDARD.encode("60 500 0 100\nxx 500 250 90\n67 250 250 80\n");
/// let melody = decode_melody(&blob).unwrap();
///
/// let pitches: Vec<u8> = melody.events.iter().map(|e| e.pitch).collect();
/// assert_eq!(pitches, vec![60, 67]);
/// ```
pub fn decode_melody(blob: &str) -> Result<DecodedMelody, JamError> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| JamError::DecodeError {
            chord: None,
            message: e.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|e| JamError::DecodeError {
        chord: None,
        message: format!("payload is not UTF-8: {}", e),
    })?;
    Ok(parse_melody_text(&text))
}

/// Parse already-decoded melody text
///
/// One event per line, fields separated by spaces. Lines whose pitch is not
/// a finite number in the MIDI range are dropped; the remaining events keep
/// their order and the start-time accumulator only advances over kept events.
///
/// Each event starts `wait_ms` after the previous event's start, so the
/// first event starts at its own wait.
pub fn parse_melody_text(text: &str) -> DecodedMelody {
    let mut events = Vec::new();
    let mut acc = 0.0;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let Some(mut event) = parse_line(line) else {
            tracing::debug!(line = line_no + 1, content = line, "dropping malformed melody line");
            continue;
        };
        acc += event.wait_ms;
        event.start_time_ms = acc;
        events.push(event);
    }

    DecodedMelody {
        events,
        total_wait_ms: acc,
    }
}

/// Parse one line into an event with a zero start time
fn parse_line(line: &str) -> Option<NoteEvent> {
    let mut fields = line.split(' ').filter(|f| !f.is_empty()).map(parse_number);

    let pitch = fields.next().flatten()?.round();
    if !(0.0..=127.0).contains(&pitch) {
        return None;
    }

    let duration_ms = non_negative(fields.next().flatten());
    let wait_ms = non_negative(fields.next().flatten());
    let velocity = match fields.next().flatten() {
        Some(v) => v.round().clamp(0.0, 127.0) as u8,
        None => DEFAULT_VELOCITY,
    };

    Some(NoteEvent {
        pitch: pitch as u8,
        duration_ms,
        wait_ms,
        velocity,
        start_time_ms: 0.0,
    })
}

/// Parse a field as a finite number
fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_negative(value: Option<f64>) -> f64 {
    value.map(|v| v.max(0.0)).unwrap_or(0.0)
}
