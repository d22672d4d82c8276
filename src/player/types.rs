//! Lead player type definitions

use serde::{Deserialize, Serialize};

use crate::transport::TickSegment;

/// MIDI controller number for "All Notes Off"
pub const ALL_NOTES_OFF_CC: u8 = 123;

/// Class of physical input that can hold the lead note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Computer keyboard (space, digit keys)
    Keyboard,
    /// On-screen button (click or touch)
    Button,
    /// MIDI input device
    Midi,
}

impl InputSource {
    pub(crate) const ALL: [InputSource; 3] =
        [InputSource::Keyboard, InputSource::Button, InputSource::Midi];

    pub(crate) fn index(self) -> usize {
        match self {
            InputSource::Keyboard => 0,
            InputSource::Button => 1,
            InputSource::Midi => 2,
        }
    }
}

/// Normalized input from any source
///
/// `key` identifies the physical input within its source: a key code for the
/// keyboard, the note number for MIDI, and `0` for the on-screen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    KeyDown { source: InputSource, key: u8 },
    KeyUp { source: InputSource, key: u8 },
    /// Velocity of the MIDI note-on that follows
    MidiVelocity { value: u8 },
    /// Pressure on the held key (channel or polyphonic)
    Aftertouch { value: u8 },
    /// MIDI controller 123
    AllNotesOff,
    /// The input device disappeared; its note-offs will never arrive
    DeviceLost,
}

impl InputEvent {
    /// Translate a raw MIDI message into input events
    ///
    /// - Note-on (`0x9n`) yields `MidiVelocity` then `KeyDown`; velocity 0 is
    ///   a note-off
    /// - Note-off (`0x8n`) yields `KeyUp`
    /// - Polyphonic (`0xAn`) and channel (`0xDn`) pressure yield `Aftertouch`
    /// - Control change 123 (`0xBn 0x7B`) yields `AllNotesOff`
    ///
    /// Anything else, including truncated messages, yields nothing.
    ///
    /// ```
    /// use jam::player::{InputEvent, InputSource};
    ///
    /// let events = InputEvent::from_midi(&[0x90, 60, 100]);
    /// assert_eq!(
    ///     events,
    ///     vec![
    ///         InputEvent::MidiVelocity { value: 100 },
    ///         InputEvent::KeyDown { source: InputSource::Midi, key: 60 },
    ///     ]
    /// );
    /// ```
    pub fn from_midi(message: &[u8]) -> Vec<InputEvent> {
        let Some(&status) = message.first() else {
            return Vec::new();
        };
        let data1 = message.get(1).map(|b| b & 0x7f);
        let data2 = message.get(2).map(|b| b & 0x7f);

        match (status & 0xf0, data1, data2) {
            (0x90, Some(key), Some(0)) | (0x80, Some(key), Some(_)) => vec![InputEvent::KeyUp {
                source: InputSource::Midi,
                key,
            }],
            (0x90, Some(key), Some(velocity)) => vec![
                InputEvent::MidiVelocity { value: velocity },
                InputEvent::KeyDown {
                    source: InputSource::Midi,
                    key,
                },
            ],
            (0xa0, Some(_), Some(pressure)) => vec![InputEvent::Aftertouch { value: pressure }],
            (0xd0, Some(pressure), _) => vec![InputEvent::Aftertouch { value: pressure }],
            (0xb0, Some(ALL_NOTES_OFF_CC), Some(_)) => vec![InputEvent::AllNotesOff],
            _ => Vec::new(),
        }
    }
}

/// Observable state of the lead voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Idle,
    Sounding,
}

/// Measured sounding interval of a released lead note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundedNote {
    pub pitch: u8,
    pub attack_tick: u64,
    pub duration_ticks: u64,
    /// Interval split at the loop boundary (one or two segments)
    pub segments: Vec<TickSegment>,
}

/// Command for the synthesis engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SynthCommand {
    #[serde(rename_all = "camelCase")]
    Attack { pitch: u8, velocity: u8, tick: u64 },
    #[serde(rename_all = "camelCase")]
    Release { pitch: u8, tick: u64, sounded: SoundedNote },
    /// Timbre modulation of the sounding note from aftertouch
    #[serde(rename_all = "camelCase")]
    Modulate { pitch: u8, pressure: u8 },
}
