//! # Player Module
//!
//! The interactive lead voice.
//!
//! ## Purpose
//! Several input sources can trigger the lead note at once: held computer
//! keys, the on-screen button and a MIDI keyboard. This module folds them into
//! one monophonic voice and tells the synthesis engine what to do.
//!
//! ## Sub-modules
//! - `types` - InputEvent, InputSource, SynthCommand, SoundedNote
//! - `lead` - The LeadNotePlayer state machine
//!
//! ## Input Coalescing
//! Every source class keeps the set of inputs currently down. The lead note
//! is released only when all sets are empty, so lifting one of two held keys
//! keeps the note sounding. Repeated key-downs for an input that is already
//! held (keyboard auto-repeat) are ignored.
//!
//! ## Overlapping Note-On
//! A new input while a note sounds retriggers: the current note is released
//! and the next note of the chord is attacked, in that order.
//!
//! ## MIDI Reliability
//! MIDI note-offs can be lost. "All Notes Off" (controller 123) and losing
//! the device both force the voice idle and clear every held input.

mod lead;
mod types;

#[cfg(test)]
mod tests;

pub use lead::LeadNotePlayer;
pub use types::{
    InputEvent, InputSource, PlayerState, SoundedNote, SynthCommand, ALL_NOTES_OFF_CC,
};
