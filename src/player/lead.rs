//! Lead note state machine
//!
//! Arbitrates keyboard, button and MIDI input into one monophonic lead voice
//! that walks through the active chord's note sequence.

use std::collections::BTreeSet;

use super::types::{InputEvent, InputSource, PlayerState, SoundedNote, SynthCommand};
use crate::melody::ChordMelody;
use crate::transport::{split_at_loop, sounding_ticks, Transport};

/// The note currently held by the lead voice
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sounding {
    pitch: u8,
    attack_tick: u64,
    /// Loop length of the melody the note was attacked from
    loop_ticks: u64,
}

/// Monophonic lead-note player
///
/// # States
/// - **Idle**: no lead note sounding
/// - **Sounding**: exactly one lead note active
///
/// # Transitions
/// - `KeyDown` with an active, non-empty chord: release the current note if
///   any (retrigger), attack the note at the cursor, advance the cursor
/// - `KeyUp`: release only once no input of any source is held
/// - `AllNotesOff` / `DeviceLost`: forced release, held inputs cleared
/// - `Aftertouch`: modulate the sounding note
///
/// # Example
/// ```
/// use base64::{engine::general_purpose::STANDARD, Engine};
/// use jam::melody::ChordMelody;
/// use jam::player::{InputEvent, InputSource, LeadNotePlayer, PlayerState, SynthCommand};
/// use jam::Transport;
///
/// let melody = ChordMelody::from_encoded(vec![("C", STANDARD.encode("60 500 0 100\n64 500 250 90\n"))]).unwrap();
/// let mut player = LeadNotePlayer::new(Transport::default());
/// player.load(melody);
/// player.set_active_chord(Some(0));
///
/// let commands = player.handle(InputEvent::KeyDown { source: InputSource::Keyboard, key: 32 }, 0);
/// assert_eq!(commands, vec![SynthCommand::Attack { pitch: 60, velocity: 100, tick: 0 }]);
/// assert_eq!(player.state(), PlayerState::Sounding);
/// ```
#[derive(Debug, Clone)]
pub struct LeadNotePlayer {
    transport: Transport,
    melody: ChordMelody,
    active_chord: Option<usize>,
    cursor: usize,
    sounding: Option<Sounding>,
    held: [BTreeSet<u8>; 3],
    midi_velocity: Option<u8>,
}

impl LeadNotePlayer {
    pub fn new(transport: Transport) -> Self {
        LeadNotePlayer {
            transport,
            melody: ChordMelody::default(),
            active_chord: None,
            cursor: 0,
            sounding: None,
            held: Default::default(),
            midi_velocity: None,
        }
    }

    /// Replace the melody wholesale
    ///
    /// The active chord is cleared. A sounding note stays sounding so its
    /// release still arrives, measured against the loop it was attacked in.
    pub fn load(&mut self, melody: ChordMelody) {
        self.melody = melody;
        self.active_chord = None;
        self.cursor = 0;
    }

    pub fn melody(&self) -> &ChordMelody {
        &self.melody
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Select the chord whose notes the next triggers play
    ///
    /// The cursor restarts at 0 whenever the chord changes.
    pub fn set_active_chord(&mut self, index: Option<usize>) {
        if self.active_chord != index {
            self.active_chord = index;
            self.cursor = 0;
        }
    }

    pub fn active_chord(&self) -> Option<usize> {
        self.active_chord
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> PlayerState {
        if self.sounding.is_some() {
            PlayerState::Sounding
        } else {
            PlayerState::Idle
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding.is_some()
    }

    /// Pitch of the sounding lead note
    pub fn sounding_pitch(&self) -> Option<u8> {
        self.sounding.map(|s| s.pitch)
    }

    /// Number of inputs currently held for one source
    pub fn held_count(&self, source: InputSource) -> usize {
        self.held[source.index()].len()
    }

    fn any_held(&self) -> bool {
        InputSource::ALL.iter().any(|s| self.held_count(*s) > 0)
    }

    /// Apply one input event at transport position `tick`
    pub fn handle(&mut self, event: InputEvent, tick: u64) -> Vec<SynthCommand> {
        match event {
            InputEvent::KeyDown { source, key } => {
                if !self.held[source.index()].insert(key) {
                    // Auto-repeat of a key that is already down
                    return Vec::new();
                }
                self.trigger(source, tick)
            }
            InputEvent::KeyUp { source, key } => {
                if !self.held[source.index()].remove(&key) || self.any_held() {
                    return Vec::new();
                }
                self.release(tick).into_iter().collect()
            }
            InputEvent::MidiVelocity { value } => {
                self.midi_velocity = Some(value.min(127));
                Vec::new()
            }
            InputEvent::Aftertouch { value } => match self.sounding {
                Some(s) => vec![SynthCommand::Modulate {
                    pitch: s.pitch,
                    pressure: value.min(127),
                }],
                None => Vec::new(),
            },
            InputEvent::AllNotesOff | InputEvent::DeviceLost => {
                tracing::debug!(?event, "forcing lead note off");
                self.force_idle(tick)
            }
        }
    }

    /// Transport or session stop: release and forget every held input
    pub fn stop(&mut self, tick: u64) -> Vec<SynthCommand> {
        self.midi_velocity = None;
        self.force_idle(tick)
    }

    fn force_idle(&mut self, tick: u64) -> Vec<SynthCommand> {
        for held in &mut self.held {
            held.clear();
        }
        self.release(tick).into_iter().collect()
    }

    fn trigger(&mut self, source: InputSource, tick: u64) -> Vec<SynthCommand> {
        let Some(track) = self.active_chord.and_then(|i| self.melody.track(i)) else {
            return Vec::new();
        };
        if track.is_empty() {
            return Vec::new();
        }

        let index = self.cursor % track.events.len();
        let note = track.events[index];
        let velocity = match (source, self.midi_velocity) {
            (InputSource::Midi, Some(v)) => v,
            _ => note.velocity,
        };
        self.cursor = (index + 1) % track.events.len();

        let mut commands: Vec<SynthCommand> = self.release(tick).into_iter().collect();
        self.sounding = Some(Sounding {
            pitch: note.pitch,
            attack_tick: tick,
            loop_ticks: self.transport.loop_ticks(self.melody.len()),
        });
        commands.push(SynthCommand::Attack {
            pitch: note.pitch,
            velocity,
            tick,
        });
        commands
    }

    fn release(&mut self, tick: u64) -> Option<SynthCommand> {
        let sounding = self.sounding.take()?;
        let loop_ticks = sounding.loop_ticks;
        let duration_ticks = sounding_ticks(sounding.attack_tick, tick, loop_ticks);

        Some(SynthCommand::Release {
            pitch: sounding.pitch,
            tick,
            sounded: SoundedNote {
                pitch: sounding.pitch,
                attack_tick: sounding.attack_tick,
                duration_ticks,
                segments: split_at_loop(sounding.attack_tick, duration_ticks, loop_ticks),
            },
        })
    }
}
