//! # Jam Session
//!
//! The explicit context that ties a generation to playback.
//!
//! ## Purpose
//! A session owns everything that changes while the user jams:
//! - The transport settings
//! - The current [`ChordMelody`] (replaced wholesale on every generation)
//! - The [`LeadNotePlayer`] and its held inputs
//! - The generation token counter and a user-facing status
//!
//! ## Generation Pipeline
//!
//! ```text
//! begin_generation() -> token ──► request (async, elsewhere) ──► complete_generation(token, result)
//!                                                                   │
//!                          stale token ◄──────────────────────────┤
//!                          error: status Failed, melody kept ◄────┤
//!                          ok: decode, replace melody, Ready ◄────┘
//! ```
//!
//! Only the response to the most recent request is applied. An older request
//! that resolves late is discarded, so two overlapping requests never race.
//!
//! ## Example
//! ```rust
//! use jam::{GenerationResponse, JamSession, Transport};
//! use jam::session::GenerationOutcome;
//!
//! let mut session = JamSession::new(Transport::default());
//! let first = session.begin_generation();
//! let second = session.begin_generation();
//!
//! let body = r#"{"chord_melodies": {"C": "NjAgNTAwIDAgMTAw"}}"#;
//! let response = GenerationResponse::from_json(body).unwrap();
//!
//! let outcome = session.complete_generation(first, Ok(response.clone())).unwrap();
//! assert_eq!(outcome, GenerationOutcome::Stale);
//!
//! let outcome = session.complete_generation(second, Ok(response)).unwrap();
//! assert_eq!(outcome, GenerationOutcome::Applied { chords: 1 });
//! ```

use serde::Serialize;

use crate::error::JamError;
use crate::generation::GenerationResponse;
use crate::melody::ChordMelody;
use crate::player::{InputEvent, LeadNotePlayer, PlayerState, SynthCommand};
use crate::schedule::{backing_schedule, melody_schedule, BackingChord, ScheduledNote};
use crate::transport::Transport;

/// Identifies one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GenerationToken(pub u64);

/// What happened to a completed generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GenerationOutcome {
    /// The melody was replaced
    Applied { chords: usize },
    /// A newer request was issued; this response was dropped
    Stale,
}

/// User-facing session status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum SessionStatus {
    /// Nothing generated yet, or stopped
    Idle,
    Generating,
    Ready,
    /// Last generation failed; the message is shown to the user
    Failed(String),
}

impl SessionStatus {
    /// Status line for display
    pub fn message(&self) -> String {
        match self {
            SessionStatus::Idle => "Pick a progression and style, then generate.".to_string(),
            SessionStatus::Generating => "Generating melody...".to_string(),
            SessionStatus::Ready => "Ready to jam.".to_string(),
            SessionStatus::Failed(message) => format!("An error occurred: {}", message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JamSession {
    transport: Transport,
    player: LeadNotePlayer,
    latest_token: u64,
    status: SessionStatus,
}

impl JamSession {
    pub fn new(transport: Transport) -> Self {
        JamSession {
            transport,
            player: LeadNotePlayer::new(transport),
            latest_token: 0,
            status: SessionStatus::Idle,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn melody(&self) -> &ChordMelody {
        self.player.melody()
    }

    pub fn player(&self) -> &LeadNotePlayer {
        &self.player
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    /// Label of the chord the lead currently plays from
    pub fn active_chord(&self) -> Option<&str> {
        self.player
            .active_chord()
            .and_then(|i| self.player.melody().track(i))
            .map(|t| t.label.as_str())
    }

    /// Issue a token for a new generation request
    ///
    /// Any request issued earlier becomes stale.
    pub fn begin_generation(&mut self) -> GenerationToken {
        self.latest_token += 1;
        self.status = SessionStatus::Generating;
        GenerationToken(self.latest_token)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        token.0 == self.latest_token
    }

    /// Apply the result of a generation request
    ///
    /// # Errors
    /// The request's own error, or a [`JamError::DecodeError`] if a chord
    /// payload cannot be decoded. Either way the status becomes `Failed`, the
    /// previous melody stays loaded and a sounding note stays releasable.
    pub fn complete_generation(
        &mut self,
        token: GenerationToken,
        result: Result<GenerationResponse, JamError>,
    ) -> Result<GenerationOutcome, JamError> {
        if !self.is_current(token) {
            tracing::info!(token = token.0, latest = self.latest_token, "discarding stale generation");
            return Ok(GenerationOutcome::Stale);
        }

        let melody = result.and_then(|response| ChordMelody::from_encoded(response.chord_melodies));
        match melody {
            Ok(melody) => {
                let chords = melody.len();
                tracing::info!(token = token.0, chords, "generation applied");
                self.player.load(melody);
                self.status = SessionStatus::Ready;
                Ok(GenerationOutcome::Applied { chords })
            }
            Err(e) => {
                tracing::error!(token = token.0, error = %e, "generation failed");
                self.status = SessionStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Follow the transport position
    ///
    /// Selects the chord of the measure under `tick` and returns its label
    /// when the active chord changed.
    pub fn on_tick(&mut self, tick: u64) -> Option<String> {
        let measure = self.transport.measure_at(tick, self.player.melody().len());
        if measure == self.player.active_chord() {
            return None;
        }
        self.player.set_active_chord(measure);
        self.active_chord().map(String::from)
    }

    pub fn handle_input(&mut self, event: InputEvent, tick: u64) -> Vec<SynthCommand> {
        self.player.handle(event, tick)
    }

    /// Stop the session
    ///
    /// Releases the lead note, clears held inputs and drops the melody.
    pub fn stop(&mut self, tick: u64) -> Vec<SynthCommand> {
        let commands = self.player.stop(tick);
        self.player.load(ChordMelody::default());
        self.status = SessionStatus::Idle;
        commands
    }

    pub fn backing_schedule(&self) -> Vec<BackingChord> {
        backing_schedule(self.player.melody(), &self.transport)
    }

    pub fn melody_schedule(&self) -> Vec<ScheduledNote> {
        melody_schedule(self.player.melody(), &self.transport)
    }

    /// Total loop length in ticks
    pub fn loop_ticks(&self) -> u64 {
        self.transport.loop_ticks(self.player.melody().len())
    }
}
