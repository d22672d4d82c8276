pub mod chord;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod melody;
pub mod player;
pub mod progression;
pub mod schedule;
pub mod session;
pub mod transport;

pub use chord::{parse_chord_name, ChordInfo};
#[cfg(feature = "client")]
pub use client::GenerationClient;
pub use config::{JamConfig, TransportMode};
pub use error::*;
pub use generation::{GenerationRequest, GenerationResponse};
pub use melody::{decode_melody, ChordMelody, NoteEvent};
pub use player::{InputEvent, InputSource, LeadNotePlayer, PlayerState, SynthCommand};
pub use progression::Progression;
pub use session::{GenerationOutcome, GenerationToken, JamSession, SessionStatus};
pub use transport::Transport;

/// Decode a full generation response body into a chord melody.
/// This is the main entry point for callers holding raw JSON.
pub fn decode_response(body: &str) -> Result<ChordMelody, JamError> {
    let response = GenerationResponse::from_json(body)?;
    ChordMelody::from_encoded(response.chord_melodies)
}
