//! # Error Types
//!
//! This module defines all error types for the jam library.
//!
//! Errors carry enough context (chord label, HTTP status) to be rendered as a
//! status message without crashing the running session.
//!
//! ## Error Types
//! - `DecodeError` - Malformed base64 or non UTF-8 melody payload
//! - `NetworkError` - Non-success HTTP status or transport failure
//! - `ResponseError` - Generation body is not the expected JSON shape
//! - `ChordError` - Chord name that cannot be parsed
//! - `ConfigError` - Unreadable or invalid configuration
//!
//! Triggering a lead note with no active chord is not an error: the player
//! simply returns no synth commands.
//!
//! ## Usage
//! ```rust
//! use jam::{decode_melody, JamError};
//!
//! match decode_melody("not base64!") {
//!     Ok(melody) => println!("{} notes", melody.events.len()),
//!     Err(JamError::DecodeError { message, .. }) => eprintln!("bad payload: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JamError {
    /// Melody payload could not be decoded.
    ///
    /// # Example
    /// ```
    /// # use jam::JamError;
    /// let err = JamError::DecodeError {
    ///     chord: Some("Dm7".to_string()),
    ///     message: "Invalid symbol 33, offset 3.".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Decode error for chord 'Dm7': Invalid symbol 33, offset 3.");
    /// ```
    #[error("{}", format_decode_error(.chord, .message))]
    DecodeError {
        chord: Option<String>,
        message: String,
    },

    /// Generation request failed in transport or with a non-success status.
    ///
    /// # Example
    /// ```
    /// # use jam::JamError;
    /// let err = JamError::NetworkError("HTTP error! status: 500".to_string());
    /// assert_eq!(err.to_string(), "Network error: HTTP error! status: 500");
    /// ```
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generation response body has the wrong shape.
    #[error("Invalid generation response: {0}")]
    ResponseError(String),

    /// Chord name with an unknown root or quality.
    #[error("Invalid chord '{chord}': {message}")]
    ChordError { chord: String, message: String },

    /// Configuration file or override is invalid.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

fn format_decode_error(chord: &Option<String>, message: &str) -> String {
    match chord {
        Some(label) => format!("Decode error for chord '{}': {}", label, message),
        None => format!("Decode error: {}", message),
    }
}

impl JamError {
    /// Label of the chord this error refers to, if any.
    pub fn chord(&self) -> Option<&str> {
        match self {
            JamError::DecodeError { chord, .. } => chord.as_deref(),
            JamError::ChordError { chord, .. } => Some(chord),
            _ => None,
        }
    }
}
