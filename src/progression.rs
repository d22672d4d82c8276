//! # Chord Progressions
//!
//! A progression descriptor is the string the user picks, such as
//! `"C - G - Am - F"`: chord names separated by `-`, one chord per measure.
//!
//! This module:
//! - Splits descriptors into chord names
//! - Produces the response labels the backend uses (`C`, `C_2`, ...)
//! - Transposes progressions into another key
//! - Computes the content hash that keys the static generation cache
//!
//! ## Example
//! ```rust
//! use jam::Progression;
//!
//! let prog = Progression::parse("C - G - C - F").unwrap();
//! assert_eq!(prog.labels(), vec!["C", "G", "C_2", "F"]);
//!
//! let up = prog.transpose(2, false);
//! assert_eq!(up.descriptor(), "D - A - D - G");
//! ```

use serde::Serialize;
use md5::{Digest, Md5};

use crate::chord::{parse_root, pitch_class_name};
use crate::error::JamError;

/// Ordered chord names of a progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progression {
    chords: Vec<String>,
}

impl Progression {
    /// Parse a `-`-separated descriptor
    ///
    /// # Errors
    /// [`JamError::ChordError`] when the descriptor has no chords.
    pub fn parse(descriptor: &str) -> Result<Self, JamError> {
        let chords: Vec<String> = descriptor
            .split('-')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();

        if chords.is_empty() {
            return Err(JamError::ChordError {
                chord: descriptor.to_string(),
                message: "progression has no chords".to_string(),
            });
        }
        Ok(Progression { chords })
    }

    pub fn chords(&self) -> &[String] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Canonical descriptor text, chords joined by `" - "`
    pub fn descriptor(&self) -> String {
        self.chords.join(" - ")
    }

    /// Labels as the backend keys them
    ///
    /// The first occurrence of a chord keeps its name; later repeats get
    /// `_2`, `_3`, ... in order of appearance.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.chords.len());
        for chord in &self.chords {
            let mut label = chord.clone();
            let mut count = 2;
            while labels.contains(&label) {
                label = format!("{}_{}", chord, count);
                count += 1;
            }
            labels.push(label);
        }
        labels
    }

    /// Transpose every chord root by `semitones`
    ///
    /// The quality text after the root is kept as written. Chords without a
    /// recognizable root are left untouched.
    pub fn transpose(&self, semitones: i32, prefer_flats: bool) -> Progression {
        let chords = self
            .chords
            .iter()
            .map(|chord| transpose_chord(chord, semitones, prefer_flats))
            .collect();
        Progression { chords }
    }

    /// Static-cache key, the hash of [`Progression::descriptor`]
    ///
    /// Spacing variants of the same progression share a key.
    pub fn cache_key(&self) -> String {
        cache_key(&self.descriptor())
    }
}

/// Lowercase hex MD5 of a descriptor string
///
/// Matches the directory names of the pre-generated cache.
pub fn cache_key(descriptor: &str) -> String {
    hex::encode(Md5::digest(descriptor.as_bytes()))
}

fn transpose_chord(chord: &str, semitones: i32, prefer_flats: bool) -> String {
    match parse_root(chord) {
        Some((root, consumed)) => {
            let shifted = (root as i32 + semitones).rem_euclid(12) as u8;
            format!("{}{}", pitch_class_name(shifted, prefer_flats), &chord[consumed..])
        }
        None => chord.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progression() {
        let prog = Progression::parse("C - G - Am - F").unwrap();
        assert_eq!(prog.chords(), &["C", "G", "Am", "F"]);
        assert_eq!(prog.len(), 4);
    }

    #[test]
    fn test_parse_tolerates_spacing() {
        let prog = Progression::parse("Dm7-G7 -  CM7 -").unwrap();
        assert_eq!(prog.chords(), &["Dm7", "G7", "CM7"]);
        assert_eq!(prog.descriptor(), "Dm7 - G7 - CM7");
    }

    #[test]
    fn test_empty_progression_is_error() {
        assert!(Progression::parse("").is_err());
        assert!(Progression::parse(" - - ").is_err());
    }

    #[test]
    fn test_labels_suffix_repeats() {
        let prog = Progression::parse("Am - F - Am - F - Am").unwrap();
        assert_eq!(prog.labels(), vec!["Am", "F", "Am_2", "F_2", "Am_3"]);
    }

    #[test]
    fn test_transpose() {
        let prog = Progression::parse("Dm7 - G7 - CM7 - A7b9").unwrap();

        let down = prog.transpose(-2, true);
        assert_eq!(down.chords(), &["Cm7", "F7", "BbM7", "G7b9"]);

        let up = prog.transpose(1, false);
        assert_eq!(up.chords(), &["D#m7", "G#7", "C#M7", "A#7b9"]);

        assert_eq!(prog.transpose(12, false), prog);
    }

    #[test]
    fn test_transpose_flat_root() {
        let prog = Progression::parse("Bb - Eb").unwrap();
        assert_eq!(prog.transpose(2, false).chords(), &["C", "F"]);
    }

    #[test]
    fn test_cache_key() {
        let key = cache_key("C - G - Am - F");
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        // Spacing variants share a key
        let a = Progression::parse("C-G-Am-F").unwrap();
        let b = Progression::parse("C - G - Am - F").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), key);
    }

    #[test]
    fn test_cache_key_known_digest() {
        // md5("abc")
        assert_eq!(cache_key("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(cache_key("C - G - Am - F"), "9cc9974f797dd6924977e3e2ad4df8b2");
    }
}
