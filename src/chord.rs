//! Chord name parsing for backing voicings and scale lookup
//!
//! Parses chord names (C, Am, G7, Dm7b5, etc.) into a root pitch class, chord
//! tones and the pentatonic scales the melody generator draws from.

use serde::Serialize;

use crate::error::JamError;

/// MIDI note of C3, the bottom of the backing voicing octave
pub const VOICING_BASE: u8 = 48;

/// A named scale, as intervals from the chord root
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub name: &'static str,
    pub intervals: &'static [u8],
}

struct Quality {
    symbol: &'static str,
    tones: &'static [u8],
    scales: &'static [Scale],
}

const MAJOR_PENTATONIC: Scale = Scale { name: "major_pentatonic", intervals: &[0, 2, 4, 7, 9] };
const MINOR_PENTATONIC: Scale = Scale { name: "minor_pentatonic", intervals: &[0, 3, 5, 7, 10] };
const DORIAN_PENTATONIC: Scale = Scale { name: "dorian_pentatonic", intervals: &[0, 2, 5, 7, 10] };
const MIXOLYDIAN_PENTATONIC: Scale = Scale { name: "mixolydian_pentatonic", intervals: &[0, 2, 5, 7, 10] };
const LOCRIAN_PENTATONIC: Scale = Scale { name: "locrian_pentatonic", intervals: &[0, 3, 5, 6, 10] };

const QUALITIES: &[Quality] = &[
    // Major
    Quality { symbol: "", tones: &[0, 4, 7], scales: &[MAJOR_PENTATONIC] },
    Quality {
        symbol: "M7",
        tones: &[0, 4, 7, 11],
        scales: &[
            Scale { name: "lydian_pentatonic", intervals: &[0, 2, 4, 7, 11] },
            Scale { name: "major_pentatonic_from_3rd", intervals: &[2, 4, 7, 9, 11] },
        ],
    },
    Quality { symbol: "6", tones: &[0, 4, 7, 9], scales: &[MAJOR_PENTATONIC] },
    // Minor
    Quality { symbol: "m", tones: &[0, 3, 7], scales: &[MINOR_PENTATONIC] },
    Quality { symbol: "m7", tones: &[0, 3, 7, 10], scales: &[MINOR_PENTATONIC, DORIAN_PENTATONIC] },
    Quality { symbol: "m6", tones: &[0, 3, 7, 9], scales: &[DORIAN_PENTATONIC] },
    Quality {
        symbol: "mM7",
        tones: &[0, 3, 7, 11],
        scales: &[Scale { name: "melodic_minor_pentatonic", intervals: &[0, 2, 3, 7, 11] }],
    },
    // Dominant
    Quality {
        symbol: "7",
        tones: &[0, 4, 7, 10],
        scales: &[
            MIXOLYDIAN_PENTATONIC,
            Scale { name: "altered_pentatonic_from_b7", intervals: &[0, 2, 4, 7, 10] },
        ],
    },
    Quality { symbol: "7sus4", tones: &[0, 5, 7, 10], scales: &[MIXOLYDIAN_PENTATONIC] },
    Quality {
        symbol: "7b9",
        tones: &[0, 4, 7, 10],
        scales: &[
            Scale { name: "harmonic_minor_subset", intervals: &[0, 1, 4, 7, 8] },
            Scale { name: "altered_pentatonic", intervals: &[1, 3, 4, 6, 10] },
        ],
    },
    // Diminished
    Quality { symbol: "dim", tones: &[0, 3, 6], scales: &[LOCRIAN_PENTATONIC] },
    Quality {
        symbol: "dim7",
        tones: &[0, 3, 6, 9],
        scales: &[Scale { name: "diminished_scale_subset", intervals: &[0, 2, 3, 6, 9] }],
    },
    Quality {
        symbol: "m7b5",
        tones: &[0, 3, 6, 10],
        scales: &[
            LOCRIAN_PENTATONIC,
            Scale { name: "minor_pentatonic_from_4th", intervals: &[1, 3, 6, 8, 10] },
        ],
    },
    // Augmented
    Quality {
        symbol: "aug",
        tones: &[0, 4, 8],
        scales: &[Scale { name: "whole_tone_subset", intervals: &[0, 2, 4, 6, 8] }],
    },
];

/// Parsed chord name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordInfo {
    /// Root pitch class, C = 0
    pub root: u8,
    /// Canonical quality symbol (`""` for a major triad)
    pub quality: &'static str,
    /// Chord tones as intervals from the root
    pub tones: &'static [u8],
    pub scales: &'static [Scale],
}

impl ChordInfo {
    /// Backing voicing in the C3 octave
    ///
    /// # Examples
    /// ```
    /// use jam::chord::parse_chord_name;
    ///
    /// // C major: C3, E3, G3
    /// assert_eq!(parse_chord_name("C").unwrap().voicing(), vec![48, 52, 55]);
    ///
    /// // G7: G3, B3, D4, F4
    /// assert_eq!(parse_chord_name("G7").unwrap().voicing(), vec![55, 59, 62, 65]);
    /// ```
    pub fn voicing(&self) -> Vec<u8> {
        let root = VOICING_BASE + self.root;
        self.tones.iter().map(|interval| root + interval).collect()
    }

    /// Sorted union of the pitch classes of every available scale
    pub fn scale_pitch_classes(&self) -> Vec<u8> {
        let mut classes: Vec<u8> = self
            .scales
            .iter()
            .flat_map(|scale| scale.intervals.iter())
            .map(|interval| (self.root + interval) % 12)
            .collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

/// Parse a root name prefix, returning (pitch class, bytes consumed)
///
/// Accepts an upper- or lower-case letter followed by an optional `#` or `b`.
pub(crate) fn parse_root(name: &str) -> Option<(u8, usize)> {
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base: i8 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let (accidental, len) = match chars.next() {
        Some('#') => (1, 2),
        Some('b') => (-1, 2),
        _ => (0, 1),
    };
    Some(((base + accidental).rem_euclid(12) as u8, len))
}

/// Spell a pitch class as a root name
pub(crate) fn pitch_class_name(pitch_class: u8, prefer_flats: bool) -> &'static str {
    const SHARPS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    const FLATS: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];
    let idx = (pitch_class % 12) as usize;
    if prefer_flats {
        FLATS[idx]
    } else {
        SHARPS[idx]
    }
}

/// Map alias spellings onto the canonical quality symbols
fn canonical_quality(quality: &str) -> &str {
    match quality {
        "maj7" | "Maj7" | "MAJ7" => "M7",
        "maj" | "M" => "",
        "min" | "minor" | "MIN" | "Min" => "m",
        "min7" => "m7",
        "+" => "aug",
        "°" => "dim",
        other => other,
    }
}

/// Remove the duplicate-chord suffix the backend adds to repeated labels
///
/// ```
/// use jam::chord::strip_label_suffix;
///
/// assert_eq!(strip_label_suffix("Dm7_2"), "Dm7");
/// assert_eq!(strip_label_suffix("G7"), "G7");
/// ```
pub fn strip_label_suffix(label: &str) -> &str {
    match label.rsplit_once('_') {
        Some((chord, n)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => chord,
        _ => label,
    }
}

/// Parse a chord name
///
/// Spaces are ignored and the root letter may be lower-case. Response labels
/// with a duplicate suffix should go through [`strip_label_suffix`] first.
///
/// # Errors
/// [`JamError::ChordError`] for an empty name, unknown root or unknown quality.
///
/// # Examples
/// ```
/// use jam::chord::parse_chord_name;
///
/// let info = parse_chord_name("G#m7b5").unwrap();
/// assert_eq!(info.root, 8);
/// assert_eq!(info.tones, &[0, 3, 6, 10]);
/// assert_eq!(info.scales.len(), 2);
///
/// assert!(parse_chord_name("Hmaj7").is_err());
/// ```
pub fn parse_chord_name(name: &str) -> Result<ChordInfo, JamError> {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    let chord_error = |message: String| JamError::ChordError {
        chord: name.to_string(),
        message,
    };

    if compact.is_empty() {
        return Err(chord_error("chord name is empty".to_string()));
    }

    let (root, consumed) = parse_root(&compact)
        .ok_or_else(|| chord_error("invalid root note".to_string()))?;
    let quality = canonical_quality(&compact[consumed..]);

    let definition = QUALITIES
        .iter()
        .find(|q| q.symbol == quality)
        .ok_or_else(|| chord_error(format!("unknown chord type '{}'", quality)))?;

    Ok(ChordInfo {
        root,
        quality: definition.symbol,
        tones: definition.tones,
        scales: definition.scales,
    })
}
