//! Generation request and response wire types
//!
//! The backend answers with
//! `{ "chord_melodies": { "<label>": "<base64>", ... } }`. Key order is the
//! progression order, so the map is read into an ordered list instead of a
//! hash map.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::JamError;

/// Body of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub chord_progression: String,
    pub style: String,
}

impl GenerationRequest {
    pub fn new(chord_progression: impl Into<String>, style: impl Into<String>) -> Self {
        GenerationRequest {
            chord_progression: chord_progression.into(),
            style: style.into(),
        }
    }
}

/// Body of a generation response
///
/// Other keys (such as `raw_outputs`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationResponse {
    #[serde(deserialize_with = "ordered_pairs")]
    pub chord_melodies: Vec<(String, String)>,
}

impl GenerationResponse {
    /// Parse a response body
    ///
    /// ```
    /// use jam::GenerationResponse;
    ///
    /// let body = r#"{"chord_melodies": {"G": "NjcgNTAwIDAgMTAw", "C": "NjAgNTAwIDAgMTAw"}}"#;
    /// let response = GenerationResponse::from_json(body).unwrap();
    ///
    /// assert_eq!(response.chord_melodies[0].0, "G");
    /// assert_eq!(response.chord_melodies[1].0, "C");
    /// ```
    pub fn from_json(body: &str) -> Result<Self, JamError> {
        serde_json::from_str(body).map_err(|e| JamError::ResponseError(e.to_string()))
    }
}

fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedPairs;

    impl<'de> Visitor<'de> for OrderedPairs {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of chord labels to base64 strings")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((label, blob)) = map.next_entry::<String, String>()? {
                pairs.push((label, blob));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(OrderedPairs)
}
