//! # Configuration
//!
//! YAML configuration for the jam client.
//!
//! ## Example Config
//!
//! ```yaml
//! server:
//!   base_url: http://127.0.0.1:8000
//!   mode: cached        # direct | cached
//!   variation: 2
//! transport:
//!   bpm: 96
//!   ppq: 192
//!   beatsPerMeasure: 4
//! styles:
//!   - JAZZ風
//!   - POP風
//! ```
//!
//! Every field is optional. Environment variables override the file:
//! - `JAM_SERVER_URL` - server base URL
//! - `JAM_SERVER_MODE` - `direct` or `cached`
//! - `JAM_BPM` - transport tempo

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JamError;
use crate::transport::Transport;

/// How generations are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// POST the request to `{base_url}/generate`
    #[default]
    Direct,
    /// GET a pre-generated file keyed by the progression hash
    Cached,
}

impl std::str::FromStr for TransportMode {
    type Err = JamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(TransportMode::Direct),
            "cached" => Ok(TransportMode::Cached),
            other => Err(JamError::ConfigError(format!(
                "unknown server mode '{}', expected 'direct' or 'cached'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub mode: TransportMode,
    /// Which pre-generated variation the cached mode requests
    pub variation: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            mode: TransportMode::Direct,
            variation: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JamConfig {
    pub server: ServerConfig,
    pub transport: Transport,
    pub styles: Vec<String>,
}

impl Default for JamConfig {
    fn default() -> Self {
        JamConfig {
            server: ServerConfig::default(),
            transport: Transport::default(),
            styles: vec!["JAZZ風".to_string(), "POP風".to_string()],
        }
    }
}

impl JamConfig {
    /// Parse YAML and validate
    pub fn from_yaml(source: &str) -> Result<Self, JamError> {
        let config: JamConfig = if source.trim().is_empty() {
            JamConfig::default()
        } else {
            serde_yaml::from_str(source).map_err(|e| JamError::ConfigError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, JamError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            JamError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let mut config = JamConfig::from_yaml(&source)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file
    pub fn from_env() -> Result<Self, JamError> {
        let mut config = JamConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), JamError> {
        if let Ok(url) = env::var("JAM_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Ok(mode) = env::var("JAM_SERVER_MODE") {
            self.server.mode = mode.parse()?;
        }
        if let Ok(bpm) = env::var("JAM_BPM") {
            self.transport.bpm = bpm
                .parse()
                .map_err(|_| JamError::ConfigError(format!("JAM_BPM is not a number: '{}'", bpm)))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), JamError> {
        let t = &self.transport;
        if !(t.bpm.is_finite() && t.bpm > 0.0) {
            return Err(JamError::ConfigError(format!("bpm must be positive, got {}", t.bpm)));
        }
        if t.ppq == 0 {
            return Err(JamError::ConfigError("ppq must be positive".to_string()));
        }
        if t.beats_per_measure == 0 {
            return Err(JamError::ConfigError("beatsPerMeasure must be positive".to_string()));
        }
        if self.server.base_url.trim().is_empty() {
            return Err(JamError::ConfigError("server.base_url is empty".to_string()));
        }
        Ok(())
    }
}
