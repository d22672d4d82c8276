//! HTTP client for the melody generation backend
//!
//! Two transports return the same response body:
//! - **Direct**: `POST {base_url}/generate` with a JSON [`GenerationRequest`]
//! - **Cached**: `GET {base_url}/{cache_key}/{style}/{variation}.json`, files
//!   pre-generated per progression and style
//!
//! There is no timeout and no retry. A failed request surfaces as an error
//! and the user triggers generation again.

use reqwest::{Client, Url};

use crate::config::{ServerConfig, TransportMode};
use crate::error::JamError;
use crate::generation::{GenerationRequest, GenerationResponse};
use crate::progression::Progression;

#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: Client,
    base_url: Url,
    mode: TransportMode,
    variation: u32,
}

impl GenerationClient {
    pub fn new(config: &ServerConfig) -> Result<Self, JamError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            JamError::ConfigError(format!("invalid server url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(JamError::ConfigError(format!(
                "server url '{}' cannot be used as a base",
                config.base_url
            )));
        }
        Ok(GenerationClient {
            http: Client::new(),
            base_url,
            mode: config.mode,
            variation: config.variation,
        })
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// URL the request will be sent to
    pub fn request_url(&self, request: &GenerationRequest) -> Result<Url, JamError> {
        match self.mode {
            TransportMode::Direct => Ok(self.url_with_segments(&["generate"])),
            TransportMode::Cached => {
                let key = Progression::parse(&request.chord_progression)?.cache_key();
                let file = format!("{}.json", self.variation);
                Ok(self.url_with_segments(&[key.as_str(), request.style.as_str(), file.as_str()]))
            }
        }
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request a melody for every chord of the progression
    ///
    /// # Errors
    /// [`JamError::NetworkError`] for transport failures and non-success
    /// statuses, [`JamError::ResponseError`] for an unexpected body.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, JamError> {
        let url = self.request_url(request)?;
        tracing::info!(%url, progression = %request.chord_progression, style = %request.style, "requesting generation");

        let pending = match self.mode {
            TransportMode::Direct => self.http.post(url).json(request),
            TransportMode::Cached => self.http.get(url),
        };
        let response = pending
            .send()
            .await
            .map_err(|e| JamError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JamError::NetworkError(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JamError::NetworkError(e.to_string()))?;
        GenerationResponse::from_json(&body)
    }
}
