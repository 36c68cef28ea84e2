//! Short-lived session token fetch.
//!
//! The transcription service authenticates streaming sessions with temporary
//! tokens minted by a small companion endpoint, so the long-lived API key
//! never reaches this process.

use crate::error::{Result, SlatewireError};
use serde::Deserialize;

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Error body some token endpoints return alongside a 200.
#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
}

/// Client for the token endpoint.
pub struct TokenClient {
    http: reqwest::Client,
    url: String,
}

impl TokenClient {
    /// Creates a client for the given token URL.
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Fetch a fresh session token.
    ///
    /// Any failure here is fatal to session setup; the caller unwinds.
    pub async fn fetch(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SlatewireError::TokenFetch {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SlatewireError::TokenFetch {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            // Error bodies carry a message worth surfacing
            let detail = serde_json::from_str::<TokenError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(SlatewireError::TokenFetch {
                message: format!("HTTP {}: {}", status.as_u16(), detail),
            });
        }

        Self::parse_body(&body)
    }

    /// Parse a token endpoint body, tolerating an embedded error field.
    fn parse_body(body: &str) -> Result<String> {
        if let Ok(err) = serde_json::from_str::<TokenError>(body) {
            return Err(SlatewireError::TokenFetch { message: err.error });
        }
        let parsed: TokenResponse =
            serde_json::from_str(body).map_err(|e| SlatewireError::TokenFetch {
                message: format!("unexpected token response: {}", e),
            })?;
        if parsed.token.is_empty() {
            return Err(SlatewireError::TokenFetch {
                message: "empty token".to_string(),
            });
        }
        Ok(parsed.token)
    }
}
