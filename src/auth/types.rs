use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token set persisted client-side in the session cookie.
///
/// A session is either absent or has all five fields; a payload missing any
/// of them fails to deserialize and is treated as no session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl Session {
    /// Whether this session carries a usable access token
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Refresh token, if one is usable
    pub fn refresh_token(&self) -> Option<&str> {
        if self.refresh_token.is_empty() {
            None
        } else {
            Some(&self.refresh_token)
        }
    }
}

/// Raw token endpoint response (both grants)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Reddit reports some grant failures as `{"error": ...}` with a 200 status
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: serde_json::Value,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TokenErrorResponse {
    pub(crate) fn into_auth_error(self) -> AuthError {
        let error = match self.error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        AuthError::OAuth2Error {
            error,
            description: self
                .error_description
                .or(self.message)
                .unwrap_or_else(|| "No description provided".to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to build authorization URL: {0}")]
    UrlBuildError(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Reddit OAuth error: {error} - {description}")]
    OAuth2Error { error: String, description: String },

    #[error("Token endpoint returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Missing required field in token response: {0}")]
    MissingField(&'static str),

    #[error("Invalid token response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}
