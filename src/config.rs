use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Reddit's browser-facing OAuth host
pub const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";

/// Reddit's OAuth-authenticated API host
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";

const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}: {reason}")]
    FileNotFound { path: String, reason: String },

    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::error::Error),
}

/// Configuration file format (for deserialization)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    client_id: String,
    client_secret: String,
    redirect_uri: String,

    /// Session cookie key (32-byte hex string)
    encryption_key: String,

    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    auth_base_url: Option<String>,

    #[serde(default)]
    api_base_url: Option<String>,

    #[serde(default = "default_secure_cookies")]
    secure_cookies: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_secure_cookies() -> bool {
    true
}

/// Configuration for the Remixitt web front-end
#[derive(Debug, Clone)]
pub struct Config {
    /// Reddit OAuth2 client ID
    pub client_id: String,

    /// Reddit OAuth2 client secret
    pub client_secret: String,

    /// OAuth2 redirect URI registered with the Reddit app
    pub redirect_uri: String,

    /// Key for the session cookie cipher (32 bytes)
    pub encryption_key: [u8; 32],

    /// HTTP listen port
    pub port: u16,

    /// Base URL for the authorize and access_token endpoints
    pub auth_base_url: String,

    /// Base URL for the feed endpoint
    pub api_base_url: String,

    /// Whether the session cookie carries the `Secure` attribute
    pub secure_cookies: bool,
}

impl Config {
    /// Load configuration from the environment (after `.env`), falling back to
    /// ~/.config/remixitt/config.json when REDDIT_CLIENT_ID is not set
    pub fn from_env_or_file() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        if env::var("REDDIT_CLIENT_ID").is_ok() {
            info!("Loading configuration from environment");
            Self::from_env()
        } else {
            info!("REDDIT_CLIENT_ID not set, loading configuration file");
            Self::from_file()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = required_var("REDDIT_CLIENT_ID")?;
        let client_secret = required_var("REDDIT_CLIENT_SECRET")?;
        let redirect_uri = required_var("REDDIT_AUTH_REDIRECT_URI")?;
        let encryption_key = Self::parse_encryption_key(&required_var("REMIXITT_COOKIE_KEY")?)?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "PORT",
                reason: format!("{}", e),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let secure_cookies = match env::var("REMIXITT_SECURE_COOKIES") {
            Ok(raw) => parse_bool("REMIXITT_SECURE_COOKIES", &raw)?,
            Err(_) => true,
        };

        Self::validated(
            client_id,
            client_secret,
            redirect_uri,
            encryption_key,
            port,
            env::var("REDDIT_AUTH_BASE_URL").ok(),
            env::var("REDDIT_API_BASE_URL").ok(),
            secure_cookies,
        )
    }

    /// Load configuration from file at ~/.config/remixitt/config.json
    pub fn from_file() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;

        let contents = fs::read_to_string(&config_path).map_err(|e| ConfigError::FileNotFound {
            path: config_path.display().to_string(),
            reason: format!(
                "{}. Either set REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, \
                 REDDIT_AUTH_REDIRECT_URI and REMIXITT_COOKIE_KEY, or create the file:\n\
                     mkdir -p ~/.config/remixitt\n\
                     $EDITOR ~/.config/remixitt/config.json",
                e
            ),
        })?;

        Self::from_json(&contents)
    }

    fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config_file: ConfigFile = serde_json::from_str(contents)?;
        let encryption_key = Self::parse_encryption_key(&config_file.encryption_key)?;

        Self::validated(
            config_file.client_id,
            config_file.client_secret,
            config_file.redirect_uri,
            encryption_key,
            config_file.port,
            config_file.auth_base_url,
            config_file.api_base_url,
            config_file.secure_cookies,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn validated(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        encryption_key: [u8; 32],
        port: u16,
        auth_base_url: Option<String>,
        api_base_url: Option<String>,
        secure_cookies: bool,
    ) -> Result<Self, ConfigError> {
        let _ = url::Url::parse(&redirect_uri)?;

        let auth_base_url = normalize_base(auth_base_url, DEFAULT_AUTH_BASE_URL)?;
        let api_base_url = normalize_base(api_base_url, DEFAULT_API_BASE_URL)?;

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            encryption_key,
            port,
            auth_base_url,
            api_base_url,
            secure_cookies,
        })
    }

    /// Get the configuration file path: ~/.config/remixitt/config.json
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .map(|home| home.join(".config/remixitt"))
            .ok_or_else(|| ConfigError::FileNotFound {
                path: "~/.config/remixitt/config.json".to_string(),
                reason: "Could not determine home directory".to_string(),
            })?;

        Ok(config_dir.join("config.json"))
    }

    /// Parse encryption key from hex string (must be 32 bytes)
    fn parse_encryption_key(hex_str: &str) -> Result<[u8; 32], ConfigError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| ConfigError::InvalidEncryptionKey(format!("Invalid hex: {}", e)))?;

        if bytes.len() != 32 {
            return Err(ConfigError::InvalidEncryptionKey(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(key)
    }
}

fn required_var(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Validate a base URL and strip any trailing slash so paths can be appended
fn normalize_base(value: Option<String>, default: &str) -> Result<String, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let _ = url::Url::parse(&raw)?;
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEY_HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn clear_env() {
        for key in [
            "REDDIT_CLIENT_ID",
            "REDDIT_CLIENT_SECRET",
            "REDDIT_AUTH_REDIRECT_URI",
            "REMIXITT_COOKIE_KEY",
            "PORT",
            "REDDIT_AUTH_BASE_URL",
            "REDDIT_API_BASE_URL",
            "REMIXITT_SECURE_COOKIES",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_parse_encryption_key_valid() {
        let result = Config::parse_encryption_key(KEY_HEX);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 32);
    }

    #[test]
    fn test_parse_encryption_key_invalid_length() {
        let result = Config::parse_encryption_key("0123456789abcdef");
        assert!(matches!(result, Err(ConfigError::InvalidEncryptionKey(_))));
    }

    #[test]
    fn test_parse_encryption_key_invalid_hex() {
        let result = Config::parse_encryption_key("not_valid_hex_string_here_xxxxxx");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let json = format!(
            r#"{{
                "client_id": "cid",
                "client_secret": "secret",
                "redirect_uri": "http://localhost:3000/auth/redirect",
                "encryption_key": "{}"
            }}"#,
            KEY_HEX
        );

        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.port, 3000);
        assert_eq!(config.auth_base_url, DEFAULT_AUTH_BASE_URL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.secure_cookies);
    }

    #[test]
    fn test_from_json_rejects_bad_redirect_uri() {
        let json = format!(
            r#"{{
                "client_id": "cid",
                "client_secret": "secret",
                "redirect_uri": "not a url",
                "encryption_key": "{}"
            }}"#,
            KEY_HEX
        );

        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("REDDIT_CLIENT_ID", "env_client");
        env::set_var("REDDIT_CLIENT_SECRET", "env_secret");
        env::set_var("REDDIT_AUTH_REDIRECT_URI", "https://remixitt.example/auth/redirect");
        env::set_var("REMIXITT_COOKIE_KEY", KEY_HEX);
        env::set_var("PORT", "8080");
        env::set_var("REDDIT_API_BASE_URL", "http://127.0.0.1:9999/");
        env::set_var("REMIXITT_SECURE_COOKIES", "false");

        let config = Config::from_env().unwrap();
        assert_eq!(config.client_id, "env_client");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
        assert!(!config.secure_cookies);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_secret() {
        clear_env();
        env::set_var("REDDIT_CLIENT_ID", "env_client");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::MissingVar("REDDIT_CLIENT_SECRET"))
        ));

        clear_env();
    }
}
