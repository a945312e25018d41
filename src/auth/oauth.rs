use super::types::{AuthError, Session, TokenErrorResponse, TokenResponse};
use crate::config::Config;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

const AUTHORIZE_PATH: &str = "/api/v1/authorize";
const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";

/// Reddit requires a descriptive User-Agent on every API call
pub const USER_AGENT: &str = "Remixitt/0.1";

/// Static anti-forgery value sent as `state` and checked on callback
pub const OAUTH_STATE: &str = "remixitt";

const OAUTH_SCOPE: &str = "read";

/// OAuth2 client for Reddit's authorization-code and refresh-token grants
#[derive(Clone)]
pub struct RedditOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base_url: String,
    http_client: Client,
}

impl RedditOAuthClient {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_base_url: config.auth_base_url.clone(),
            http_client,
        })
    }

    /// Build the Reddit authorization URL the browser is sent to
    ///
    /// Carries exactly `client_id`, `response_type`, `state`, `redirect_uri`,
    /// `duration` and `scope`.
    pub fn build_login_url(&self) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}{}", self.auth_base_url, AUTHORIZE_PATH))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", OAUTH_STATE)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("duration", "permanent")
            .append_pair("scope", OAUTH_SCOPE);

        Ok(url)
    }

    /// Exchange an authorization code for a session
    pub async fn exchange_code(&self, code: &str) -> Result<Session, AuthError> {
        #[derive(Serialize)]
        struct CodeGrant<'a> {
            grant_type: &'a str,
            code: &'a str,
            redirect_uri: &'a str,
        }

        info!(code_length = code.len(), "Exchanging authorization code");

        let token = self
            .request_token(&CodeGrant {
                grant_type: "authorization_code",
                code,
                redirect_uri: &self.redirect_uri,
            })
            .await?;

        let refresh_token = token
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingField("refresh_token"))?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token,
            scope: token.scope,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    /// Mint a new session from a refresh token
    ///
    /// Reddit omits `refresh_token` from refresh responses; the one used for
    /// the request is carried into the new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        #[derive(Serialize)]
        struct RefreshGrant<'a> {
            grant_type: &'a str,
            refresh_token: &'a str,
        }

        info!("Refreshing access token");

        let token = self
            .request_token(&RefreshGrant {
                grant_type: "refresh_token",
                refresh_token,
            })
            .await?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| refresh_token.to_string()),
            scope: token.scope,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    async fn request_token<F: Serialize>(&self, form: &F) -> Result<TokenResponse, AuthError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.auth_base_url, ACCESS_TOKEN_PATH))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if let Ok(error_response) = serde_json::from_str::<TokenErrorResponse>(&body) {
            let err = error_response.into_auth_error();
            warn!(status = %status, error = %err, "Token endpoint rejected grant");
            return Err(err);
        }

        if !status.is_success() {
            warn!(status = %status, "Token endpoint returned non-success status");
            return Err(AuthError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "Token endpoint returned token set"
        );

        Ok(token)
    }
}
