use crate::auth::{AuthError, CookieError, RedditOAuthClient, SessionManager, OAUTH_STATE};
use crate::config::Config;
use crate::feed::{FeedOutcome, FeedService, FeedView};
use crate::pages;
use crate::reddit::RedditClient;
use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{
        header::{self, InvalidHeaderValue},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use cookie::Cookie;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    oauth: Arc<RedditOAuthClient>,
    feed: FeedService,
    sessions: SessionManager,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let oauth = Arc::new(
            RedditOAuthClient::new(config).context("Failed to create Reddit OAuth client")?,
        );
        let reddit =
            Arc::new(RedditClient::new(config).context("Failed to create Reddit API client")?);

        Ok(Self {
            feed: FeedService::new(Arc::clone(&oauth), reddit),
            oauth,
            sessions: SessionManager::from_config(config.encryption_key, config.secure_cookies),
        })
    }
}

/// Query parameters for the index page
#[derive(Debug, Deserialize)]
pub struct IndexParams {
    #[serde(default)]
    after: Option<String>,
}

/// Query parameters Reddit sends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Errors surfaced to the browser
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authorization code is required")]
    MissingCode,

    #[error("Reddit denied authorization: {0}")]
    ProviderDenied(String),

    #[error("State parameter mismatch")]
    InvalidState,

    #[error("Reddit authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to write session cookie: {0}")]
    Cookie(#[from] CookieError),

    #[error("Invalid Set-Cookie header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            AppError::MissingCode | AppError::ProviderDenied(_) | AppError::InvalidState => {
                (StatusCode::BAD_REQUEST, "Authorization Failed")
            }
            AppError::Auth(_) => (StatusCode::BAD_GATEWAY, "Reddit Error"),
            AppError::Cookie(_) | AppError::Header(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
            }
        };

        error!(status = %status, error = %self, "Request failed");

        (status, Html(pages::render_error(title, &self.to_string()))).into_response()
    }
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE)?.to_str().ok()
}

/// One `Set-Cookie` header per cookie
fn set_cookies(
    cookies: impl IntoIterator<Item = Cookie<'static>>,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(header::SET_COOKIE, HeaderValue::try_from(cookie.to_string())?);
    }
    Ok(headers)
}

fn redirect_with_cookies(location: &str, cookies: HeaderMap) -> Response {
    (
        StatusCode::FOUND,
        cookies,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// GET / - the feed, or the welcome page when logged out
async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cookies = cookie_header(&headers);
    let session = state.sessions.read_session(cookies);
    let attempt = state.sessions.reauth_attempts(cookies);
    let login_url = state.oauth.build_login_url()?;

    let outcome = match state
        .feed
        .load(session.as_ref(), params.after.as_deref(), attempt)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            // Refresh token is unusable
            let cleared = set_cookies([
                state.sessions.removal_cookie(),
                state.sessions.reauth_removal_cookie(),
            ])?;
            return Ok((cleared, AppError::Auth(e)).into_response());
        }
    };

    match outcome {
        FeedOutcome::Render(view) => {
            let html = Html(pages::render_index(&view, login_url.as_str(), Utc::now()));
            let cleared = if attempt > 0 {
                set_cookies([state.sessions.reauth_removal_cookie()])?
            } else {
                HeaderMap::new()
            };
            Ok((cleared, html).into_response())
        }
        FeedOutcome::Reauthenticate {
            session,
            location,
            attempts,
        } => {
            let cookies = set_cookies([
                state.sessions.session_cookie(&session)?,
                state.sessions.reauth_cookie(attempts),
            ])?;
            Ok(redirect_with_cookies(&location, cookies))
        }
        FeedOutcome::Expired => {
            let html =
                pages::render_index(&FeedView::logged_out(), login_url.as_str(), Utc::now());
            let cleared = set_cookies([
                state.sessions.removal_cookie(),
                state.sessions.reauth_removal_cookie(),
            ])?;
            Ok((cleared, Html(html)).into_response())
        }
    }
}

/// GET /auth/redirect - OAuth callback from Reddit
async fn auth_redirect(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    if let Some(error) = params.error {
        warn!(error = %error, "Reddit returned an authorization error");
        return Err(AppError::ProviderDenied(error));
    }

    if params.state.as_deref().is_some_and(|s| s != OAUTH_STATE) {
        warn!("State parameter mismatch on OAuth callback");
        return Err(AppError::InvalidState);
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingCode)?;

    let session = state.oauth.exchange_code(&code).await?;
    let cookies = set_cookies([state.sessions.session_cookie(&session)?])?;

    info!("OAuth session established");
    Ok(redirect_with_cookies("/", cookies))
}

/// GET /login - send the browser to Reddit's authorization page
async fn login(State(state): State<AppState>) -> Result<Response, AppError> {
    let url = state.oauth.build_login_url()?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response())
}

/// GET /logout - drop the session cookie
async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let cleared = set_cookies([
        state.sessions.removal_cookie(),
        state.sessions.reauth_removal_cookie(),
    ])?;
    Ok(redirect_with_cookies("/", cleared))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(pages::render_error(
            "Not Found",
            "There is nothing at this address.",
        )),
    )
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/auth/redirect", get(auth_redirect))
        .route("/login", get(login))
        .route("/logout", get(logout))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = create_app(AppState::from_config(config)?);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Remixitt listening on {}", addr);
    info!("OAuth redirect URI: {}", config.redirect_uri);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down HTTP server");
        })
        .await?;

    Ok(())
}
