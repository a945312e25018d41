use super::cookie_cipher::{CookieCipher, CookieError, SessionSealer};
use super::types::Session;
use cookie::{Cookie, SameSite};
use std::sync::Arc;
use tracing::debug;

/// Name of the cookie holding the sealed session
pub const SESSION_COOKIE_NAME: &str = "reddit_auth";

/// Name of the cookie counting refreshes made in the current reauth window
pub const REAUTH_COOKIE_NAME: &str = "remixitt_reauth";

/// Lifetime of the reauth counter cookie
pub const REAUTH_WINDOW_SECS: i64 = 60;

/// Reads and writes the session cookie.
///
/// The cookie is the whole session store; nothing is kept server-side.
#[derive(Clone)]
pub struct SessionManager {
    sealer: Arc<dyn SessionSealer>,
    secure: bool,
}

impl SessionManager {
    /// Session manager backed by the AES-GCM cookie cipher
    pub fn from_config(encryption_key: [u8; 32], secure: bool) -> Self {
        Self::with_sealer(Arc::new(CookieCipher::new(&encryption_key)), secure)
    }

    pub fn with_sealer(sealer: Arc<dyn SessionSealer>, secure: bool) -> Self {
        Self { sealer, secure }
    }

    /// Parse the session out of a `Cookie` request header.
    ///
    /// Absent, undecryptable and malformed cookies all yield `None`.
    pub fn read_session(&self, cookie_header: Option<&str>) -> Option<Session> {
        let sealed = find_cookie(cookie_header?, SESSION_COOKIE_NAME)?;

        let plaintext = match self.sealer.open(&sealed) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable session cookie");
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&plaintext) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed session payload");
                None
            }
        }
    }

    /// True iff the cookie holds a session with a non-empty access token
    pub fn is_authenticated(&self, cookie_header: Option<&str>) -> bool {
        self.read_session(cookie_header)
            .is_some_and(|session| session.has_access_token())
    }

    /// Sealed session cookie for a `Set-Cookie` header
    pub fn session_cookie(&self, session: &Session) -> Result<Cookie<'static>, CookieError> {
        let payload = serde_json::to_vec(session)
            .map_err(|e| CookieError::EncryptionError(format!("serialize session: {}", e)))?;
        let sealed = self.sealer.seal(&payload)?;

        Ok(Cookie::build((SESSION_COOKIE_NAME, sealed))
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .build())
    }

    /// Expired session cookie (logout)
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }

    /// Refreshes made in the current reauth window; 0 when the counter
    /// cookie is absent or unreadable
    pub fn reauth_attempts(&self, cookie_header: Option<&str>) -> u8 {
        cookie_header
            .and_then(|header| find_cookie(header, REAUTH_COOKIE_NAME))
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    /// Short-lived counter cookie set alongside a refreshed session
    pub fn reauth_cookie(&self, attempts: u8) -> Cookie<'static> {
        Cookie::build((REAUTH_COOKIE_NAME, attempts.to_string()))
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(REAUTH_WINDOW_SECS))
            .build()
    }

    pub fn reauth_removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((REAUTH_COOKIE_NAME, ""))
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }
}

/// Find a cookie value by name in a `Cookie` request header
fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
