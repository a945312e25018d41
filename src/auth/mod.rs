pub mod cookie_cipher;
pub mod oauth;
pub mod session;
pub mod types;

pub use cookie_cipher::{CookieCipher, CookieError, SessionSealer};
pub use oauth::{RedditOAuthClient, OAUTH_STATE, USER_AGENT};
pub use session::{
    SessionManager, REAUTH_COOKIE_NAME, REAUTH_WINDOW_SECS, SESSION_COOKIE_NAME,
};
pub use types::{AuthError, Session, TokenResponse};
