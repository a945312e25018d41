pub mod auth;
pub mod config;
pub mod feed;
pub mod http_server;
pub mod pages;
pub mod reddit;

pub use auth::{AuthError, RedditOAuthClient, Session, SessionManager};
pub use config::Config;
pub use feed::{FeedOutcome, FeedService, FeedView};
pub use http_server::{create_app, run_server, AppState};
pub use reddit::{Post, RedditClient, RedditError};
