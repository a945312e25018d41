//! Page loader for the feed: fetch with the session's access token, and on
//! failure either refresh-and-redirect or fall back to the logged-out view.

use crate::auth::{AuthError, RedditOAuthClient, Session};
use crate::reddit::{Post, RedditClient};
use std::sync::Arc;
use tracing::{info, warn};
use url::form_urlencoded;

/// Refreshes allowed within one reauth window before giving up on the session
pub const MAX_REAUTH_ATTEMPTS: u8 = 1;

/// What the index page should show
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub logged_in: bool,
    pub posts: Vec<Post>,
    /// Cursor for the next page; `None` once the feed is exhausted
    pub next_cursor: Option<String>,
}

impl FeedView {
    pub fn logged_out() -> Self {
        Self {
            logged_in: false,
            posts: Vec::new(),
            next_cursor: None,
        }
    }

    fn page(posts: Vec<Post>) -> Self {
        let next_cursor = posts.last().map(|p| p.id.clone());
        Self {
            logged_in: true,
            posts,
            next_cursor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// Render this view
    Render(FeedView),
    /// Store the refreshed session and `attempts` in the reauth counter,
    /// then redirect the browser to `location`
    Reauthenticate {
        session: Session,
        location: String,
        attempts: u8,
    },
    /// Upstream kept failing after a refresh; drop the session and render
    /// logged out
    Expired,
}

#[derive(Clone)]
pub struct FeedService {
    oauth: Arc<RedditOAuthClient>,
    reddit: Arc<RedditClient>,
}

impl FeedService {
    pub fn new(oauth: Arc<RedditOAuthClient>, reddit: Arc<RedditClient>) -> Self {
        Self { oauth, reddit }
    }

    /// Load one feed page for the given session.
    ///
    /// `attempt` counts the refreshes made in the current reauth window, as
    /// recorded by the handler after a `Reauthenticate`. Refresh errors are
    /// returned as-is.
    pub async fn load(
        &self,
        session: Option<&Session>,
        after: Option<&str>,
        attempt: u8,
    ) -> Result<FeedOutcome, AuthError> {
        let Some(session) = session.filter(|s| s.has_access_token()) else {
            return Ok(FeedOutcome::Render(FeedView::logged_out()));
        };

        let fetch_error = match self.reddit.fetch_page(&session.access_token, after).await {
            Ok(posts) => return Ok(FeedOutcome::Render(FeedView::page(posts))),
            Err(e) => e,
        };

        warn!(error = %fetch_error, attempt, "Feed fetch failed");

        let Some(refresh_token) = session.refresh_token() else {
            return Ok(FeedOutcome::Render(FeedView::logged_out()));
        };

        if attempt >= MAX_REAUTH_ATTEMPTS {
            warn!(attempt, "Feed still failing after refresh, dropping session");
            return Ok(FeedOutcome::Expired);
        }

        let refreshed = self.oauth.refresh(refresh_token).await?;
        info!("Access token refreshed, redirecting to retry the page");

        Ok(FeedOutcome::Reauthenticate {
            session: refreshed,
            location: index_location(after),
            attempts: attempt.saturating_add(1),
        })
    }
}

/// Path and query for the index page
pub fn index_location(after: Option<&str>) -> String {
    match after.filter(|a| !a.is_empty()) {
        Some(after) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("after", after)
                .finish();
            format!("/?{}", query)
        }
        None => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_location() {
        assert_eq!(index_location(None), "/");
        assert_eq!(index_location(Some("")), "/");
        assert_eq!(index_location(Some("abc")), "/?after=abc");
        assert_eq!(index_location(Some("a b")), "/?after=a+b");
    }

    #[test]
    fn test_next_cursor_is_last_post_id() {
        let posts: Vec<Post> = ["x", "y"]
            .iter()
            .map(|id| Post {
                id: id.to_string(),
                author: "a".to_string(),
                author_fullname: None,
                title: "t".to_string(),
                selftext: String::new(),
                selftext_html: None,
                subreddit: "s".to_string(),
                url: "https://example.com".to_string(),
                thumbnail: String::new(),
                created_utc: 0.0,
            })
            .collect();

        assert_eq!(FeedView::page(posts).next_cursor.as_deref(), Some("y"));
        assert_eq!(FeedView::page(Vec::new()).next_cursor, None);
    }
}
