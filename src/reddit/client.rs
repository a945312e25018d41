use crate::auth::USER_AGENT;
use crate::config::Config;
use crate::reddit::types::{Listing, Post};
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Prefix Reddit puts on link ("t3") fullnames
const LINK_PREFIX: &str = "t3_";

/// Error types for feed retrieval
#[derive(Debug, thiserror::Error)]
pub enum RedditError {
    #[error("Failed to fetch home page: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch home page: unauthorized, token may be expired")]
    Unauthorized,

    #[error("Failed to fetch home page: API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to fetch home page: invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the Bearer-authenticated Reddit API
#[derive(Clone)]
pub struct RedditClient {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl RedditClient {
    pub fn new(config: &Config) -> Result<Self, RedditError> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.clone(),
        })
    }

    /// Fetch one page of the "best" feed.
    ///
    /// `after` is the id of the last post on the previous page. An empty
    /// result means the feed is exhausted.
    pub async fn fetch_page(
        &self,
        access_token: &str,
        after: Option<&str>,
    ) -> Result<Vec<Post>, RedditError> {
        let mut request = self
            .http_client
            .get(format!("{}/best", self.api_base_url))
            .bearer_auth(access_token)
            .query(&[("show", "all")]);

        if let Some(cursor) = after.filter(|c| !c.is_empty()) {
            request = request.query(&[("after", link_fullname(cursor))]);
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            s if s.is_success() => {
                let body = response.text().await?;
                let listing: Listing = serde_json::from_str(&body)?;
                let posts = listing.into_posts();
                debug!(count = posts.len(), after = ?after, "Fetched feed page");
                Ok(posts)
            }
            StatusCode::UNAUTHORIZED => {
                warn!("Feed request rejected: unauthorized");
                Err(RedditError::Unauthorized)
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(status = %status, "Feed request failed");
                Err(RedditError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// `t3_<id>`, leaving already-prefixed cursors alone
fn link_fullname(cursor: &str) -> String {
    if cursor.starts_with(LINK_PREFIX) {
        cursor.to_string()
    } else {
        format!("{}{}", LINK_PREFIX, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_fullname() {
        assert_eq!(link_fullname("abc"), "t3_abc");
        assert_eq!(link_fullname("t3_abc"), "t3_abc");
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        assert_eq!(
            RedditError::Api {
                status: 503,
                message: "down".to_string()
            }
            .to_string(),
            "Failed to fetch home page: API error 503: down"
        );
        assert!(RedditError::Unauthorized
            .to_string()
            .starts_with("Failed to fetch home page"));
    }
}
