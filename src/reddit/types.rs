use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Thumbnail values Reddit uses in place of an actual image URL
const PLACEHOLDER_THUMBNAILS: &[&str] = &["self", "default", "image", "nsfw", "spoiler"];

/// A post from the feed
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_fullname: Option<String>,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selftext_html: Option<String>,
    pub subreddit: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    pub created_utc: f64,
}

impl Post {
    /// Thumbnail URL, or `None` when Reddit sent a placeholder
    pub fn display_thumbnail(&self) -> Option<&str> {
        let thumb = self.thumbnail.trim();
        if thumb.is_empty() || PLACEHOLDER_THUMBNAILS.contains(&thumb) {
            None
        } else {
            Some(thumb)
        }
    }

    pub fn is_text_post(&self) -> bool {
        !self.selftext.is_empty()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_utc as i64, 0).single()
    }

    /// Coarse relative age, e.g. "3 hours ago"
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let Some(created) = self.created_at() else {
            return "some time ago".to_string();
        };

        let seconds = (now - created).num_seconds().max(0);
        let (value, unit) = match seconds {
            s if s < 60 => return "just now".to_string(),
            s if s < 3_600 => (s / 60, "minute"),
            s if s < 86_400 => (s / 3_600, "hour"),
            s if s < 2_592_000 => (s / 86_400, "day"),
            s if s < 31_536_000 => (s / 2_592_000, "month"),
            s => (s / 31_536_000, "year"),
        };

        if value == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", value, unit)
        }
    }
}

/// Listing envelope returned by feed endpoints: `data.children[].data`
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub data: Post,
}

impl Listing {
    pub fn into_posts(self) -> Vec<Post> {
        self.data.children.into_iter().map(|thing| thing.data).collect()
    }
}
