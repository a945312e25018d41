pub mod client;
pub mod types;

pub use client::{RedditClient, RedditError};
pub use types::{Listing, Post};
