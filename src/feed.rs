use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{FeedPost, Suggestion};
use crate::seed;
use crate::storage::{keys, Storage};

// Import logging macros
use crate::{log_service_success, log_validation};

const LOCAL_AUTHOR: &str = "You";

/// Seed posts followed by local posts, newest first. Posts without a
/// usable timestamp sort last; ties keep their merged order.
pub fn merge_feed(base: Vec<FeedPost>, local: Vec<FeedPost>) -> Vec<FeedPost> {
    let mut feed = base;
    feed.extend(local);
    feed.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    feed
}

pub fn new_post(content: &str) -> FeedPost {
    let now = Utc::now();
    FeedPost {
        id: Uuid::new_v4().to_string(),
        name: LOCAL_AUTHOR.to_string(),
        content: content.to_string(),
        ts: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        created_at: Some(now.timestamp_millis()),
    }
}

/// Community feed plus "people you may know" suggestions
#[derive(Clone)]
pub struct FeedAggregator {
    storage: Storage,
}

impl FeedAggregator {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn read(&self) -> Vec<FeedPost> {
        let local: Vec<FeedPost> = self.storage.get_or(keys::FEED, Vec::new()).await;
        merge_feed(seed::base_feed(), local)
    }

    /// Publish a post and return the refreshed feed
    pub async fn post(&self, content: &str) -> AppResult<Vec<FeedPost>> {
        let content = content.trim();
        if content.is_empty() {
            log_validation!(failure, "feed_post", error = "empty content");
            return Err(AppError::validation("Post content is required"));
        }
        self.push(new_post(content)).await?;
        log_service_success!("feed", "post", "post published");
        Ok(self.read().await)
    }

    async fn push(&self, post: FeedPost) -> AppResult<()> {
        self.storage
            .update(keys::FEED, Vec::new, move |posts: &mut Vec<FeedPost>| {
                posts.insert(0, post);
                Ok(())
            })
            .await
    }

    pub async fn suggestions(&self) -> Vec<Suggestion> {
        self.storage
            .get_or(keys::PYMK, seed::initial_suggestions())
            .await
    }

    /// Announce the connection in the feed and drop the suggestion
    pub async fn connect(&self, suggestion_id: u32) -> AppResult<Vec<FeedPost>> {
        let suggestion = self.take_suggestion(suggestion_id).await?;
        self.push(new_post(&format!("connected with {} 🎉", suggestion.name)))
            .await?;
        log_service_success!("feed", "connect", resource_id = suggestion_id, "connected");
        Ok(self.read().await)
    }

    pub async fn dismiss(&self, suggestion_id: u32) -> AppResult<Vec<Suggestion>> {
        self.take_suggestion(suggestion_id).await?;
        log_service_success!("feed", "dismiss", resource_id = suggestion_id, "suggestion dismissed");
        Ok(self.suggestions().await)
    }

    async fn take_suggestion(&self, suggestion_id: u32) -> AppResult<Suggestion> {
        self.storage
            .update(
                keys::PYMK,
                seed::initial_suggestions,
                |list: &mut Vec<Suggestion>| {
                    let index = list
                        .iter()
                        .position(|s| s.id == suggestion_id)
                        .ok_or_else(|| AppError::not_found("suggestion", suggestion_id))?;
                    Ok(list.remove(index))
                },
            )
            .await
    }
}
