//! View State
//!
//! The value the dashboard renders. It is never mutated in place by
//! collaborators; [`super::reduce`] produces the next value from the
//! previous one and an event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::api::Distribution;
use crate::model::{ConnectionStatus, Post, SentimentCounts, TrendPoint};

/// Maximum number of posts kept in the recent list
pub const RECENT_POSTS_CAPACITY: usize = 5;

/// Headline numbers shown as metric cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl Metrics {
    /// Metrics from a fetched distribution; the server total wins when present
    pub fn from_distribution(distribution: &Distribution) -> Self {
        Self {
            total: distribution.total(),
            ..Self::from_counts(distribution.counts)
        }
    }

    /// Metrics with the total recomputed from the counts
    pub fn from_counts(counts: SentimentCounts) -> Self {
        Self {
            total: counts.sum(),
            positive: counts.positive,
            negative: counts.negative,
            neutral: counts.neutral,
        }
    }
}

/// Most-recent-first list of posts with a fixed capacity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecentPosts(VecDeque<Post>);

impl RecentPosts {
    /// Keep the first `RECENT_POSTS_CAPACITY` posts of a most-recent-first page
    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self(posts.into_iter().take(RECENT_POSTS_CAPACITY).collect())
    }

    /// Prepend a post, evicting the oldest entry beyond capacity
    pub fn push(&mut self, post: Post) {
        self.0.push_front(post);
        self.0.truncate(RECENT_POSTS_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.post_id.as_str()).collect()
    }
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub metrics: Metrics,
    /// `None` until a distribution has been received
    pub distribution: Option<SentimentCounts>,
    pub trend: Vec<TrendPoint>,
    pub recent_posts: RecentPosts,
    pub status: ConnectionStatus,
    pub last_update: Option<DateTime<Utc>>,
}

impl ViewState {
    /// Empty state at mount
    pub fn new() -> Self {
        Self::default()
    }
}
