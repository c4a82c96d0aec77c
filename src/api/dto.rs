//! Data Transfer Objects
//!
//! Request parameters and response bodies for the sentiment API.
//! Response types are deliberately lenient: absent or `null` fields read
//! as zero or empty.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{
    deserialize_optional_instant, Post, SentimentCounts, SentimentLabel, TrendPeriod, TrendPoint,
};

fn format_date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================
// REQUESTS
// ============================================

/// Optional filters for `GET /posts`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilters {
    pub source: Option<String>,
    pub sentiment: Option<SentimentLabel>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Parameters for `GET /posts`
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    pub limit: u32,
    pub offset: u32,
    pub filters: PostFilters,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            limit: 5,
            offset: 0,
            filters: PostFilters::default(),
        }
    }
}

impl PostQuery {
    pub fn recent(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(source) = &self.filters.source {
            params.push(("source", source.clone()));
        }
        if let Some(label) = self.filters.sentiment {
            params.push(("sentiment", label.to_string()));
        }
        if let Some(start) = &self.filters.start_date {
            params.push(("start_date", format_date(start)));
        }
        if let Some(end) = &self.filters.end_date {
            params.push(("end_date", format_date(end)));
        }
        params
    }
}

/// Parameters for `GET /sentiment/distribution`
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionQuery {
    /// Trailing window in hours
    pub hours: u32,
    pub source: Option<String>,
}

impl Default for DistributionQuery {
    fn default() -> Self {
        Self {
            hours: 24,
            source: None,
        }
    }
}

impl DistributionQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("hours", self.hours.to_string())];
        if let Some(source) = &self.source {
            params.push(("source", source.clone()));
        }
        params
    }
}

/// Parameters for `GET /sentiment/aggregate`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateQuery {
    pub period: TrendPeriod,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl AggregateQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("period", self.period.to_string())];
        if let Some(start) = &self.start_date {
            params.push(("start_date", format_date(start)));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", format_date(end)));
        }
        params
    }
}

// ============================================
// RESPONSES
// ============================================

/// Distribution over the requested window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub counts: SentimentCounts,
    /// Server-supplied total, when the response carried one
    pub total: Option<u64>,
}

impl Distribution {
    /// Server total if present, otherwise the sum of the counts
    pub fn total(&self) -> u64 {
        self.total.unwrap_or_else(|| self.counts.sum())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistributionResponse {
    #[serde(default)]
    distribution: Option<SentimentCounts>,
    #[serde(default)]
    total: Option<u64>,
}

impl From<DistributionResponse> for Distribution {
    fn from(resp: DistributionResponse) -> Self {
        Self {
            counts: resp.distribution.unwrap_or_default(),
            total: resp.total,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTrendPoint {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    counts: SentimentCounts,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateResponse {
    #[serde(default)]
    data: Option<Vec<WireTrendPoint>>,
}

impl AggregateResponse {
    /// Points in server order; points without a usable timestamp are dropped
    pub(crate) fn into_points(self) -> Vec<TrendPoint> {
        let raw = self.data.unwrap_or_default();
        let received = raw.len();

        let points: Vec<TrendPoint> = raw
            .into_iter()
            .filter_map(|p| p.timestamp.map(|ts| TrendPoint::new(ts, p.counts)))
            .collect();

        if points.len() < received {
            tracing::warn!(
                dropped = received - points.len(),
                "Dropped trend points without a usable timestamp"
            );
        }
        points
    }
}

/// One page of posts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Total matching posts, when the server reports it
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsResponse {
    #[serde(default)]
    posts: Option<Vec<Post>>,
    #[serde(default)]
    total: Option<u64>,
}

impl From<PostsResponse> for PostPage {
    fn from(resp: PostsResponse) -> Self {
        Self {
            posts: resp.posts.unwrap_or_default(),
            total: resp.total,
        }
    }
}

/// Health report from `GET /health`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub services: HashMap<String, String>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
}
