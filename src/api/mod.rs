//! Sentiment API client
//!
//! Read-only client for the external sentiment-analysis REST API.
//!
//! ## Endpoints (base path `/api`)
//!
//! - `GET /posts?limit=&offset=&source=&sentiment=&start_date=&end_date=`
//! - `GET /sentiment/distribution?hours=&source=`
//! - `GET /sentiment/aggregate?period=&start_date=&end_date=`
//! - `GET /health`
//!
//! The server is a collaborator; only its contract is consumed here.

mod client;
mod dto;
mod error;

pub use client::ApiClient;
pub use dto::{
    AggregateQuery, Distribution, DistributionQuery, HealthReport, PostFilters, PostPage,
    PostQuery,
};
pub use error::{FailureKind, FetchError, FetchResult};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::model::TrendPoint;

/// The read endpoints the dashboard consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Distribution,
    Aggregate,
    Posts,
    Health,
}

impl Endpoint {
    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Distribution => "/sentiment/distribution",
            Endpoint::Aggregate => "/sentiment/aggregate",
            Endpoint::Posts => "/posts",
            Endpoint::Health => "/health",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Source of dashboard data
///
/// Implemented by [`ApiClient`]; tests substitute in-memory sources.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// Counts per label over a trailing window
    async fn fetch_distribution(&self, query: &DistributionQuery) -> FetchResult<Distribution>;

    /// Time-bucketed counts, in server order
    async fn fetch_aggregate(&self, query: &AggregateQuery) -> FetchResult<Vec<TrendPoint>>;

    /// A page of analyzed posts, most recent first
    async fn fetch_posts(&self, query: &PostQuery) -> FetchResult<PostPage>;

    /// Liveness probe; the body is ignored
    async fn health_check(&self) -> FetchResult<()>;
}
