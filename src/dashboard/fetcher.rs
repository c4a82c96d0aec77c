//! Initial data fetch
//!
//! Reads distribution, trend and recent posts once per mount and reports
//! every part as loaded, failed or skipped in a single [`LoadOutcome`].

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::api::{
    AggregateQuery, Distribution, DistributionQuery, Endpoint, FailureKind, FetchError,
    FetchResult, PostQuery, SentimentSource,
};
use crate::config::{FetchConfig, FetchPolicy};
use crate::model::{Post, TrendPoint};

/// Why one part of the load did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub endpoint: Endpoint,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(endpoint: Endpoint, err: &FetchError) -> Self {
        Self {
            endpoint,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.endpoint, self.kind, self.message)
    }
}

/// Result of one read within the initial load
#[derive(Debug, Clone, PartialEq)]
pub enum PartResult<T> {
    Loaded(T),
    Failed(FetchFailure),
    /// Not attempted because an earlier read failed
    Skipped,
}

impl<T> PartResult<T> {
    fn from_result(endpoint: Endpoint, result: FetchResult<T>) -> Self {
        match result {
            Ok(value) => PartResult::Loaded(value),
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, kind = %e.kind(), error = %e, "Fetch failed");
                PartResult::Failed(FetchFailure::new(endpoint, &e))
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PartResult::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            PartResult::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            PartResult::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            PartResult::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Everything the initial load produced
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Health probe failure, when a probe was configured and failed
    pub probe: Option<FetchFailure>,
    pub distribution: PartResult<Distribution>,
    pub trend: PartResult<Vec<TrendPoint>>,
    pub posts: PartResult<Vec<Post>>,
}

impl LoadOutcome {
    /// True when the probe (if any) and all three reads succeeded
    pub fn is_complete(&self) -> bool {
        self.probe.is_none()
            && self.distribution.is_loaded()
            && self.trend.is_loaded()
            && self.posts.is_loaded()
    }

    pub fn applied_any(&self) -> bool {
        self.distribution.is_loaded() || self.trend.is_loaded() || self.posts.is_loaded()
    }

    pub fn failures(&self) -> Vec<&FetchFailure> {
        self.probe
            .iter()
            .chain(self.distribution.failure())
            .chain(self.trend.failure())
            .chain(self.posts.failure())
            .collect()
    }

    fn skipped_after(probe: Option<FetchFailure>) -> Self {
        Self {
            probe,
            distribution: PartResult::Skipped,
            trend: PartResult::Skipped,
            posts: PartResult::Skipped,
        }
    }
}

/// Queries and policy for one load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchSettings {
    pub policy: FetchPolicy,
    pub probe_health: bool,
    pub distribution: DistributionQuery,
    pub aggregate: AggregateQuery,
    pub posts: PostQuery,
}

impl From<&FetchConfig> for FetchSettings {
    fn from(config: &FetchConfig) -> Self {
        Self {
            policy: config.policy,
            probe_health: config.probe_health,
            distribution: DistributionQuery {
                hours: config.distribution_hours,
                source: config.source.clone(),
            },
            aggregate: AggregateQuery {
                period: config.trend_period,
                ..AggregateQuery::default()
            },
            posts: PostQuery::recent(config.recent_limit),
        }
    }
}

/// Runs the initial load against a [`SentimentSource`]
#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn SentimentSource>,
    settings: FetchSettings,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn SentimentSource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Perform the probe (if configured) and the three reads
    pub async fn load(&self) -> LoadOutcome {
        let probe = if self.settings.probe_health {
            self.probe().await
        } else {
            None
        };

        let outcome = match self.settings.policy {
            FetchPolicy::Independent => self.load_independent(probe).await,
            FetchPolicy::FailFast => self.load_fail_fast(probe).await,
        };

        if outcome.is_complete() {
            tracing::info!("Initial load complete");
        } else {
            tracing::warn!(
                failures = outcome.failures().len(),
                policy = ?self.settings.policy,
                "Initial load incomplete"
            );
        }
        outcome
    }

    async fn probe(&self) -> Option<FetchFailure> {
        match self.source.health_check().await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Health probe failed");
                Some(FetchFailure {
                    endpoint: Endpoint::Health,
                    kind: FailureKind::Network,
                    message: e.to_string(),
                })
            }
        }
    }

    async fn load_independent(&self, probe: Option<FetchFailure>) -> LoadOutcome {
        let (distribution, trend, posts) = tokio::join!(
            self.source.fetch_distribution(&self.settings.distribution),
            self.source.fetch_aggregate(&self.settings.aggregate),
            self.source.fetch_posts(&self.settings.posts),
        );

        LoadOutcome {
            probe,
            distribution: PartResult::from_result(Endpoint::Distribution, distribution),
            trend: PartResult::from_result(Endpoint::Aggregate, trend),
            posts: PartResult::from_result(
                Endpoint::Posts,
                posts.map(|page| page.posts),
            ),
        }
    }

    async fn load_fail_fast(&self, probe: Option<FetchFailure>) -> LoadOutcome {
        if probe.is_some() {
            return LoadOutcome::skipped_after(probe);
        }
        let mut outcome = LoadOutcome::skipped_after(None);

        outcome.distribution = PartResult::from_result(
            Endpoint::Distribution,
            self.source
                .fetch_distribution(&self.settings.distribution)
                .await,
        );
        if !outcome.distribution.is_loaded() {
            return outcome;
        }

        outcome.trend = PartResult::from_result(
            Endpoint::Aggregate,
            self.source.fetch_aggregate(&self.settings.aggregate).await,
        );
        if !outcome.trend.is_loaded() {
            return outcome;
        }

        outcome.posts = PartResult::from_result(
            Endpoint::Posts,
            self.source
                .fetch_posts(&self.settings.posts)
                .await
                .map(|page| page.posts),
        );
        outcome
    }
}
