//! View State merge rules
//!
//! `reduce` is the only place the view state changes. It is a pure function
//! of the previous state, the event and the current time.

use chrono::{DateTime, Utc};

use super::view::{Metrics, RecentPosts, ViewState};
use crate::dashboard::LoadOutcome;
use crate::model::ConnectionStatus;
use crate::stream::StreamMessage;

/// Everything that can change the view
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// Result of the initial fetch, applied as one unit
    InitialLoad(LoadOutcome),
    /// The stream is being opened (or reopened)
    StreamConnecting,
    /// The stream transport is open
    StreamOpened,
    /// The stream closed or failed; rendered data is kept
    StreamClosed,
    /// A parsed stream message
    Stream(StreamMessage),
}

impl ViewEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ViewEvent::InitialLoad(_) => "initial_load",
            ViewEvent::StreamConnecting => "stream_connecting",
            ViewEvent::StreamOpened => "stream_opened",
            ViewEvent::StreamClosed => "stream_closed",
            ViewEvent::Stream(msg) => msg.kind(),
        }
    }
}

/// Produce the next view state
pub fn reduce(state: &ViewState, event: ViewEvent, now: DateTime<Utc>) -> ViewState {
    let mut next = state.clone();

    match event {
        ViewEvent::InitialLoad(outcome) => apply_load(&mut next, outcome, now),
        ViewEvent::StreamConnecting => next.status = ConnectionStatus::Connecting,
        ViewEvent::StreamOpened => next.status = ConnectionStatus::Connected,
        ViewEvent::StreamClosed => next.status = ConnectionStatus::Disconnected,
        ViewEvent::Stream(message) => {
            match message {
                // Authoritative replace; the total follows the new counts.
                StreamMessage::SentimentUpdate { counts } => {
                    next.distribution = Some(counts);
                    next.metrics = Metrics::from_counts(counts);
                }
                StreamMessage::NewPost { post } => next.recent_posts.push(post),
                StreamMessage::Connected { .. } | StreamMessage::Other { .. } => {}
            }
            next.last_update = Some(now);
        }
    }

    next
}

fn apply_load(next: &mut ViewState, outcome: LoadOutcome, now: DateTime<Utc>) {
    next.status = if outcome.is_complete() {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Disconnected
    };

    let mut applied = false;

    if let Some(distribution) = outcome.distribution.loaded() {
        next.distribution = Some(distribution.counts);
        next.metrics = Metrics::from_distribution(distribution);
        applied = true;
    }
    if let Some(points) = outcome.trend.into_loaded() {
        next.trend = points;
        applied = true;
    }
    if let Some(posts) = outcome.posts.into_loaded() {
        next.recent_posts = RecentPosts::from_posts(posts);
        applied = true;
    }

    if applied {
        next.last_update = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Distribution, Endpoint, FailureKind};
    use crate::dashboard::{FetchFailure, PartResult};
    use crate::model::{Post, SentimentCounts, SentimentLabel, TrendPoint};
    use chrono::TimeZone;

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap()
    }

    fn post(id: &str) -> Post {
        Post::new(id, "text", "twitter", SentimentLabel::Positive)
    }

    fn failure(endpoint: Endpoint) -> FetchFailure {
        FetchFailure {
            endpoint,
            kind: FailureKind::Network,
            message: "connection refused".to_string(),
        }
    }

    fn full_load() -> LoadOutcome {
        LoadOutcome {
            probe: None,
            distribution: PartResult::Loaded(Distribution {
                counts: SentimentCounts::new(3, 1, 0),
                total: Some(4),
            }),
            trend: PartResult::Loaded(vec![TrendPoint::new(
                t(0),
                SentimentCounts::new(1, 0, 0),
            )]),
            posts: PartResult::Loaded(vec![post("a")]),
        }
    }

    #[test]
    fn test_initial_load_scenario() {
        let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(full_load()), t(1));

        assert_eq!(
            state.metrics,
            Metrics {
                total: 4,
                positive: 3,
                negative: 1,
                neutral: 0
            }
        );
        assert_eq!(state.trend.len(), 1);
        assert_eq!(state.trend[0].timestamp, t(0));
        assert_eq!(state.recent_posts.ids(), vec!["a"]);
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.last_update, Some(t(1)));
    }

    #[test]
    fn test_initial_load_recomputes_missing_total() {
        let mut outcome = full_load();
        outcome.distribution = PartResult::Loaded(Distribution {
            counts: SentimentCounts::new(2, 2, 5),
            total: None,
        });
        let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(outcome), t(1));
        assert_eq!(state.metrics.total, 9);
    }

    #[test]
    fn test_partial_load_applies_successes_and_disconnects() {
        let mut outcome = full_load();
        outcome.trend = PartResult::Failed(failure(Endpoint::Aggregate));

        let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(outcome), t(1));

        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.metrics.total, 4);
        assert!(state.trend.is_empty());
        assert_eq!(state.recent_posts.len(), 1);
    }

    #[test]
    fn test_failed_load_leaves_fields_default() {
        let outcome = LoadOutcome {
            probe: None,
            distribution: PartResult::Failed(failure(Endpoint::Distribution)),
            trend: PartResult::Skipped,
            posts: PartResult::Skipped,
        };
        let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(outcome), t(1));

        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.distribution.is_none());
        assert_eq!(state.metrics, Metrics::default());
        assert!(state.last_update.is_none());
    }

    #[test]
    fn test_failed_probe_marks_disconnected() {
        let mut outcome = full_load();
        outcome.probe = Some(failure(Endpoint::Health));
        let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(outcome), t(1));
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.metrics.total, 4);
    }

    #[test]
    fn test_sentiment_update_replaces_counts() {
        let loaded = reduce(&ViewState::new(), ViewEvent::InitialLoad(full_load()), t(1));

        let update = StreamMessage::SentimentUpdate {
            counts: SentimentCounts::new(0, 0, 7),
        };
        let state = reduce(&loaded, ViewEvent::Stream(update), t(2));

        assert_eq!(state.distribution, Some(SentimentCounts::new(0, 0, 7)));
        assert_eq!(
            state.metrics,
            Metrics {
                total: 7,
                positive: 0,
                negative: 0,
                neutral: 7
            }
        );
        assert_eq!(state.trend, loaded.trend);
        assert_eq!(state.recent_posts, loaded.recent_posts);
        assert_eq!(state.last_update, Some(t(2)));
    }

    #[test]
    fn test_sentiment_update_with_huge_counts() {
        let frame = r#"{"type":"sentiment_update","distribution":{"positive":18446744073709551615,"negative":1,"neutral":0}}"#;
        let message = StreamMessage::parse(frame).unwrap();
        let state = reduce(&ViewState::new(), ViewEvent::Stream(message), t(2));

        assert_eq!(state.metrics.total, u64::MAX);
        assert_eq!(state.metrics.positive, u64::MAX);
        assert_eq!(state.metrics.negative, 1);

        let next = reduce(
            &state,
            ViewEvent::Stream(StreamMessage::NewPost { post: post("p1") }),
            t(3),
        );
        assert_eq!(next.recent_posts.ids(), vec!["p1"]);
        assert_eq!(next.metrics, state.metrics);
    }

    #[test]
    fn test_new_post_sequence() {
        let mut state = ViewState::new();
        for (i, id) in ["p1", "p2", "p3", "p4", "p5"].iter().enumerate() {
            let msg = StreamMessage::NewPost { post: post(id) };
            state = reduce(&state, ViewEvent::Stream(msg), t(i as u32));
        }
        assert_eq!(state.recent_posts.ids(), vec!["p5", "p4", "p3", "p2", "p1"]);

        let msg = StreamMessage::NewPost { post: post("p6") };
        state = reduce(&state, ViewEvent::Stream(msg), t(6));
        assert_eq!(state.recent_posts.ids(), vec!["p6", "p5", "p4", "p3", "p2"]);
        assert!(state.distribution.is_none());
        assert!(state.trend.is_empty());
    }

    #[test]
    fn test_unrecognized_message_only_touches_last_update() {
        let loaded = reduce(&ViewState::new(), ViewEvent::InitialLoad(full_load()), t(1));
        let msg = StreamMessage::Other {
            kind: "metrics_update".to_string(),
        };
        let state = reduce(&loaded, ViewEvent::Stream(msg), t(5));

        let mut expected = loaded.clone();
        expected.last_update = Some(t(5));
        assert_eq!(state, expected);
    }

    #[test]
    fn test_stream_lifecycle_keeps_data() {
        let loaded = reduce(&ViewState::new(), ViewEvent::InitialLoad(full_load()), t(1));

        let closed = reduce(&loaded, ViewEvent::StreamClosed, t(2));
        assert_eq!(closed.status, ConnectionStatus::Disconnected);
        assert_eq!(closed.metrics, loaded.metrics);
        assert_eq!(closed.recent_posts, loaded.recent_posts);
        assert_eq!(closed.last_update, loaded.last_update);

        let reconnecting = reduce(&closed, ViewEvent::StreamConnecting, t(3));
        assert_eq!(reconnecting.status, ConnectionStatus::Connecting);
        let opened = reduce(&reconnecting, ViewEvent::StreamOpened, t(4));
        assert_eq!(opened.status, ConnectionStatus::Connected);
    }

    #[test]
    fn test_trend_is_never_live_updated() {
        let loaded = reduce(&ViewState::new(), ViewEvent::InitialLoad(full_load()), t(1));
        let mut state = loaded.clone();
        for msg in [
            StreamMessage::SentimentUpdate {
                counts: SentimentCounts::new(9, 9, 9),
            },
            StreamMessage::NewPost { post: post("z") },
        ] {
            state = reduce(&state, ViewEvent::Stream(msg), t(3));
        }
        assert_eq!(state.trend, loaded.trend);
    }
}
