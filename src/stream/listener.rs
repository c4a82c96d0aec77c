//! Live update listener
//!
//! Drives one subscription for the lifetime of a mount and turns what it
//! yields into view events, in delivery order.

use tokio::sync::watch;

use super::messages::StreamMessage;
use super::subscription::{StreamEvent, Subscription};
use crate::state::{wait_for_shutdown, Dispatcher, ViewEvent};

pub struct LiveListener {
    subscription: Box<dyn Subscription>,
    dispatcher: Dispatcher,
}

impl LiveListener {
    pub fn new(subscription: Box<dyn Subscription>, dispatcher: Dispatcher) -> Self {
        Self {
            subscription,
            dispatcher,
        }
    }

    /// Open the subscription and forward messages until shutdown or close
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        self.dispatcher.dispatch(ViewEvent::StreamConnecting);

        let opened = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => None,
            result = self.subscription.open() => Some(result),
        };

        let Some(opened) = opened else {
            self.subscription.close().await;
            return;
        };
        if let Err(e) = opened {
            tracing::warn!(error = %e, "Live updates unavailable");
            self.dispatcher.dispatch(ViewEvent::StreamClosed);
            self.subscription.close().await;
            return;
        }
        self.dispatcher.dispatch(ViewEvent::StreamOpened);

        loop {
            let event = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                event = self.subscription.recv() => event,
            };

            if !self.handle(event) {
                break;
            }
        }

        self.subscription.close().await;
        tracing::debug!("Live listener stopped");
    }

    /// Returns `false` when the listener should stop
    fn handle(&self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::Text(text) => match StreamMessage::parse(&text) {
                Ok(message) => {
                    match &message {
                        StreamMessage::Connected { message: greeting } => {
                            tracing::info!(greeting = ?greeting, "Stream greeting received");
                        }
                        StreamMessage::Other { kind } => {
                            tracing::debug!(kind = %kind, "Ignoring unrecognized stream message");
                        }
                        _ => tracing::debug!(kind = message.kind(), "Stream message received"),
                    }
                    self.dispatcher.dispatch(ViewEvent::Stream(message))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed stream message");
                    true
                }
            },
            StreamEvent::Interrupted(e) => {
                tracing::warn!(error = %e, "Sentiment stream interrupted");
                self.dispatcher.dispatch(ViewEvent::StreamClosed)
            }
            StreamEvent::Reopened => {
                tracing::info!("Sentiment stream reopened");
                self.dispatcher.dispatch(ViewEvent::StreamOpened)
            }
            StreamEvent::Closed => {
                self.dispatcher.dispatch(ViewEvent::StreamClosed);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConnectionStatus;
    use crate::state::{ViewState, ViewStore};
    use crate::stream::{StreamError, StreamResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Scripted {
        open_result: Option<StreamResult<()>>,
        events: VecDeque<StreamEvent>,
        hold_open: bool,
        closed: Arc<AtomicBool>,
        drained: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Subscription for Scripted {
        async fn open(&mut self) -> StreamResult<()> {
            self.open_result.take().unwrap_or(Ok(()))
        }

        async fn recv(&mut self) -> StreamEvent {
            match self.events.pop_front() {
                Some(event) => event,
                None if self.hold_open => {
                    if let Some(drained) = &self.drained {
                        drained.notify_one();
                    }
                    std::future::pending().await
                }
                None => StreamEvent::Closed,
            }
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn text(s: &str) -> StreamEvent {
        StreamEvent::Text(s.to_string())
    }

    async fn run_to_end(sub: Scripted) -> ViewState {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let store = ViewStore::spawn(ViewState::new(), shutdown_rx.clone());
        let mut state = store.subscribe();

        LiveListener::new(Box::new(sub), store.dispatcher())
            .run(shutdown_rx)
            .await;

        // The closing StreamClosed is the last event the listener sends.
        tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| s.status == ConnectionStatus::Disconnected),
        )
        .await
        .unwrap()
        .unwrap();
        store.snapshot()
    }

    #[tokio::test]
    async fn test_messages_applied_and_malformed_skipped() {
        let closed = Arc::new(AtomicBool::new(false));
        let sub = Scripted {
            open_result: None,
            events: VecDeque::from(vec![
                text(r#"{"type":"connected","message":"hi"}"#),
                text(r#"{"type":"new_post","post":{"post_id":"p1","sentiment":{"label":"neutral"}}}"#),
                text("{broken"),
                text(r#"{"type":"sentiment_update","distribution":{"positive":5,"negative":1,"neutral":2}}"#),
                text(r#"{"type":"new_post","post":{"post_id":"p2","sentiment":{"label":"positive"}}}"#),
            ]),
            hold_open: false,
            closed: closed.clone(),
            drained: None,
        };

        let state = run_to_end(sub).await;

        assert_eq!(state.recent_posts.ids(), vec!["p2", "p1"]);
        assert_eq!(state.metrics.total, 8);
        assert!(state.last_update.is_some());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_open_failure_marks_disconnected() {
        let sub = Scripted {
            open_result: Some(Err(StreamError::Connect {
                url: "ws://test".to_string(),
                message: "refused".to_string(),
            })),
            events: VecDeque::new(),
            hold_open: false,
            closed: Arc::new(AtomicBool::new(false)),
            drained: None,
        };

        let state = run_to_end(sub).await;
        assert!(state.recent_posts.is_empty());
        assert!(state.last_update.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscription() {
        let closed = Arc::new(AtomicBool::new(false));
        let sub = Scripted {
            open_result: None,
            events: VecDeque::new(),
            hold_open: true,
            closed: closed.clone(),
            drained: None,
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let store = ViewStore::spawn(ViewState::new(), shutdown_rx.clone());
        let mut state = store.subscribe();
        let listener = LiveListener::new(Box::new(sub), store.dispatcher());
        let task = tokio::spawn(listener.run(shutdown_rx));

        tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| s.status == ConnectionStatus::Connected),
        )
        .await
        .unwrap()
        .unwrap();

        shutdown_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_malformed_frames_leave_state_untouched() {
        let closed = Arc::new(AtomicBool::new(false));
        let drained = Arc::new(Notify::new());
        let sub = Scripted {
            open_result: None,
            events: VecDeque::from(vec![text("{broken"), text(r#"{"type":42}"#)]),
            hold_open: true,
            closed: closed.clone(),
            drained: Some(drained.clone()),
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let store = ViewStore::spawn(ViewState::new(), shutdown_rx.clone());
        let mut state = store.subscribe();
        let listener = LiveListener::new(Box::new(sub), store.dispatcher());
        let task = tokio::spawn(listener.run(shutdown_rx));

        tokio::time::timeout(Duration::from_secs(1), drained.notified())
            .await
            .unwrap();
        tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| s.status == ConnectionStatus::Connected),
        )
        .await
        .unwrap()
        .unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.last_update.is_none());
        assert_eq!(snapshot.status, ConnectionStatus::Connected);
        assert!(snapshot.recent_posts.is_empty());
        assert!(snapshot.distribution.is_none());
        assert!(!closed.load(Ordering::SeqCst));
        assert!(!task.is_finished());

        shutdown_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(closed.load(Ordering::SeqCst));
    }
}
