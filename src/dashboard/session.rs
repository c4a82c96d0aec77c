//! Dashboard session
//!
//! Wires the fetcher, the live listener and the view store together for
//! one mount. Each mount owns exactly one subscription and one store.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::fetcher::{DataFetcher, FetchSettings};
use crate::api::{ApiClient, FetchResult, SentimentSource};
use crate::config::Config;
use crate::state::{ViewEvent, ViewState, ViewStore};
use crate::stream::{LiveListener, ReconnectPolicy, Reconnecting, Subscription, WsSubscription};

/// An unmounted dashboard
pub struct Dashboard {
    fetcher: DataFetcher,
    subscription: Box<dyn Subscription>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn SentimentSource>,
        subscription: Box<dyn Subscription>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            fetcher: DataFetcher::new(source, settings),
            subscription,
        }
    }

    /// Build the REST client and WebSocket subscription described by `config`
    pub fn from_config(config: &Config) -> FetchResult<Self> {
        let client = ApiClient::new(&config.api)?;
        let ws_url = config.stream.resolve_url(&config.api);
        let ws = WsSubscription::new(ws_url);

        let subscription: Box<dyn Subscription> = if config.stream.reconnect.enabled {
            let policy = ReconnectPolicy::from(&config.stream.reconnect);
            Box::new(Reconnecting::new(ws, policy))
        } else {
            Box::new(ws)
        };

        Ok(Self::new(
            Arc::new(client),
            subscription,
            FetchSettings::from(&config.fetch),
        ))
    }

    /// Start the store, the initial fetch and the live listener
    pub fn mount(self) -> DashboardHandle {
        let mount_id = Uuid::new_v4();
        let span = tracing::info_span!("dashboard", %mount_id);
        span.in_scope(|| tracing::info!("Mounting dashboard"));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let store = ViewStore::spawn(ViewState::new(), shutdown_rx.clone());
        let (dispatcher, state, store_task) = store.into_parts();

        let fetcher = self.fetcher;
        let fetch_dispatcher = dispatcher.clone();
        // Not cancelled on unmount; a late outcome is rejected by the closed store.
        tokio::spawn(
            async move {
                let outcome = fetcher.load().await;
                fetch_dispatcher.dispatch(ViewEvent::InitialLoad(outcome));
            }
            .instrument(span.clone()),
        );

        let listener = LiveListener::new(self.subscription, dispatcher);
        let listener_task = tokio::spawn(listener.run(shutdown_rx).instrument(span));

        DashboardHandle {
            mount_id,
            state,
            shutdown: shutdown_tx,
            store_task: Some(store_task),
            listener_task: Some(listener_task),
        }
    }
}

/// A mounted dashboard; dropping it unmounts without waiting
pub struct DashboardHandle {
    mount_id: Uuid,
    state: watch::Receiver<ViewState>,
    shutdown: watch::Sender<bool>,
    store_task: Option<JoinHandle<()>>,
    listener_task: Option<JoinHandle<()>>,
}

impl DashboardHandle {
    pub fn mount_id(&self) -> Uuid {
        self.mount_id
    }

    /// Latest published view state
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait for the next state change; `false` once the store has stopped
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Stop the listener and the store and wait for both to finish
    pub async fn unmount(mut self) {
        tracing::info!(mount_id = %self.mount_id, "Unmounting dashboard");
        self.shutdown.send_replace(true);

        for task in [self.listener_task.take(), self.store_task.take()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = task.await {
                tracing::warn!(mount_id = %self.mount_id, error = %e, "Dashboard task failed");
            }
        }
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
