//! Single-writer view store
//!
//! Every mutation of the view goes through one queue drained by one task,
//! which applies [`reduce`] and publishes the result on a watch channel.
//! Once the store stops, further events are rejected and dropped.

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::reducer::{reduce, ViewEvent};
use super::view::ViewState;

/// Cloneable handle used by producers (fetcher, listener) to submit events
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<ViewEvent>,
}

impl Dispatcher {
    /// Enqueue an event; returns `false` when the store has stopped
    pub fn dispatch(&self, event: ViewEvent) -> bool {
        let name = event.name();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(event = name, "View store closed, discarding event");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner of the view state
pub struct ViewStore {
    dispatcher: Dispatcher,
    state: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl ViewStore {
    /// Start the writer task; it stops when `shutdown` turns true or its sender is dropped
    pub fn spawn(initial: ViewState, shutdown: watch::Receiver<bool>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial);

        let task = tokio::spawn(run_writer(rx, state_tx, shutdown));

        Self {
            dispatcher: Dispatcher { tx },
            state: state_rx,
            task,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Dispatcher, watch::Receiver<ViewState>, JoinHandle<()>) {
        (self.dispatcher, self.state, self.task)
    }
}

async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<ViewEvent>,
    state_tx: watch::Sender<ViewState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut state = state_tx.borrow().clone();

    loop {
        tokio::select! {
            biased;

            _ = wait_for_shutdown(&mut shutdown) => break,

            event = rx.recv() => {
                let Some(event) = event else { break };
                let name = event.name();
                state = reduce(&state, event, Utc::now());
                tracing::trace!(event = name, status = %state.status, "Applied view event");
                state_tx.send_replace(state.clone());
            }
        }
    }

    rx.close();
    tracing::debug!("View store stopped");
}

/// Resolve once the shutdown flag is set or its sender is gone
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
