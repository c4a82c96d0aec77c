//! # Sentiview
//!
//! Live sentiment dashboard client. Loads a snapshot of sentiment data from a
//! REST API, then keeps it current from a WebSocket push stream.
//!
//! ## Modules
//!
//! - [`model`]: posts, sentiment counts and trend points
//! - [`api`]: REST client for the sentiment API
//! - [`stream`]: live update subscription and listener
//! - [`state`]: view state and its merge rules
//! - [`dashboard`]: mount/unmount of one dashboard session
//! - [`render`]: text rendering of the view
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentiview::{Config, Dashboard, Renderer, TextRenderer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default();
//!     let mut handle = Dashboard::from_config(&config)?.mount();
//!
//!     let mut renderer = TextRenderer::new(std::io::stdout());
//!     while handle.changed().await {
//!         renderer.render(&handle.snapshot())?;
//!     }
//!
//!     handle.unmount().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod model;
pub mod render;
pub mod state;
pub mod stream;

pub use api::{ApiClient, FailureKind, FetchError, FetchResult, SentimentSource};
pub use config::{Config, ConfigError, FetchPolicy};
pub use dashboard::{Dashboard, DashboardHandle, DataFetcher, FetchSettings, LoadOutcome};
pub use model::{ConnectionStatus, Post, SentimentCounts, SentimentLabel, TrendPoint};
pub use render::{Renderer, TextRenderer};
pub use state::{reduce, ViewEvent, ViewState, ViewStore};
pub use stream::{LiveListener, StreamError, StreamMessage, Subscription, WsSubscription};
