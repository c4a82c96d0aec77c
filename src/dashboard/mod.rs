//! Sentiment dashboard
//!
//! Mounting a [`Dashboard`] starts three tasks under one `mount_id`:
//!
//! - the view store, the only writer of [`crate::state::ViewState`]
//! - the initial fetch, applied as one `InitialLoad` event
//! - the live listener, which owns the stream subscription
//!
//! [`DashboardHandle::unmount`] stops the listener and the store. An
//! in-flight fetch is left to finish and its result is discarded.

mod fetcher;
mod session;

pub use fetcher::{DataFetcher, FetchFailure, FetchSettings, LoadOutcome, PartResult};
pub use session::{Dashboard, DashboardHandle};
