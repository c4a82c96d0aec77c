//! Dashboard view state
//!
//! - [`ViewState`]: the immutable value handed to the renderer
//! - [`reduce`]: pure merge rules keyed on [`ViewEvent`]
//! - [`ViewStore`]: single-writer queue that serializes all mutations

mod reducer;
mod store;
mod view;

pub use reducer::{reduce, ViewEvent};
pub use store::{Dispatcher, ViewStore};
pub use view::{Metrics, RecentPosts, ViewState, RECENT_POSTS_CAPACITY};

pub(crate) use store::wait_for_shutdown;
