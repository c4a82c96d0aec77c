//! Live update stream
//!
//! Push channel from the sentiment server. A [`LiveListener`] owns one
//! [`Subscription`] per mount; [`Reconnecting`] optionally wraps it with a
//! backoff policy.

mod error;
mod listener;
mod messages;
mod reconnect;
mod subscription;

pub use error::{StreamError, StreamResult};
pub use listener::LiveListener;
pub use messages::StreamMessage;
pub use reconnect::{ReconnectPolicy, Reconnecting};
pub use subscription::{StreamEvent, Subscription, WsSubscription};
