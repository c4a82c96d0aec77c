//! Domain model
//!
//! Types shared by the REST client, the stream listener and the view state:
//! - `SentimentCounts`: counts per sentiment label
//! - `TrendPoint`: one time bucket of counts
//! - `Post` and `PostSentiment`: an analyzed social media post
//! - `ConnectionStatus`: the status indicator shown to the user

mod time;
mod types;

pub use time::{deserialize_instant, deserialize_optional_instant, parse_instant};
pub use types::{
    ConnectionStatus, ParseEnumError, Post, PostId, PostSentiment, SentimentCounts,
    SentimentLabel, TrendPeriod, TrendPoint,
};
