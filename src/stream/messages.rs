//! Stream Message Types
//!
//! Frames pushed by the sentiment server are JSON objects discriminated by a
//! string `type` field. Unknown types are kept as [`StreamMessage::Other`];
//! frames that cannot be read at all are [`StreamError::Malformed`].

use serde::Deserialize;
use serde_json::Value;

use super::error::{StreamError, StreamResult};
use crate::model::{Post, SentimentCounts};

/// A decoded message from the live stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Full replacement of the current distribution counts
    SentimentUpdate { counts: SentimentCounts },
    /// A newly analyzed post
    NewPost { post: Post },
    /// Server greeting sent right after the socket opens
    Connected { message: Option<String> },
    /// Any other well-formed frame
    Other { kind: String },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownFrame {
    SentimentUpdate {
        #[serde(default)]
        distribution: Option<SentimentCounts>,
    },
    NewPost {
        post: Post,
    },
    Connected {
        #[serde(default)]
        message: Option<String>,
    },
}

impl From<KnownFrame> for StreamMessage {
    fn from(frame: KnownFrame) -> Self {
        match frame {
            KnownFrame::SentimentUpdate { distribution } => StreamMessage::SentimentUpdate {
                counts: distribution.unwrap_or_default(),
            },
            KnownFrame::NewPost { post } => StreamMessage::NewPost { post },
            KnownFrame::Connected { message } => StreamMessage::Connected { message },
        }
    }
}

impl StreamMessage {
    /// Decode one text frame
    pub fn parse(text: &str) -> StreamResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| StreamError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamError::Malformed("missing string field 'type'".to_string()))?;

        match kind {
            "sentiment_update" | "new_post" | "connected" => {
                let kind = kind.to_string();
                serde_json::from_value::<KnownFrame>(value)
                    .map(StreamMessage::from)
                    .map_err(|e| StreamError::Malformed(format!("{} payload: {}", kind, e)))
            }
            other => Ok(StreamMessage::Other {
                kind: other.to_string(),
            }),
        }
    }

    /// Wire name of the message type
    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::SentimentUpdate { .. } => "sentiment_update",
            StreamMessage::NewPost { .. } => "new_post",
            StreamMessage::Connected { .. } => "connected",
            StreamMessage::Other { .. } => "other",
        }
    }
}
