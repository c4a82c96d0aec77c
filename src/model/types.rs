//! Core data types for the sentiment dashboard
//!
//! Wire leniency lives here: counts that are absent or `null` read as zero,
//! post ids may arrive as strings or integers, and instants accept several
//! textual forms (see [`super::time`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::{deserialize_instant, deserialize_optional_instant};

/// Read a count, treating `null` as zero
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Number of posts per sentiment label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub positive: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub negative: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn new(positive: u64, negative: u64, neutral: u64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    /// Sum of the three counts, saturating at `u64::MAX`
    pub fn sum(&self) -> u64 {
        self.positive
            .saturating_add(self.negative)
            .saturating_add(self.neutral)
    }

    /// Count for a single label
    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Labels with a non-zero count, in legend order
    pub fn slices(&self) -> Vec<(SentimentLabel, u64)> {
        SentimentLabel::all()
            .iter()
            .map(|&label| (label, self.get(label)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Sentiment classification of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    #[serde(alias = "Positive", alias = "POSITIVE")]
    Positive,
    #[serde(alias = "Negative", alias = "NEGATIVE")]
    Negative,
    #[serde(alias = "Neutral", alias = "NEUTRAL")]
    Neutral,
}

impl SentimentLabel {
    /// All labels in display order
    pub fn all() -> &'static [SentimentLabel] {
        &[
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for SentimentLabel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(ParseEnumError {
                kind: "sentiment label",
                value: s.to_string(),
                expected: "positive, negative, neutral",
            }),
        }
    }
}

/// Bucket size for the aggregate trend endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    #[default]
    Hour,
    Day,
    Week,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Hour => "hour",
            TrendPeriod::Day => "day",
            TrendPeriod::Week => "week",
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendPeriod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(TrendPeriod::Hour),
            "day" => Ok(TrendPeriod::Day),
            "week" => Ok(TrendPeriod::Week),
            _ => Err(ParseEnumError {
                kind: "trend period",
                value: s.to_string(),
                expected: "hour, day, week",
            }),
        }
    }
}

/// One time bucket of the sentiment trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(deserialize_with = "deserialize_instant")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub positive: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub negative: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub neutral: u64,
}

impl TrendPoint {
    pub fn new(timestamp: DateTime<Utc>, counts: SentimentCounts) -> Self {
        Self {
            timestamp,
            positive: counts.positive,
            negative: counts.negative,
            neutral: counts.neutral,
        }
    }

    pub fn counts(&self) -> SentimentCounts {
        SentimentCounts::new(self.positive, self.negative, self.neutral)
    }
}

/// Opaque post identifier; the wire may carry it as a string or an integer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => PostId(s),
            WireId::Signed(n) => PostId(n.to_string()),
            WireId::Unsigned(n) => PostId(n.to_string()),
        })
    }
}

/// Sentiment analysis attached to a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSentiment {
    pub label: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl PostSentiment {
    pub fn labeled(label: SentimentLabel) -> Self {
        Self {
            label,
            confidence: None,
            emotion: None,
            model_name: None,
        }
    }
}

/// An analyzed social media post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
    pub sentiment: PostSentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(
        post_id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        label: SentimentLabel,
    ) -> Self {
        Self {
            post_id: PostId::new(post_id),
            content: content.into(),
            source: source.into(),
            sentiment: PostSentiment::labeled(label),
            author: None,
            created_at: None,
        }
    }
}

/// Connection status indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}
