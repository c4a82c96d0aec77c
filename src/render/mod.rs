//! Text rendering of the dashboard view
//!
//! The renderer only reads [`ViewState`]; it never changes it.

use chrono::{DateTime, Local, Utc};
use std::io::{self, Write};

use crate::model::{SentimentLabel, TrendPoint};
use crate::state::ViewState;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 30;

/// Presentation collaborator for the dashboard
pub trait Renderer {
    fn render(&mut self, state: &ViewState) -> io::Result<()>;
}

/// Plain-text dashboard written to any [`Write`]
pub struct TextRenderer<W: Write> {
    out: W,
    utc: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, utc: false }
    }

    /// Show times in UTC instead of local time
    pub fn utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn format_time(&self, ts: DateTime<Utc>, fmt: &str) -> String {
        if self.utc {
            ts.format(fmt).to_string()
        } else {
            ts.with_timezone(&Local).format(fmt).to_string()
        }
    }

    fn header(&mut self, state: &ViewState) -> io::Result<()> {
        let last_update = state
            .last_update
            .map(|ts| self.format_time(ts, "%H:%M:%S"))
            .unwrap_or_else(|| "--".to_string());

        writeln!(self.out, "Sentiment Dashboard")?;
        writeln!(
            self.out,
            "Status: ● {:<14} Last Update: {}",
            state.status.to_string(),
            last_update
        )?;
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))
    }

    fn metric_cards(&mut self, state: &ViewState) -> io::Result<()> {
        let m = &state.metrics;
        writeln!(
            self.out,
            "Total: {}   Positive: {}   Negative: {}   Neutral: {}",
            m.total, m.positive, m.negative, m.neutral
        )?;
        writeln!(self.out)
    }

    fn distribution(&mut self, state: &ViewState) -> io::Result<()> {
        writeln!(self.out, "Sentiment Distribution")?;

        let Some(counts) = state.distribution else {
            writeln!(self.out, "  No data available")?;
            return writeln!(self.out);
        };

        let slices = counts.slices();
        if slices.is_empty() {
            writeln!(self.out, "  No data available")?;
            return writeln!(self.out);
        }

        let sum = counts.sum() as f64;
        for (label, count) in slices {
            let share = count as f64 / sum;
            let bar = "█".repeat((share * BAR_WIDTH as f64).round() as usize);
            writeln!(
                self.out,
                "  {:<10} {:>6} {:>6.1}%  {}",
                label.as_str(),
                count,
                share * 100.0,
                bar
            )?;
        }
        writeln!(self.out)
    }

    fn trend(&mut self, points: &[TrendPoint]) -> io::Result<()> {
        writeln!(self.out, "Sentiment Trend")?;

        if points.is_empty() {
            writeln!(self.out, "  No data available")?;
            return writeln!(self.out);
        }

        writeln!(
            self.out,
            "  {:<8} {:>9} {:>9} {:>9}",
            "Time", "Positive", "Negative", "Neutral"
        )?;
        for point in points {
            let time = self.format_time(point.timestamp, "%H:%M");
            let counts = point.counts();
            writeln!(
                self.out,
                "  {:<8} {:>9} {:>9} {:>9}",
                time,
                counts.get(SentimentLabel::Positive),
                counts.get(SentimentLabel::Negative),
                counts.get(SentimentLabel::Neutral)
            )?;
        }
        writeln!(self.out)
    }

    fn recent_posts(&mut self, state: &ViewState) -> io::Result<()> {
        writeln!(self.out, "Recent Posts")?;

        if state.recent_posts.is_empty() {
            return writeln!(self.out, "  No posts available");
        }

        for post in state.recent_posts.iter() {
            writeln!(self.out, "  {}", post.content)?;
            writeln!(self.out, "    {} • {}", post.source, post.sentiment.label)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, state: &ViewState) -> io::Result<()> {
        self.header(state)?;
        self.metric_cards(state)?;
        self.distribution(state)?;
        self.trend(&state.trend)?;
        self.recent_posts(state)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionStatus, Post, SentimentCounts};
    use crate::state::{Metrics, RecentPosts};
    use chrono::TimeZone;

    fn render(state: &ViewState) -> String {
        let mut renderer = TextRenderer::new(Vec::new()).utc(true);
        renderer.render(state).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_state() {
        let text = render(&ViewState::new());

        assert!(text.contains("Status: ● connecting"));
        assert!(text.contains("Last Update: --"));
        assert!(text.contains("Total: 0   Positive: 0   Negative: 0   Neutral: 0"));
        assert_eq!(text.matches("No data available").count(), 2);
        assert!(text.contains("No posts available"));
    }

    #[test]
    fn test_loaded_state() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let counts = SentimentCounts::new(3, 1, 0);
        let state = ViewState {
            metrics: Metrics::from_counts(counts),
            distribution: Some(counts),
            trend: vec![TrendPoint::new(ts, SentimentCounts::new(1, 0, 0))],
            recent_posts: RecentPosts::from_posts(vec![Post::new(
                "a",
                "Loving the new release",
                "twitter",
                SentimentLabel::Positive,
            )]),
            status: ConnectionStatus::Connected,
            last_update: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 1, 30).unwrap()),
        };

        let text = render(&state);

        assert!(text.contains("Status: ● connected"));
        assert!(text.contains("Last Update: 10:01:30"));
        assert!(text.contains("Total: 4   Positive: 3"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("25.0%"));
        // Zero slices are not drawn.
        assert!(!text.contains("  neutral"));
        assert!(text.contains("  10:00"));
        assert!(text.contains("  Loving the new release"));
        assert!(text.contains("    twitter • positive"));
    }

    #[test]
    fn test_all_zero_distribution_has_no_slices() {
        let state = ViewState {
            distribution: Some(SentimentCounts::default()),
            ..ViewState::new()
        };
        let text = render(&state);
        assert!(text.contains("Sentiment Distribution\n  No data available"));
    }
}
