//! Run configuration, loaded once per invocation from a JSON file.

use eyre::Context;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::snapshot::NewsVideo;

/// Configuration for one aggregation run. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// YouTube Data API key for read-only fetching. Optional when the run
    /// authenticates with OAuth or a service account instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// The channels to pull uploads from.
    pub channels: Vec<String>,
    /// Minimum video duration in seconds; shorter videos are dropped.
    #[serde(default = "default_min_duration")]
    pub min_duration: u32,
    /// How many days back the lookback window reaches.
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    /// Cap on videos retrieved per channel before filtering.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Cap on videos kept per channel after ranking.
    #[serde(default = "default_max_videos_per_channel")]
    pub max_videos_per_channel: usize,
    /// Cap on the total selection size.
    #[serde(default = "default_max_total_videos")]
    pub max_total_videos: usize,
    /// Directory the snapshot artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Keywords that feed the thematic-relevance part of the quality score.
    #[serde(default)]
    pub quality_keywords: Vec<String>,
    /// Per-channel selection criteria; channels without an entry are scored.
    #[serde(default)]
    pub channel_criteria: HashMap<String, ChannelCriteria>,
}

fn default_min_duration() -> u32 {
    60
}

fn default_days_back() -> u32 {
    1
}

fn default_max_results() -> u32 {
    20
}

fn default_max_videos_per_channel() -> usize {
    5
}

fn default_max_total_videos() -> usize {
    25
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl RunConfig {
    /// Loads the configuration from a JSON file.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config file {}", path.display()))?;
        if config.channels.is_empty() {
            eyre::bail!("config lists no channels");
        }
        Ok(config)
    }

    /// The selection criteria for a channel, defaulting to scored ranking.
    pub fn criteria_for(&self, channel_id: &str) -> &ChannelCriteria {
        static SCORED: ChannelCriteria = ChannelCriteria::Scored;
        self.channel_criteria.get(channel_id).unwrap_or(&SCORED)
    }
}

/// How videos from one channel are selected.
///
/// `scored` channels compete on their total score and are trimmed to the
/// per-channel cap. `matched` channels pass a video only when every rule
/// present in the criteria holds; matched videos skip scoring and survive
/// the overall cap preferentially.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChannelCriteria {
    /// Rank the channel's videos by total score.
    Scored,
    /// Keep only videos that satisfy every rule present.
    Matched {
        /// At least one of these must appear in the title or description
        /// (case-insensitive). Empty = no keyword constraint.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        title_keywords: Vec<String>,
        /// The description must start with one of these (case-insensitive).
        /// Empty = no prefix constraint.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        description_prefixes: Vec<String>,
        /// Inclusive UTC-hour window the video must be published within.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        published_hours: Option<(i8, i8)>,
        /// Inclusive duration window in minutes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_minutes: Option<(f64, f64)>,
    },
}

impl ChannelCriteria {
    /// Whether videos under these criteria are selected by score.
    pub fn is_scored(&self) -> bool {
        matches!(self, ChannelCriteria::Scored)
    }

    /// Evaluates the match rules against a video. Scored criteria match
    /// everything; selection happens later, by rank.
    pub fn matches(&self, video: &NewsVideo) -> bool {
        let ChannelCriteria::Matched {
            title_keywords,
            description_prefixes,
            published_hours,
            duration_minutes,
        } = self
        else {
            return true;
        };

        if !title_keywords.is_empty() {
            let haystack = format!("{} {}", video.title, video.description).to_lowercase();
            if !title_keywords
                .iter()
                .any(|kw| haystack.contains(&kw.to_lowercase()))
            {
                return false;
            }
        }

        if !description_prefixes.is_empty() {
            let description = video.description.to_lowercase();
            if !description_prefixes
                .iter()
                .any(|prefix| description.starts_with(&prefix.to_lowercase()))
            {
                return false;
            }
        }

        if let Some((from, to)) = published_hours {
            let hour = video.published_at.to_zoned(TimeZone::UTC).hour();
            if hour < *from || hour > *to {
                return false;
            }
        }

        if let Some((from, to)) = duration_minutes {
            let minutes = f64::from(video.duration_seconds) / 60.0;
            if minutes < *from || minutes > *to {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NewsVideo;
    use pretty_assertions::assert_eq;

    fn video(title: &str, description: &str, published_at: &str, duration: u32) -> NewsVideo {
        NewsVideo {
            id: "vid".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            published_at: published_at.parse().unwrap(),
            channel_id: "chan".to_string(),
            channel_title: "Channel".to_string(),
            thumbnail: None,
            duration_seconds: duration,
            duration_formatted: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            tags: Vec::new(),
            hours_since_published: 0.0,
            quality_score: None,
            viral_score: None,
            total_score: None,
        }
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{"api_key": "k", "channels": ["UCabc"]}"#,
        )
        .unwrap();
        assert_eq!(config.days_back, 1);
        assert_eq!(config.max_results, 20);
        assert_eq!(config.max_videos_per_channel, 5);
        assert_eq!(config.max_total_videos, 25);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.criteria_for("UCabc").is_scored());
    }

    #[test]
    fn matched_criteria_require_every_present_rule() {
        let criteria: ChannelCriteria = serde_json::from_str(
            r#"{"mode": "matched",
                "description_prefixes": ["das wichtigste", "die nachrichten"],
                "published_hours": [5, 7],
                "duration_minutes": [8.0, 12.0]}"#,
        )
        .unwrap();

        let morning_brief = video(
            "Morgen-Update • Wirtschaft • Politik",
            "Das Wichtigste in Kürze",
            "2026-08-06T05:30:00Z",
            600,
        );
        assert!(criteria.matches(&morning_brief));

        // Right format, wrong hour.
        let evening = video(
            "Abend-Update",
            "Das Wichtigste in Kürze",
            "2026-08-06T19:30:00Z",
            600,
        );
        assert!(!criteria.matches(&evening));

        // Right hour, too short.
        let clip = video(
            "Kurzclip",
            "Das Wichtigste in Kürze",
            "2026-08-06T06:00:00Z",
            120,
        );
        assert!(!criteria.matches(&clip));
    }

    #[test]
    fn keyword_criteria_search_title_and_description() {
        let criteria: ChannelCriteria = serde_json::from_str(
            r#"{"mode": "matched", "title_keywords": ["koch"]}"#,
        )
        .unwrap();

        let in_title = video("Interview mit Koch", "", "2026-08-06T12:00:00Z", 1200);
        let in_description = video("Interview", "Gespräch mit Koch", "2026-08-06T12:00:00Z", 1200);
        let neither = video("Interview", "Gespräch", "2026-08-06T12:00:00Z", 1200);

        assert!(criteria.matches(&in_title));
        assert!(criteria.matches(&in_description));
        assert!(!criteria.matches(&neither));
    }
}
