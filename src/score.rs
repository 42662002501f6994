//! Ranking scores for scored channels.
//!
//! A video's total score blends a quality score (70%) with a viral score
//! (30%). Each component is a weighted sum of normalized 0–1 signals; the
//! normalization constants encode what "good" looks like for a news channel
//! (e.g. 1000 views/hour counts as fully viral).

use crate::snapshot::NewsVideo;

/// Weight of the quality score in the total.
const QUALITY_WEIGHT: f64 = 0.7;
/// Weight of the viral score in the total.
const VIRAL_WEIGHT: f64 = 0.3;

/// The three scores attached to a ranked video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub quality: f64,
    pub viral: f64,
    pub total: f64,
}

/// Computes quality and viral scores from video metadata.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    /// Lowercased keywords for the thematic-relevance signal.
    quality_keywords: Vec<String>,
}

impl ScoreCalculator {
    pub fn new(quality_keywords: &[String]) -> Self {
        Self {
            quality_keywords: quality_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Scores one video.
    pub fn score(&self, video: &NewsVideo) -> Scores {
        let quality = self.quality_score(video);
        let viral = self.viral_score(video);
        Scores {
            quality,
            viral,
            total: QUALITY_WEIGHT * quality + VIRAL_WEIGHT * viral,
        }
    }

    /// Quality score: engagement rate (25%), comment rate (15%), video
    /// length (20%), information depth (15%), recency (10%), thematic
    /// relevance (15%).
    fn quality_score(&self, video: &NewsVideo) -> f64 {
        let views = video.view_count as f64;

        // Likes per 10k views, saturating at 300.
        let engagement = if views > 0.0 {
            let rate = video.like_count as f64 / views * 10_000.0;
            (rate / 300.0).min(1.0)
        } else {
            0.0
        };

        // Comments per 10k views, saturating at 50.
        let comments = if views > 0.0 {
            let rate = video.comment_count as f64 / views * 10_000.0;
            (rate / 50.0).min(1.0)
        } else {
            0.0
        };

        // 7–20 minutes is the sweet spot for a news segment.
        let minutes = f64::from(video.duration_seconds) / 60.0;
        let length = if (7.0..=20.0).contains(&minutes) {
            1.0
        } else if (3.0..7.0).contains(&minutes) {
            0.7
        } else if minutes > 20.0 {
            0.8
        } else {
            0.2
        };

        // Tags (40%) and description length (60%) approximate how much
        // context the uploader provided.
        let tags = (video.tags.len() as f64 / 10.0).min(1.0);
        let description = (video.description.len() as f64 / 1000.0).min(1.0);
        let info_depth = 0.4 * tags + 0.6 * description;

        // Fresh uploads score 1.0, decaying to 0.0 over 24 hours.
        let recency = (1.0 - video.hours_since_published / 24.0).max(0.0);

        let thematic = self.thematic_relevance(&video.title, &video.description);

        0.25 * engagement
            + 0.15 * comments
            + 0.20 * length
            + 0.15 * info_depth
            + 0.10 * recency
            + 0.15 * thematic
    }

    /// Viral score: views per hour (60%), like-to-view ratio (25%),
    /// comment-to-view ratio (15%).
    fn viral_score(&self, video: &NewsVideo) -> f64 {
        let views = video.view_count as f64;
        let hours = video.hours_since_published.max(1.0);

        let views_per_hour = (views / hours / 1000.0).min(1.0);

        let like_ratio = if views > 0.0 {
            (video.like_count as f64 / views * 100.0 / 5.0).min(1.0)
        } else {
            0.0
        };

        let comment_ratio = if views > 0.0 {
            (video.comment_count as f64 / views * 100.0).min(1.0)
        } else {
            0.0
        };

        0.60 * views_per_hour + 0.25 * like_ratio + 0.15 * comment_ratio
    }

    /// Fraction of the configured keywords found in the title/description,
    /// normalized so that matching 20% of them is a full score. Without
    /// configured keywords every video gets a neutral 0.5.
    fn thematic_relevance(&self, title: &str, description: &str) -> f64 {
        if self.quality_keywords.is_empty() {
            return 0.5;
        }

        let haystack = format!("{title} {description}").to_lowercase();
        let matches = self
            .quality_keywords
            .iter()
            .filter(|kw| haystack.contains(kw.as_str()))
            .count();

        let max_expected = (self.quality_keywords.len() as f64 * 0.2).max(1.0);
        (matches as f64 / max_expected).min(1.0)
    }
}

/// Attaches scores to every video in place.
pub fn apply_scores(videos: &mut [NewsVideo], quality_keywords: &[String]) {
    let calculator = ScoreCalculator::new(quality_keywords);
    for video in videos {
        let scores = calculator.score(video);
        video.quality_score = Some(scores.quality);
        video.viral_score = Some(scores.viral);
        video.total_score = Some(scores.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(views: u64, likes: u64, comments: u64, duration: u32, hours: f64) -> NewsVideo {
        NewsVideo {
            id: "vid".to_string(),
            title: "Market analysis: economy and politics".to_string(),
            description: "A look at stocks and finance.".to_string(),
            published_at: "2026-08-06T12:00:00Z".parse().unwrap(),
            channel_id: "chan".to_string(),
            channel_title: "Channel".to_string(),
            thumbnail: None,
            duration_seconds: duration,
            duration_formatted: String::new(),
            view_count: views,
            like_count: likes,
            comment_count: comments,
            tags: vec!["news".to_string(), "economy".to_string()],
            hours_since_published: hours,
            quality_score: None,
            viral_score: None,
            total_score: None,
        }
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let calculator = ScoreCalculator::new(&["economy".to_string()]);
        for v in [
            video(0, 0, 0, 0, 0.0),
            video(1_000_000, 100_000, 50_000, 600, 0.5),
            video(10, 1, 0, 30, 100.0),
        ] {
            let scores = calculator.score(&v);
            assert!((0.0..=1.0).contains(&scores.quality), "{scores:?}");
            assert!((0.0..=1.0).contains(&scores.viral), "{scores:?}");
            assert!((0.0..=1.0).contains(&scores.total), "{scores:?}");
        }
    }

    #[test]
    fn high_engagement_outranks_low_engagement() {
        let keywords = vec!["economy".to_string(), "politics".to_string()];
        let calculator = ScoreCalculator::new(&keywords);

        let popular = video(100_000, 3_000, 500, 600, 2.0);
        let ignored = video(100, 1, 0, 600, 20.0);

        let popular_scores = calculator.score(&popular);
        let ignored_scores = calculator.score(&ignored);
        assert!(popular_scores.total > ignored_scores.total);
    }

    #[test]
    fn zero_views_does_not_divide_by_zero() {
        let calculator = ScoreCalculator::new(&[]);
        let scores = calculator.score(&video(0, 0, 0, 600, 1.0));
        assert_eq!(scores.viral, 0.0);
        assert!(scores.quality > 0.0); // length, recency, and neutral relevance still count
    }

    #[test]
    fn apply_scores_fills_every_video() {
        let mut videos = vec![video(100, 10, 1, 600, 1.0), video(200, 20, 2, 300, 2.0)];
        apply_scores(&mut videos, &[]);
        for v in &videos {
            assert!(v.quality_score.is_some());
            assert!(v.viral_score.is_some());
            assert!(v.total_score.is_some());
        }
    }
}
