//! Fetches recent uploads from the configured channels and selects the
//! videos worth publishing.
//!
//! The fetch runs in two stages to keep API quota low: uploads playlists are
//! scanned for recent video IDs first, then everything is hydrated in
//! batched `videos.list` calls. Filtering and selection are pure functions
//! over the hydrated set.

use eyre::Context;
use jiff::{SignedDuration, Timestamp};
use std::collections::HashMap;
use tokio_stream::StreamExt;

use crate::config::RunConfig;
use crate::score::apply_scores;
use crate::snapshot::{NewsVideo, format_duration};
use crate::youtube_api::YouTubeClient;
use crate::youtube_api::videos::{VideoResource, VideoStatistics};

/// Collects, hydrates, filters, and selects news videos for one run.
///
/// `now` anchors the lookback window; passing a fixed timestamp makes
/// cutoffs reproducible across re-runs.
///
/// An API error while scanning one channel is logged and drops that
/// channel's contribution; the run continues with the remaining channels.
pub async fn collect_news_videos(
    yt: &YouTubeClient,
    config: &RunConfig,
    now: Timestamp,
) -> eyre::Result<Vec<NewsVideo>> {
    let cutoff = now - SignedDuration::from_hours(i64::from(config.days_back) * 24);
    tracing::info!(
        channels = config.channels.len(),
        days_back = config.days_back,
        %cutoff,
        "collecting recent uploads"
    );

    let mut video_ids = Vec::new();
    for channel_id in &config.channels {
        match recent_upload_ids(yt, channel_id, cutoff, config.max_results).await {
            Ok(ids) => {
                tracing::info!(channel_id, found = ids.len(), "scanned channel uploads");
                video_ids.extend(ids);
            }
            Err(e) => {
                tracing::warn!(channel_id, "failed to scan channel, dropping it: {e:#}");
            }
        }
    }

    let resources = yt
        .get_video_details(&video_ids)
        .await
        .context("hydrate video details")?;
    let videos: Vec<NewsVideo> = resources
        .into_iter()
        .map(|resource| to_news_video(resource, now))
        .collect();

    let videos = baseline_filter(videos, config.min_duration, cutoff);
    let selected = select_videos(videos, config);
    tracing::info!(selected = selected.len(), "video selection complete");
    Ok(selected)
}

/// Scans a channel's uploads playlist for videos published after `cutoff`,
/// up to `max_results` of them.
async fn recent_upload_ids(
    yt: &YouTubeClient,
    channel_id: &str,
    cutoff: Timestamp,
    max_results: u32,
) -> eyre::Result<Vec<String>> {
    let Some(uploads) = yt
        .uploads_playlist_for_channel(channel_id)
        .await
        .context("resolve uploads playlist")?
    else {
        tracing::warn!(channel_id, "channel has no uploads playlist, skipping");
        return Ok(Vec::new());
    };

    let items = yt.list_playlist_items(&uploads);
    let mut items = std::pin::pin!(items);
    let mut ids = Vec::new();
    while let Some(item) = items.next().await {
        if ids.len() >= max_results as usize {
            break;
        }
        let item = item.context("fetch uploads playlist item")?;

        let published = item
            .content_details
            .as_ref()
            .and_then(|d| d.video_published_at)
            .or_else(|| item.snippet.as_ref().map(|s| s.published_at));
        let Some(published) = published else {
            continue;
        };
        if published < cutoff {
            continue;
        }

        if let Some(video_id) = item.video_id() {
            ids.push(video_id.to_string());
        }
    }
    Ok(ids)
}

/// Builds the domain model from a hydrated API resource.
fn to_news_video(resource: VideoResource, now: Timestamp) -> NewsVideo {
    let duration_seconds = resource
        .content_details
        .as_ref()
        .map(|details| parse_iso8601_duration(&details.duration))
        .transpose()
        .unwrap_or_else(|e| {
            tracing::warn!(video_id = resource.id, "unparseable duration: {e:#}");
            None
        })
        .unwrap_or(0);

    let (view_count, like_count, comment_count) = match &resource.statistics {
        Some(stats) => (
            VideoStatistics::count(stats.view_count.as_ref()),
            VideoStatistics::count(stats.like_count.as_ref()),
            VideoStatistics::count(stats.comment_count.as_ref()),
        ),
        None => (0, 0, 0),
    };

    let snippet = resource.snippet;
    let hours_since_published =
        ((now.as_second() - snippet.published_at.as_second()) as f64 / 3600.0).max(0.0);

    NewsVideo {
        id: resource.id,
        title: snippet.title,
        description: snippet.description,
        published_at: snippet.published_at,
        channel_id: snippet.channel_id,
        channel_title: snippet.channel_title,
        thumbnail: snippet.thumbnails.best_url().map(str::to_string),
        duration_seconds,
        duration_formatted: format_duration(duration_seconds),
        view_count,
        like_count,
        comment_count,
        tags: snippet.tags,
        hours_since_published,
        quality_score: None,
        viral_score: None,
        total_score: None,
    }
}

/// Parses an ISO 8601 duration like `PT1H2M3S` into whole seconds.
pub fn parse_iso8601_duration(text: &str) -> eyre::Result<u32> {
    let span: jiff::Span = text
        .parse()
        .with_context(|| format!("parse ISO 8601 duration '{text}'"))?;
    // A relative date makes day-sized units well-defined; months never
    // appear in video durations.
    let seconds = span
        .total((jiff::Unit::Second, jiff::civil::date(1970, 1, 1)))
        .with_context(|| format!("convert duration '{text}' to seconds"))?;
    Ok(seconds.max(0.0) as u32)
}

/// Drops videos below the minimum duration or outside the lookback window.
pub fn baseline_filter(
    videos: Vec<NewsVideo>,
    min_duration: u32,
    cutoff: Timestamp,
) -> Vec<NewsVideo> {
    videos
        .into_iter()
        .filter(|v| v.duration_seconds >= min_duration && v.published_at >= cutoff)
        .collect()
}

/// Applies per-channel criteria, scores the scored channels, and enforces
/// the per-channel and overall caps.
///
/// The result lists scored videos first (best score first), then
/// criteria-matched videos; when the overall cap forces trimming, scored
/// videos are trimmed before matched ones.
pub fn select_videos(videos: Vec<NewsVideo>, config: &RunConfig) -> Vec<NewsVideo> {
    let mut scored = Vec::new();
    let mut matched = Vec::new();
    for video in videos {
        let criteria = config.criteria_for(&video.channel_id);
        if criteria.is_scored() {
            scored.push(video);
        } else if criteria.matches(&video) {
            tracing::debug!(video_id = video.id, title = video.title, "criteria match");
            matched.push(video);
        }
    }

    apply_scores(&mut scored, &config.quality_keywords);
    scored.sort_by(|a, b| {
        b.total_score
            .unwrap_or(0.0)
            .total_cmp(&a.total_score.unwrap_or(0.0))
    });

    // Per-channel cap, best-scoring videos first.
    let mut per_channel: HashMap<&str, usize> = HashMap::new();
    let mut capped = Vec::new();
    for video in &scored {
        let count = per_channel.entry(video.channel_id.as_str()).or_default();
        if *count < config.max_videos_per_channel {
            *count += 1;
            capped.push(video.clone());
        }
    }
    let mut scored = capped;

    // Overall cap: matched videos survive preferentially.
    if scored.len() + matched.len() > config.max_total_videos {
        if matched.len() <= config.max_total_videos {
            scored.truncate(config.max_total_videos - matched.len());
        } else {
            scored.clear();
            matched.truncate(config.max_total_videos);
        }
    }

    scored.extend(matched);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelCriteria;
    use pretty_assertions::assert_eq;

    fn config(channels: &[&str]) -> RunConfig {
        serde_json::from_value(serde_json::json!({
            "channels": channels,
            "min_duration": 120,
            "days_back": 1,
        }))
        .unwrap()
    }

    fn video(id: &str, channel: &str, published_at: &str, duration: u32, views: u64) -> NewsVideo {
        NewsVideo {
            id: id.to_string(),
            title: format!("Video {id}"),
            description: String::new(),
            published_at: published_at.parse().unwrap(),
            channel_id: channel.to_string(),
            channel_title: channel.to_string(),
            thumbnail: None,
            duration_seconds: duration,
            duration_formatted: format_duration(duration),
            view_count: views,
            like_count: views / 20,
            comment_count: views / 200,
            tags: Vec::new(),
            hours_since_published: 2.0,
            quality_score: None,
            viral_score: None,
            total_score: None,
        }
    }

    #[test]
    fn iso8601_durations_parse_to_seconds() {
        assert_eq!(parse_iso8601_duration("PT15S").unwrap(), 15);
        assert_eq!(parse_iso8601_duration("PT9M30S").unwrap(), 570);
        assert_eq!(parse_iso8601_duration("PT1H2M3S").unwrap(), 3723);
        assert_eq!(parse_iso8601_duration("P1DT1S").unwrap(), 86_401);
        assert!(parse_iso8601_duration("not a duration").is_err());
    }

    #[test]
    fn baseline_filter_enforces_duration_and_window() {
        let cutoff: Timestamp = "2026-08-06T00:00:00Z".parse().unwrap();
        let videos = vec![
            video("keep", "c1", "2026-08-06T10:00:00Z", 300, 100),
            video("too-short", "c1", "2026-08-06T10:00:00Z", 30, 100),
            video("too-old", "c1", "2026-08-01T10:00:00Z", 300, 100),
        ];

        let kept = baseline_filter(videos, 120, cutoff);
        let ids: Vec<_> = kept.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["keep"]);
    }

    #[test]
    fn per_channel_cap_keeps_best_scoring_videos() {
        let mut cfg = config(&["c1"]);
        cfg.max_videos_per_channel = 2;

        // More views means a better viral score, all else being equal.
        let videos = vec![
            video("low", "c1", "2026-08-06T10:00:00Z", 600, 100),
            video("high", "c1", "2026-08-06T10:00:00Z", 600, 500_000),
            video("mid", "c1", "2026-08-06T10:00:00Z", 600, 1_000),
        ];

        let selected = select_videos(videos, &cfg);
        let ids: Vec<_> = selected.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
        assert!(selected.iter().all(|v| v.total_score.is_some()));
    }

    #[test]
    fn matched_channels_bypass_scoring_and_survive_the_cap() {
        let mut cfg = config(&["scored", "matched"]);
        cfg.max_total_videos = 2;
        cfg.channel_criteria.insert(
            "matched".to_string(),
            serde_json::from_value::<ChannelCriteria>(serde_json::json!({
                "mode": "matched",
                "title_keywords": ["video"],
            }))
            .unwrap(),
        );

        // s1's short runtime gives it a strictly worse length score than s2.
        let videos = vec![
            video("s1", "scored", "2026-08-06T10:00:00Z", 300, 10_000),
            video("s2", "scored", "2026-08-06T11:00:00Z", 600, 10_000),
            video("m1", "matched", "2026-08-06T12:00:00Z", 600, 5),
        ];

        let selected = select_videos(videos, &cfg);
        let ids: Vec<_> = selected.iter().map(|v| v.id.as_str()).collect();
        // The matched video is kept; the scored set is trimmed to fit.
        assert_eq!(ids, vec!["s2", "m1"]);
        assert_eq!(selected[1].total_score, None);
    }

    #[test]
    fn matched_channel_rejects_non_matching_videos() {
        let mut cfg = config(&["matched"]);
        cfg.channel_criteria.insert(
            "matched".to_string(),
            serde_json::from_value::<ChannelCriteria>(serde_json::json!({
                "mode": "matched",
                "title_keywords": ["nowhere"],
            }))
            .unwrap(),
        );

        let videos = vec![video("m1", "matched", "2026-08-06T12:00:00Z", 600, 5)];
        assert!(select_videos(videos, &cfg).is_empty());
    }
}
