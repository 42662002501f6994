//! Reconciles the target playlist with the selected video set.
//!
//! A sync pass is destructive and non-transactional: existing items are
//! deleted wholesale, then the new set is inserted in order. A failure
//! mid-pass leaves the playlist partially cleared or partially populated;
//! both phases log the error and report how far they got, and the next
//! scheduled run repairs the state.

use jiff::Timestamp;
use std::collections::HashMap;
use tokio_stream::StreamExt;

use crate::snapshot::NewsVideo;
use crate::youtube_api::{PlaylistPrivacy, YouTubeClient};

/// Where a sync pass should publish.
#[derive(Debug)]
pub enum PlaylistTarget {
    /// Reuse (and first clear) an existing playlist.
    Existing(String),
    /// Create a new playlist and publish into it.
    Create {
        title: Option<String>,
        description: Option<String>,
        privacy: PlaylistPrivacy,
    },
}

/// What a sync pass did.
#[derive(Debug)]
pub struct SyncOutcome {
    /// The playlist that was published to (created if none was given).
    pub playlist_id: String,
    /// How many stale items were removed.
    pub cleared: u32,
    /// How many of the candidates were inserted.
    pub added: u32,
}

/// Publishes `videos` into the target playlist.
///
/// Existing targets are cleared first; absent targets are created with the
/// supplied (or dated default) metadata. Candidates are capped per channel
/// and inserted newest-first with sequential positions.
pub async fn sync_playlist(
    yt: &YouTubeClient,
    target: PlaylistTarget,
    videos: Vec<NewsVideo>,
    max_per_channel: usize,
) -> eyre::Result<SyncOutcome> {
    let (playlist_id, cleared) = match target {
        PlaylistTarget::Existing(id) => {
            let cleared = clear_playlist(yt, &id).await;
            (id, cleared)
        }
        PlaylistTarget::Create {
            title,
            description,
            privacy,
        } => {
            let today = Timestamp::now().strftime("%Y-%m-%d").to_string();
            let title = title.unwrap_or_else(|| format!("News Feed {today}"));
            let description = description
                .unwrap_or_else(|| format!("Auto-generated news playlist created on {today}"));
            let playlist = yt.create_playlist(&title, &description, privacy).await?;
            (playlist.id, 0)
        }
    };

    let ordered = order_for_playlist(videos, max_per_channel);
    let added = add_videos(yt, &playlist_id, &ordered).await;

    tracing::info!(
        playlist_id,
        cleared,
        added,
        candidates = ordered.len(),
        url = format!("https://www.youtube.com/playlist?list={playlist_id}"),
        "playlist sync finished"
    );
    log_channel_breakdown(&ordered[..added as usize]);

    Ok(SyncOutcome {
        playlist_id,
        cleared,
        added,
    })
}

/// Removes every item from a playlist, returning how many were deleted.
///
/// An API error mid-clear is logged and the partial count returned; the
/// playlist is left however far the clear got.
pub async fn clear_playlist(yt: &YouTubeClient, playlist_id: &str) -> u32 {
    let items = yt.list_playlist_items(playlist_id);
    let mut items = std::pin::pin!(items);
    let mut deleted = 0;
    while let Some(item) = items.next().await {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::error!(playlist_id, "failed to list playlist items: {e:#}");
                return deleted;
            }
        };
        if let Err(e) = yt.delete_playlist_item(&item.id).await {
            tracing::error!(
                playlist_id,
                item_id = item.id,
                "failed to delete playlist item: {e:#}"
            );
            return deleted;
        }
        deleted += 1;
    }
    tracing::info!(playlist_id, deleted, "cleared playlist");
    deleted
}

/// Inserts `videos` into the playlist in order, position by position,
/// returning how many made it.
///
/// An API error mid-insert is logged and the partial count returned.
pub async fn add_videos(yt: &YouTubeClient, playlist_id: &str, videos: &[NewsVideo]) -> u32 {
    let mut added = 0;
    for video in videos {
        match yt.insert_playlist_item(playlist_id, &video.id, added).await {
            Ok(_) => {
                tracing::info!(
                    video_id = video.id,
                    title = video.title,
                    position = added,
                    "added video to playlist"
                );
                added += 1;
            }
            Err(e) => {
                tracing::error!(
                    playlist_id,
                    video_id = video.id,
                    "failed to insert playlist item: {e:#}"
                );
                return added;
            }
        }
    }
    added
}

/// Orders candidates for publishing: within each channel the best-scoring
/// videos up to the cap are kept, then the survivors are sorted
/// newest-first.
pub fn order_for_playlist(videos: Vec<NewsVideo>, max_per_channel: usize) -> Vec<NewsVideo> {
    let mut by_channel: HashMap<String, Vec<NewsVideo>> = HashMap::new();
    for video in videos {
        by_channel
            .entry(video.channel_id.clone())
            .or_default()
            .push(video);
    }

    let mut kept = Vec::new();
    for (_, mut channel_videos) in by_channel {
        channel_videos.sort_by(|a, b| {
            b.total_score
                .unwrap_or(0.0)
                .total_cmp(&a.total_score.unwrap_or(0.0))
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        channel_videos.truncate(max_per_channel);
        kept.extend(channel_videos);
    }

    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    kept
}

fn log_channel_breakdown(published: &[NewsVideo]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for video in published {
        *counts.entry(video.channel_title.as_str()).or_default() += 1;
    }
    for (channel, count) in counts {
        tracing::info!(channel, count, "videos per channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn video(id: &str, channel: &str, published_at: &str, score: f64) -> NewsVideo {
        NewsVideo {
            id: id.to_string(),
            title: format!("Video {id}"),
            description: String::new(),
            published_at: published_at.parse().unwrap(),
            channel_id: channel.to_string(),
            channel_title: channel.to_string(),
            thumbnail: None,
            duration_seconds: 600,
            duration_formatted: "10:00".to_string(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            tags: Vec::new(),
            hours_since_published: 1.0,
            quality_score: None,
            viral_score: None,
            total_score: Some(score),
        }
    }

    #[test]
    fn orders_newest_first_after_capping() {
        let videos = vec![
            video("a-old", "a", "2026-08-05T08:00:00Z", 0.9),
            video("a-new", "a", "2026-08-06T08:00:00Z", 0.8),
            video("b-mid", "b", "2026-08-05T20:00:00Z", 0.5),
        ];

        let ordered = order_for_playlist(videos, 5);
        let ids: Vec<_> = ordered.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a-new", "b-mid", "a-old"]);
    }

    #[test]
    fn per_channel_cap_drops_worst_scores() {
        let videos = vec![
            video("a1", "a", "2026-08-06T06:00:00Z", 0.9),
            video("a2", "a", "2026-08-06T07:00:00Z", 0.2),
            video("a3", "a", "2026-08-06T08:00:00Z", 0.7),
            video("b1", "b", "2026-08-06T09:00:00Z", 0.1),
        ];

        let ordered = order_for_playlist(videos, 2);
        let mut ids: Vec<_> = ordered.iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        // a2 has the worst score of channel a's three candidates.
        assert_eq!(ids, vec!["a1", "a3", "b1"]);
    }

    #[test]
    fn unscored_videos_fall_back_to_publish_time() {
        let mut videos = vec![
            video("old", "a", "2026-08-05T08:00:00Z", 0.0),
            video("new", "a", "2026-08-06T08:00:00Z", 0.0),
        ];
        for v in &mut videos {
            v.total_score = None;
        }

        let ordered = order_for_playlist(videos, 1);
        let ids: Vec<_> = ordered.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }
}
