//! YouTube PlaylistItems API types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::youtube_api::videos::Thumbnails;

/// A `playlistItem` resource: the association between a playlist and one
/// video, at a position.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    /// The ID that YouTube uses to uniquely identify the playlist item.
    ///
    /// This is the handle for `playlistItems.delete`, distinct from the video ID.
    pub id: String,
    /// Basic details about the item and the video it wraps.
    pub snippet: Option<PlaylistItemSnippet>,
    /// Content metadata, notably the video ID.
    pub content_details: Option<PlaylistItemContentDetails>,
}

impl PlaylistItem {
    /// The ID of the video this item points at, from whichever part carries it.
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .map(|d| d.video_id.as_str())
            .or_else(|| {
                self.snippet
                    .as_ref()
                    .map(|s| s.resource_id.video_id.as_str())
            })
    }
}

/// The `snippet` object for a playlist item.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    /// The item's title (the wrapped video's title).
    #[serde(default)]
    pub title: String,
    /// The wrapped video's description.
    #[serde(default)]
    pub description: String,
    /// When the item was added to the playlist, in ISO 8601 format.
    ///
    /// For uploads playlists this matches the video's publish time.
    pub published_at: Timestamp,
    /// The ID of the channel the playlist belongs to.
    #[serde(default)]
    pub channel_id: String,
    /// The title of that channel.
    #[serde(default)]
    pub channel_title: String,
    /// The item's zero-based position within the playlist.
    #[serde(default)]
    pub position: u32,
    /// The resource (video) the item points at.
    pub resource_id: ResourceId,
    /// Thumbnail images for the wrapped video.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// The `contentDetails` object for a playlist item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    /// The ID of the video the item points at.
    pub video_id: String,
    /// When the video was published, in ISO 8601 format.
    pub video_published_at: Option<Timestamp>,
}

/// A reference to another YouTube resource, as embedded in playlist items.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    /// The referenced resource's type; always `youtube#video` here.
    pub kind: String,
    /// The referenced video's ID.
    pub video_id: String,
}

/// Request body for `playlistItems.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
#[derive(Debug, Serialize)]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemInsertSnippet,
}

/// Snippet portion of a `playlistItems.insert` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemInsertSnippet {
    /// The playlist to insert into.
    pub playlist_id: String,
    /// The video to insert.
    pub resource_id: ResourceId,
    /// The exact position to insert at, so playlist order matches ours.
    pub position: u32,
}

impl PlaylistItemInsertRequest {
    /// Builds an insert request placing `video_id` at `position` in `playlist_id`.
    pub fn new(playlist_id: &str, video_id: &str, position: u32) -> Self {
        Self {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: video_id.to_string(),
                },
                position,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_request_serializes_to_wire_shape() {
        let request = PlaylistItemInsertRequest::new("PL123", "vid456", 3);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "snippet": {
                    "playlistId": "PL123",
                    "resourceId": {"kind": "youtube#video", "videoId": "vid456"},
                    "position": 3,
                }
            })
        );
    }

    #[test]
    fn video_id_prefers_content_details() {
        let item: PlaylistItem = serde_json::from_value(serde_json::json!({
            "id": "item1",
            "contentDetails": {"videoId": "from-details"},
            "snippet": {
                "publishedAt": "2026-08-01T06:00:00Z",
                "resourceId": {"kind": "youtube#video", "videoId": "from-snippet"},
            },
        }))
        .unwrap();
        assert_eq!(item.video_id(), Some("from-details"));
    }
}
