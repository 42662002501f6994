//! YouTube Videos API types.

use jiff::Timestamp;
use serde::Deserialize;

/// A `video` resource with the parts the aggregator hydrates: snippet,
/// content details (duration), and statistics.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// Basic details: title, description, channel, publish time, tags.
    pub snippet: VideoSnippet,
    /// Duration and other content metadata.
    pub content_details: Option<VideoContentDetails>,
    /// Engagement counters. Absent when statistics are hidden.
    pub statistics: Option<VideoStatistics>,
}

/// The `snippet` object for a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    /// The video's title.
    pub title: String,
    /// The video's description.
    #[serde(default)]
    pub description: String,
    /// The date and time that the video was published, in ISO 8601 format.
    pub published_at: Timestamp,
    /// The ID of the channel the video was uploaded to.
    pub channel_id: String,
    /// The title of that channel.
    #[serde(default)]
    pub channel_title: String,
    /// Keyword tags associated with the video.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Thumbnail images associated with the video.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// The `contentDetails` object for a video.
#[derive(Debug, Deserialize)]
pub struct VideoContentDetails {
    /// The video's length as an ISO 8601 duration, e.g. `PT1H2M3S`.
    pub duration: String,
}

/// Engagement counters for a video.
///
/// The API serializes all counters as strings.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    /// The number of times the video has been viewed.
    pub view_count: Option<String>,
    /// The number of users who have indicated that they liked the video.
    pub like_count: Option<String>,
    /// The number of comments on the video.
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    /// Parses a string-typed counter, treating absent or malformed values as 0.
    pub fn count(field: Option<&String>) -> u64 {
        field.and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

/// The set of thumbnail renditions YouTube provides for a resource.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet.thumbnails>
#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    /// The default (lowest resolution) thumbnail.
    pub default: Option<Thumbnail>,
    /// A medium resolution thumbnail.
    pub medium: Option<Thumbnail>,
    /// A high resolution thumbnail.
    pub high: Option<Thumbnail>,
}

/// A single thumbnail image.
#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    /// The image's URL.
    pub url: String,
}

impl Thumbnails {
    /// The best available rendition, preferring higher resolutions.
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}
