//! YouTube Channels API types.

use serde::Deserialize;

/// A `channel` resource, reduced to the parts this system requests.
///
/// The aggregator only needs a channel's uploads playlist, which lives under
/// `contentDetails.relatedPlaylists.uploads`.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    /// Information about the channel's associated system playlists.
    pub content_details: Option<ChannelContentDetails>,
}

/// The `contentDetails` object for a channel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    /// Playlists associated with the channel, such as its uploads.
    pub related_playlists: RelatedPlaylists,
}

/// System playlists YouTube maintains for every channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#contentDetails.relatedPlaylists>
#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    /// The playlist that contains the channel's uploaded videos.
    ///
    /// Absent for channels that have never uploaded anything.
    pub uploads: Option<String>,
}

impl Channel {
    /// The channel's uploads playlist ID, if it has one.
    pub fn uploads_playlist(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|details| details.related_playlists.uploads.as_deref())
    }
}
