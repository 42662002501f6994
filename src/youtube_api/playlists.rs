//! YouTube Playlists API types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `playlist` resource.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#resource>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// The ID that YouTube uses to uniquely identify the playlist.
    pub id: String,
    /// Basic details about the playlist.
    pub snippet: PlaylistSnippet,
    /// Content metadata, notably the item count.
    pub content_details: Option<PlaylistContentDetails>,
    /// The playlist's status (privacy).
    pub status: Option<PlaylistStatus>,
}

/// The `snippet` object for a playlist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    /// The playlist's title.
    pub title: String,
    /// The playlist's description.
    #[serde(default)]
    pub description: String,
    /// When the playlist was created, in ISO 8601 format.
    pub published_at: Option<Timestamp>,
}

/// The `contentDetails` object for a playlist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContentDetails {
    /// The number of videos in the playlist.
    pub item_count: u32,
}

/// The `status` object for a playlist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    /// The playlist's privacy status.
    pub privacy_status: PlaylistPrivacy,
}

/// A playlist's privacy setting.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#status.privacyStatus>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaylistPrivacy {
    /// Visible to anyone.
    Public,
    /// Visible only to the owner.
    #[default]
    Private,
    /// Visible to anyone with the link.
    Unlisted,
}

impl fmt::Display for PlaylistPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaylistPrivacy::Public => "public",
            PlaylistPrivacy::Private => "private",
            PlaylistPrivacy::Unlisted => "unlisted",
        };
        f.write_str(s)
    }
}

impl FromStr for PlaylistPrivacy {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(PlaylistPrivacy::Public),
            "private" => Ok(PlaylistPrivacy::Private),
            "unlisted" => Ok(PlaylistPrivacy::Unlisted),
            other => Err(eyre::eyre!(
                "invalid privacy status '{other}' (expected public, private, or unlisted)"
            )),
        }
    }
}

/// Request body for `playlists.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/insert>
#[derive(Debug, Serialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistInsertSnippet,
    pub status: PlaylistInsertStatus,
}

/// Snippet portion of a `playlists.insert` request.
#[derive(Debug, Serialize)]
pub struct PlaylistInsertSnippet {
    pub title: String,
    pub description: String,
}

/// Status portion of a `playlists.insert` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInsertStatus {
    pub privacy_status: PlaylistPrivacy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn privacy_round_trips_through_wire_format() {
        for (text, privacy) in [
            ("public", PlaylistPrivacy::Public),
            ("private", PlaylistPrivacy::Private),
            ("unlisted", PlaylistPrivacy::Unlisted),
        ] {
            assert_eq!(text.parse::<PlaylistPrivacy>().unwrap(), privacy);
            assert_eq!(
                serde_json::to_string(&privacy).unwrap(),
                format!("\"{text}\"")
            );
        }
        assert!("secret".parse::<PlaylistPrivacy>().is_err());
    }
}
