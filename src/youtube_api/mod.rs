//! Typed client for the subset of the YouTube Data API v3 this system uses.
//!
//! The aggregator touches four resource families:
//!
//! - [`channels`] — only to resolve a channel's uploads playlist;
//! - [`playlist_items`] — to read uploads and to clear/populate the target
//!   playlist;
//! - [`playlists`] — to create and inspect the target playlist;
//! - [`videos`] — to hydrate durations, statistics, and tags in bulk.
//!
//! All list endpoints share the [`types::ListResponse`] envelope and are
//! consumed through [`types::PagedStream`], which follows continuation
//! tokens transparently. [`client::YouTubeClient`] holds the auth material
//! (bearer token with automatic renewal, or a plain API key) and the shared
//! HTTP client.

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod playlists;
pub mod types;
pub mod videos;

pub use client::{TimeBoundAccessToken, YouTubeClient};
pub use types::{ListResponse, PageInfo, PagedStream};

pub use channels::Channel;
pub use playlist_items::{PlaylistItem, PlaylistItemInsertRequest};
pub use playlists::{Playlist, PlaylistPrivacy};
pub use videos::{VideoResource, VideoStatistics};
