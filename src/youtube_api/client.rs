//! Core YouTube API client: authentication plumbing and the REST endpoints
//! the aggregator uses.

use crate::auth::TokenBroker;
use crate::youtube_api::{
    channels::Channel,
    playlist_items::{PlaylistItem, PlaylistItemInsertRequest},
    playlists::{
        Playlist, PlaylistInsertRequest, PlaylistInsertSnippet, PlaylistInsertStatus,
        PlaylistPrivacy,
    },
    types::{ListResponse, PagedStream},
    videos::VideoResource,
};
use eyre::Context;
use http::Method;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio_stream::Stream;
use tracing::instrument;

const CHANNELS_URL: &str = "https://www.googleapis.com/youtube/v3/channels";
const PLAYLISTS_URL: &str = "https://www.googleapis.com/youtube/v3/playlists";
const PLAYLIST_ITEMS_URL: &str = "https://www.googleapis.com/youtube/v3/playlistItems";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// The API caps `maxResults` and the number of IDs per `videos.list` call at 50.
const PAGE_SIZE: u32 = 50;

/// An access token together with the instant it stops being trustworthy.
///
/// Expiry is taken from the token's `expires_in` minus a 5-minute safety
/// buffer, so a token is renewed before the API would start rejecting it.
#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    token: BasicTokenResponse,
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    /// Wraps a token that is considered already expired, forcing a renewal
    /// before first use. Used for tokens loaded from storage.
    pub fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: SystemTime::UNIX_EPOCH,
            token,
        }
    }

    /// Wraps a freshly issued token, computing its expiry instant.
    pub fn fresh(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::expiry_of(&token),
            token,
        }
    }

    pub fn raw_token(&self) -> &BasicTokenResponse {
        &self.token
    }

    /// Renews this token through the broker, preserving the refresh token if
    /// the authorization server omits it from the renewal response.
    ///
    /// Returns `Ok(false)` when the broker cannot renew (e.g. the grant was
    /// revoked), in which case the caller must re-authenticate.
    pub async fn renew(&mut self, broker: &TokenBroker) -> eyre::Result<bool> {
        tracing::trace!("renewing access token");
        match broker
            .renew(self.token.clone())
            .await
            .context("renew access token")?
        {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);
                if self.token.refresh_token().is_none() {
                    tracing::trace!("renewal response lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                }
                self.expires_at = Self::expiry_of(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn expiry_of(token: &BasicTokenResponse) -> SystemTime {
        let now = SystemTime::now();
        if let Some(expires_in) = token.expires_in() {
            now + expires_in - Duration::from_secs(300)
        } else {
            // No expires_in; assume the usual hour minus the buffer.
            now + Duration::from_secs(3300)
        }
    }
}

/// How a [`YouTubeClient`] authenticates its requests.
#[derive(Debug, Clone)]
enum RequestAuth {
    /// Bearer token renewed through a [`TokenBroker`] (OAuth or service account).
    Bearer {
        token: Arc<Mutex<TimeBoundAccessToken>>,
        broker: Arc<TokenBroker>,
    },
    /// Plain API key appended as a `key` query parameter. Read-only.
    ApiKey(String),
}

/// Client for the subset of the YouTube Data API v3 this system calls.
///
/// Requests authenticate either with a bearer token (renewed automatically
/// before each call once it nears expiry) or with a plain API key, which the
/// API accepts for read-only endpoints only.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    auth: RequestAuth,
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Creates a client that authenticates with a bearer token renewed
    /// through `broker`.
    pub fn with_token(token: TimeBoundAccessToken, broker: TokenBroker) -> Self {
        Self {
            auth: RequestAuth::Bearer {
                token: Arc::new(Mutex::new(token)),
                broker: Arc::new(broker),
            },
            client: reqwest::Client::new(),
        }
    }

    /// Creates a read-only client that authenticates with an API key.
    pub fn with_api_key(key: String) -> Self {
        Self {
            auth: RequestAuth::ApiKey(key),
            client: reqwest::Client::new(),
        }
    }

    /// Returns a clone of the current bearer token, for persisting back to
    /// token storage. `None` for API-key clients.
    pub async fn token(&self) -> Option<BasicTokenResponse> {
        match &self.auth {
            RequestAuth::Bearer { token, .. } => Some(token.lock().await.token.clone()),
            RequestAuth::ApiKey(_) => None,
        }
    }

    /// Gets a guaranteed-fresh access token, renewing it first if it is
    /// within the expiry buffer.
    async fn fresh_access_token(
        &self,
        token: &Mutex<TimeBoundAccessToken>,
        broker: &TokenBroker,
    ) -> eyre::Result<String> {
        let mut token = token.lock().await;
        if SystemTime::now() >= token.expires_at {
            tracing::debug!("access token expired, attempting renewal");
            if !token.renew(broker).await? {
                tracing::error!("access token renewal failed, client is unusable");
                return Err(eyre::eyre!("unable to renew expired access token"));
            }
        }
        Ok(token.token.access_token().secret().to_string())
    }

    /// Makes an authenticated request to the YouTube API with shared error
    /// handling: auth material, query parameters, optional JSON body, and
    /// status validation.
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    async fn request(
        &self,
        method: Method,
        url: &str,
        query_params: &[(&str, &str)],
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<reqwest::Response> {
        let mut request = self.client.request(method.clone(), url).query(query_params);

        match &self.auth {
            RequestAuth::Bearer { token, broker } => {
                let access_token = self.fresh_access_token(token, broker).await?;
                request = request.header("Authorization", format!("Bearer {access_token}"));
            }
            RequestAuth::ApiKey(key) => {
                request = request.query(&[("key", key.as_str())]);
            }
        }

        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {method} request to YouTube API: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "YouTube API {method} request failed with status {status}: {error_text}"
            ));
        }

        Ok(response)
    }

    /// Resolves a channel's uploads playlist via `channels.list
    /// part=contentDetails`.
    ///
    /// Returns `None` when the channel does not exist or has no uploads
    /// playlist.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn uploads_playlist_for_channel(
        &self,
        channel_id: &str,
    ) -> eyre::Result<Option<String>> {
        let query_params = [("part", "contentDetails"), ("id", channel_id)];
        let response = self
            .request(Method::GET, CHANNELS_URL, &query_params, None::<&()>)
            .await?;

        let channels: ListResponse<Channel> = response
            .json()
            .await
            .context("parse YouTube channels API response as JSON")?;

        let uploads = channels
            .items
            .front()
            .and_then(|channel| channel.uploads_playlist())
            .map(str::to_string);

        tracing::debug!(channel_id, uploads = ?uploads, "resolved uploads playlist");
        Ok(uploads)
    }

    /// Returns a paginated stream of the items in a playlist, in playlist
    /// order.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub fn list_playlist_items<'a>(
        &'a self,
        playlist_id: &str,
    ) -> impl Stream<Item = eyre::Result<PlaylistItem>> + use<'a> {
        let playlist_id = playlist_id.to_string();
        PagedStream::new(move |page_token| {
            let playlist_id = playlist_id.clone();
            async move {
                let response = self.list_playlist_items_page(&playlist_id, page_token).await?;
                Ok((response.items, response.next_page_token))
            }
        })
    }

    async fn list_playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> eyre::Result<ListResponse<PlaylistItem>> {
        let max_results = PAGE_SIZE.to_string();
        let mut query_params = vec![
            ("part", "id,snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .request(Method::GET, PLAYLIST_ITEMS_URL, &query_params, None::<&()>)
            .await?;

        let items: ListResponse<PlaylistItem> = response
            .json()
            .await
            .context("parse YouTube playlistItems API response as JSON")?;

        tracing::debug!(
            playlist_id,
            returned_items = items.items.len(),
            "fetched playlist items page"
        );

        Ok(items)
    }

    /// Inserts a video into a playlist at an exact position via
    /// `playlistItems.insert`.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
    #[instrument(skip(self))]
    pub async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: u32,
    ) -> eyre::Result<PlaylistItem> {
        let body = PlaylistItemInsertRequest::new(playlist_id, video_id, position);
        let query_params = [("part", "snippet")];

        let response = self
            .request(Method::POST, PLAYLIST_ITEMS_URL, &query_params, Some(&body))
            .await?;

        let item: PlaylistItem = response
            .json()
            .await
            .context("parse YouTube playlistItems insert response as JSON")?;

        tracing::debug!(playlist_id, video_id, position, "inserted playlist item");
        Ok(item)
    }

    /// Deletes a playlist item (by item ID, not video ID) via
    /// `playlistItems.delete`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/delete>
    #[instrument(skip(self))]
    pub async fn delete_playlist_item(&self, item_id: &str) -> eyre::Result<()> {
        let query_params = [("id", item_id)];
        // A successful delete returns 204 with no body.
        self.request(Method::DELETE, PLAYLIST_ITEMS_URL, &query_params, None::<&()>)
            .await?;
        tracing::debug!(item_id, "deleted playlist item");
        Ok(())
    }

    /// Creates a playlist via `playlists.insert` and returns it.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/insert>
    #[instrument(skip(self))]
    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PlaylistPrivacy,
    ) -> eyre::Result<Playlist> {
        let body = PlaylistInsertRequest {
            snippet: PlaylistInsertSnippet {
                title: title.to_string(),
                description: description.to_string(),
            },
            status: PlaylistInsertStatus {
                privacy_status: privacy,
            },
        };
        let query_params = [("part", "snippet,status")];

        let response = self
            .request(Method::POST, PLAYLISTS_URL, &query_params, Some(&body))
            .await?;

        let playlist: Playlist = response
            .json()
            .await
            .context("parse YouTube playlists insert response as JSON")?;

        tracing::info!(playlist_id = playlist.id, title, "created playlist");
        Ok(playlist)
    }

    /// Fetches a playlist by ID via `playlists.list`, or `None` when it does
    /// not exist or is not accessible.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/list>
    #[instrument(skip(self))]
    pub async fn get_playlist(&self, playlist_id: &str) -> eyre::Result<Option<Playlist>> {
        let query_params = [
            ("part", "snippet,contentDetails,status"),
            ("id", playlist_id),
        ];
        let response = self
            .request(Method::GET, PLAYLISTS_URL, &query_params, None::<&()>)
            .await?;

        let playlists: ListResponse<Playlist> = response
            .json()
            .await
            .context("parse YouTube playlists API response as JSON")?;

        Ok(playlists.items.into_iter().next())
    }

    /// Fetches snippet, duration, and statistics for a set of videos via
    /// `videos.list`, batching IDs to respect the API's 50-per-call limit.
    ///
    /// Videos the API does not return (deleted, private) are silently absent
    /// from the result.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self, video_ids), fields(requested = video_ids.len()))]
    pub async fn get_video_details(
        &self,
        video_ids: &[String],
    ) -> eyre::Result<Vec<VideoResource>> {
        let mut details = Vec::with_capacity(video_ids.len());

        for batch in video_ids.chunks(PAGE_SIZE as usize) {
            let ids = batch.join(",");
            let query_params = [
                ("part", "snippet,contentDetails,statistics"),
                ("id", ids.as_str()),
            ];

            let response = self
                .request(Method::GET, VIDEOS_URL, &query_params, None::<&()>)
                .await?;

            let videos: ListResponse<VideoResource> = response
                .json()
                .await
                .context("parse YouTube videos API response as JSON")?;

            details.extend(videos.items);
        }

        tracing::debug!(returned_items = details.len(), "hydrated video details");
        Ok(details)
    }
}
