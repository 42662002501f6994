//! Pulls recent videos from a fixed set of YouTube channels, selects the
//! ones worth watching, and publishes them into a YouTube playlist, keeping
//! a JSON/HTML snapshot in sync.
//!
//! The pipeline runs once per scheduled invocation:
//!
//! 1. [`auth`] turns a credential file (OAuth client/token pair, service
//!    account key, or API key) into an authenticated client;
//! 2. [`fetcher`] scans each channel's uploads, hydrates details, and
//!    selects videos via [`config`]-driven criteria and [`score`] ranking;
//! 3. [`snapshot`] persists the selection and reports changes against the
//!    previous run;
//! 4. [`playlist`] clears and repopulates the target playlist.

use eyre::Context;
use std::path::{Path, PathBuf};

pub mod auth;
pub mod config;
pub mod fetcher;
pub mod playlist;
pub mod score;
pub mod snapshot;
pub mod youtube_api;

pub use config::RunConfig;
pub use snapshot::NewsVideo;
pub use youtube_api::YouTubeClient;

use auth::{OAuthManager, ServiceAccountKey, TokenBroker};
use youtube_api::TimeBoundAccessToken;

/// A source of API credentials, as supplied on the command line or in CI.
#[derive(Debug)]
pub enum Credentials {
    /// Plain API key; read-only endpoints only.
    ApiKey(String),
    /// OAuth client secrets plus a token file that is created or refreshed
    /// as needed.
    OAuth {
        client_secrets: PathBuf,
        token_file: PathBuf,
    },
    /// Service-account key for non-interactive runs.
    ServiceAccount { key_file: PathBuf },
}

impl Credentials {
    /// Classifies a credentials file by its JSON shape: service-account
    /// keys carry `"type": "service_account"`, installed-app OAuth secrets
    /// an `"installed"` object.
    ///
    /// `token_file` is where OAuth tokens are stored between runs; it is
    /// ignored for service accounts.
    pub fn from_file(path: &Path, token_file: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read credentials file {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("parse credentials file {}", path.display()))?;

        if value.get("type").and_then(|t| t.as_str()) == Some("service_account") {
            Ok(Credentials::ServiceAccount {
                key_file: path.to_path_buf(),
            })
        } else if value.get("installed").is_some() {
            Ok(Credentials::OAuth {
                client_secrets: path.to_path_buf(),
                token_file: token_file.to_path_buf(),
            })
        } else {
            eyre::bail!(
                "credentials file {} is neither a service account key nor OAuth client secrets",
                path.display()
            );
        }
    }
}

/// Builds an authenticated [`YouTubeClient`] from a credential source.
///
/// Credential files are read before any network I/O, so a missing file
/// aborts the run immediately. A single failed authentication attempt is
/// fatal; there is no retry.
///
/// For OAuth credentials, a stored token is refreshed proactively so the
/// run starts with a full token lifetime; when no stored token exists (or
/// the refresh grant was revoked) the interactive browser flow runs and the
/// resulting token is written to the token file for the next run.
pub async fn build_client(credentials: &Credentials) -> eyre::Result<YouTubeClient> {
    match credentials {
        Credentials::ApiKey(key) => Ok(YouTubeClient::with_api_key(key.clone())),
        Credentials::ServiceAccount { key_file } => {
            let key = ServiceAccountKey::from_file(key_file)?;
            let token = key
                .mint_token()
                .await
                .context("authenticate service account")?;
            Ok(YouTubeClient::with_token(
                TimeBoundAccessToken::fresh(token),
                TokenBroker::ServiceAccount(key),
            ))
        }
        Credentials::OAuth {
            client_secrets,
            token_file,
        } => {
            let manager = OAuthManager::from_client_secrets(client_secrets)?;

            let stored = match std::fs::read_to_string(token_file) {
                Ok(raw) => Some(
                    serde_json::from_str::<oauth2::basic::BasicTokenResponse>(&raw)
                        .with_context(|| format!("parse token file {}", token_file.display()))?,
                ),
                Err(_) => None,
            };

            let token = match stored {
                Some(stored) => {
                    // Stored tokens are treated as expired so the run starts
                    // from a freshly refreshed one.
                    let mut token = TimeBoundAccessToken::expired(stored);
                    if token
                        .renew(&TokenBroker::OAuth(manager.clone()))
                        .await
                        .context("refresh stored OAuth token")?
                    {
                        token
                    } else {
                        tracing::warn!("token refresh failed, re-running the authorization flow");
                        let fresh = manager
                            .authenticate()
                            .await
                            .context("authorize user to YouTube")?;
                        TimeBoundAccessToken::fresh(fresh)
                    }
                }
                None => {
                    tracing::info!("no stored token, running the authorization flow");
                    let fresh = manager
                        .authenticate()
                        .await
                        .context("authorize user to YouTube")?;
                    TimeBoundAccessToken::fresh(fresh)
                }
            };

            let json = serde_json::to_string(token.raw_token())
                .context("serialize OAuth token for storage")?;
            if let Some(parent) = token_file.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            std::fs::write(token_file, json)
                .with_context(|| format!("write token file {}", token_file.display()))?;
            tracing::debug!(path = %token_file.display(), "stored refreshed OAuth token");

            Ok(YouTubeClient::with_token(
                token,
                TokenBroker::OAuth(manager),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_credentials_by_shape() {
        let dir = tempfile::tempdir().unwrap();
        let dir = dir.path();

        let sa = dir.join("service-account.json");
        std::fs::write(
            &sa,
            r#"{"type": "service_account", "client_email": "a@b", "private_key": "k"}"#,
        )
        .unwrap();
        let oauth = dir.join("client_secret.json");
        std::fs::write(
            &oauth,
            r#"{"installed": {"client_id": "id", "client_secret": "secret"}}"#,
        )
        .unwrap();

        let token_file = dir.join("token.json");
        assert!(matches!(
            Credentials::from_file(&sa, &token_file).unwrap(),
            Credentials::ServiceAccount { .. }
        ));
        assert!(matches!(
            Credentials::from_file(&oauth, &token_file).unwrap(),
            Credentials::OAuth { .. }
        ));
    }

    #[test]
    fn missing_credentials_file_is_an_error() {
        let err = Credentials::from_file(
            Path::new("/nonexistent/creds.json"),
            Path::new("/nonexistent/token.json"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("creds.json"));
    }
}
