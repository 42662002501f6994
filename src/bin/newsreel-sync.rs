//! Playlist CLI: publish a snapshot into a YouTube playlist.

use eyre::Context;
use newsreel::playlist::{PlaylistTarget, sync_playlist};
use newsreel::youtube_api::PlaylistPrivacy;
use newsreel::{Credentials, build_client, snapshot};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    json_file: PathBuf,
    credentials: PathBuf,
    token_file: PathBuf,
    playlist_id: Option<String>,
    playlist_id_file: PathBuf,
    title: Option<String>,
    description: Option<String>,
    privacy: PlaylistPrivacy,
    max_per_channel: usize,
}

fn usage() -> ! {
    eprintln!(
        "usage: newsreel-sync [--json-file <file>] [--credentials <file>] [--token <file>]\n\
         \x20                   [--playlist-id <id> | --title <title> [--description <text>] [--privacy <status>]]\n\
         \x20                   [--playlist-id-file <file>] [--max-per-channel <n>]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        json_file: PathBuf::from("output/latest_news.json"),
        credentials: PathBuf::from("config/client_secret.json"),
        token_file: PathBuf::from("config/token.json"),
        playlist_id: None,
        playlist_id_file: PathBuf::from("config/playlist_id.txt"),
        title: None,
        description: None,
        privacy: PlaylistPrivacy::Private,
        max_per_channel: 5,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let Some(value) = args.next() else { usage() };
        match arg.as_str() {
            "--json-file" => parsed.json_file = PathBuf::from(value),
            "--credentials" => parsed.credentials = PathBuf::from(value),
            "--token" => parsed.token_file = PathBuf::from(value),
            "--playlist-id" => parsed.playlist_id = Some(value),
            "--playlist-id-file" => parsed.playlist_id_file = PathBuf::from(value),
            "--title" => parsed.title = Some(value),
            "--description" => parsed.description = Some(value),
            "--privacy" => match value.parse() {
                Ok(privacy) => parsed.privacy = privacy,
                Err(e) => {
                    eprintln!("{e}");
                    usage();
                }
            },
            "--max-per-channel" => match value.parse() {
                Ok(n) => parsed.max_per_channel = n,
                Err(_) => {
                    eprintln!("invalid --max-per-channel value: {value}");
                    usage();
                }
            },
            _ => usage(),
        }
    }

    // Reusing a playlist and creating one are mutually exclusive.
    if parsed.playlist_id.is_some()
        && (parsed.title.is_some() || parsed.description.is_some())
    {
        eprintln!("--playlist-id cannot be combined with --title/--description");
        usage();
    }

    parsed
}

/// Picks the sync target: an explicit id, explicit creation metadata, the
/// stored id from a previous run, or first-run creation.
fn resolve_target(args: &Args) -> PlaylistTarget {
    if let Some(id) = &args.playlist_id {
        return PlaylistTarget::Existing(id.clone());
    }
    if args.title.is_some() || args.description.is_some() {
        return PlaylistTarget::Create {
            title: args.title.clone(),
            description: args.description.clone(),
            privacy: args.privacy,
        };
    }
    match read_playlist_id(&args.playlist_id_file) {
        Some(id) => PlaylistTarget::Existing(id),
        None => {
            tracing::info!(
                path = %args.playlist_id_file.display(),
                "no stored playlist id, creating a new playlist"
            );
            PlaylistTarget::Create {
                title: None,
                description: None,
                privacy: args.privacy,
            }
        }
    }
}

fn read_playlist_id(path: &Path) -> Option<String> {
    let id = std::fs::read_to_string(path).ok()?;
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let args = parse_args();

    let videos = snapshot::read_snapshot(&args.json_file)
        .context("load snapshot to publish; did the aggregation step run?")?;
    if videos.is_empty() {
        eyre::bail!("snapshot {} contains no videos", args.json_file.display());
    }
    tracing::info!(videos = videos.len(), "loaded snapshot");

    let credentials = Credentials::from_file(&args.credentials, &args.token_file)
        .context("load credentials")?;
    let yt = build_client(&credentials).await?;

    let target = resolve_target(&args);
    let created = matches!(target, PlaylistTarget::Create { .. });
    let outcome = sync_playlist(&yt, target, videos, args.max_per_channel).await?;

    if created {
        if let Some(parent) = args.playlist_id_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(&args.playlist_id_file, format!("{}\n", outcome.playlist_id))
            .with_context(|| {
                format!(
                    "store playlist id in {}",
                    args.playlist_id_file.display()
                )
            })?;
        tracing::info!(
            playlist_id = outcome.playlist_id,
            path = %args.playlist_id_file.display(),
            "stored new playlist id"
        );
    }

    Ok(())
}
