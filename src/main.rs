//! Pipeline orchestrator: fetch and snapshot recent videos, then publish
//! them into the news playlist, in one process.

use eyre::Context;
use jiff::Timestamp;
use newsreel::playlist::{PlaylistTarget, sync_playlist};
use newsreel::youtube_api::PlaylistPrivacy;
use newsreel::{Credentials, RunConfig, build_client, fetcher, snapshot};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    config: PathBuf,
    credentials: PathBuf,
    token_file: PathBuf,
    playlist_id_file: PathBuf,
    skip_fetch: bool,
    skip_update: bool,
}

fn usage() -> ! {
    eprintln!(
        "usage: newsreel [--config <file>] [--credentials <file>] [--token <file>]\n\
         \x20               [--playlist-id-file <file>] [--skip-fetch] [--skip-update]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config: PathBuf::from("config/news_config.json"),
        credentials: PathBuf::from("config/service-account.json"),
        token_file: PathBuf::from("config/token.json"),
        playlist_id_file: PathBuf::from("config/playlist_id.txt"),
        skip_fetch: false,
        skip_update: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--skip-fetch" => parsed.skip_fetch = true,
            "--skip-update" => parsed.skip_update = true,
            "--config" => match args.next() {
                Some(value) => parsed.config = PathBuf::from(value),
                None => usage(),
            },
            "--credentials" => match args.next() {
                Some(value) => parsed.credentials = PathBuf::from(value),
                None => usage(),
            },
            "--token" => match args.next() {
                Some(value) => parsed.token_file = PathBuf::from(value),
                None => usage(),
            },
            "--playlist-id-file" => match args.next() {
                Some(value) => parsed.playlist_id_file = PathBuf::from(value),
                None => usage(),
            },
            _ => usage(),
        }
    }
    parsed
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
    let config = RunConfig::load(&args.config)?;

    if args.skip_fetch {
        tracing::info!("skipping fetch step");
    } else {
        tracing::info!("step 1/2: fetching and scoring videos");

        // Fetching is read-only; prefer the API key when the config has one
        // and fall back to the credentials file otherwise.
        let credentials = match &config.api_key {
            Some(key) => Credentials::ApiKey(key.clone()),
            None => Credentials::from_file(&args.credentials, &args.token_file)
                .context("load credentials for fetch")?,
        };
        let yt = build_client(&credentials).await?;

        let videos = fetcher::collect_news_videos(&yt, &config, Timestamp::now()).await?;
        snapshot::write_snapshot(&config.output_dir, &videos)?;
        snapshot::report_changes(&config.output_dir, &videos);
    }

    if args.skip_update {
        tracing::info!("skipping playlist update step");
    } else {
        tracing::info!("step 2/2: updating the playlist");

        let json_path = config.output_dir.join(snapshot::LATEST_JSON);
        if !json_path.exists() {
            eyre::bail!(
                "snapshot {} not found; run the fetch step first",
                json_path.display()
            );
        }
        let videos = snapshot::read_snapshot(&json_path)?;
        if videos.is_empty() {
            eyre::bail!("snapshot {} contains no videos", json_path.display());
        }

        let credentials = Credentials::from_file(&args.credentials, &args.token_file)
            .context("load credentials for playlist update")?;
        let yt = build_client(&credentials).await?;

        let stored_id = std::fs::read_to_string(&args.playlist_id_file)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let target = match stored_id {
            Some(id) => PlaylistTarget::Existing(id),
            None => {
                tracing::info!("first run: no stored playlist id, creating the playlist");
                PlaylistTarget::Create {
                    title: None,
                    description: None,
                    privacy: PlaylistPrivacy::Private,
                }
            }
        };
        let created = matches!(target, PlaylistTarget::Create { .. });

        let outcome =
            sync_playlist(&yt, target, videos, config.max_videos_per_channel).await?;

        if created {
            if let Some(parent) = args.playlist_id_file.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            std::fs::write(&args.playlist_id_file, format!("{}\n", outcome.playlist_id))
                .with_context(|| {
                    format!("store playlist id in {}", args.playlist_id_file.display())
                })?;
        }
    }

    tracing::info!("pipeline completed successfully");
    Ok(())
}
