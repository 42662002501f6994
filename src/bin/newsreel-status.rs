//! Read-only check of the target playlist's state.

use eyre::Context;
use newsreel::{Credentials, build_client};
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    credentials: PathBuf,
    token_file: PathBuf,
    playlist_id: Option<String>,
    playlist_id_file: PathBuf,
}

fn usage() -> ! {
    eprintln!(
        "usage: newsreel-status [--credentials <file>] [--token <file>] \
         [--playlist-id <id>] [--playlist-id-file <file>]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        credentials: PathBuf::from("config/client_secret.json"),
        token_file: PathBuf::from("config/token.json"),
        playlist_id: None,
        playlist_id_file: PathBuf::from("config/playlist_id.txt"),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let Some(value) = args.next() else { usage() };
        match arg.as_str() {
            "--credentials" => parsed.credentials = PathBuf::from(value),
            "--token" => parsed.token_file = PathBuf::from(value),
            "--playlist-id" => parsed.playlist_id = Some(value),
            "--playlist-id-file" => parsed.playlist_id_file = PathBuf::from(value),
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
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let args = parse_args();

    let playlist_id = match &args.playlist_id {
        Some(id) => id.clone(),
        None => std::fs::read_to_string(&args.playlist_id_file)
            .map(|s| s.trim().to_string())
            .with_context(|| {
                format!(
                    "no --playlist-id given and no id file at {}",
                    args.playlist_id_file.display()
                )
            })?,
    };
    if playlist_id.is_empty() {
        eyre::bail!("no playlist id provided");
    }

    let credentials = Credentials::from_file(&args.credentials, &args.token_file)
        .context("load credentials")?;
    let yt = build_client(&credentials).await?;

    let Some(playlist) = yt.get_playlist(&playlist_id).await? else {
        eprintln!("Playlist {playlist_id} not found or not accessible");
        std::process::exit(1);
    };

    println!("Playlist information:");
    println!("  Title: {}", playlist.snippet.title);
    if let Some(status) = &playlist.status {
        println!("  Privacy: {}", status.privacy_status);
    }
    if let Some(details) = &playlist.content_details {
        println!("  Video count: {}", details.item_count);
    }
    println!("  URL: https://www.youtube.com/playlist?list={playlist_id}");

    println!("\nLatest videos in playlist:");
    let items = yt.list_playlist_items(&playlist_id);
    let mut items = std::pin::pin!(items.take(5));
    while let Some(item) = items.next().await {
        let item = item.context("fetch playlist item")?;
        if let Some(snippet) = &item.snippet {
            println!("  - {}", snippet.title);
        }
    }

    Ok(())
}
