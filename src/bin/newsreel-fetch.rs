//! Aggregator CLI: fetch, select, and snapshot recent news videos.

use eyre::Context;
use jiff::Timestamp;
use newsreel::{Credentials, RunConfig, build_client, fetcher, snapshot};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_TOKEN_FILE: &str = "config/token.json";

#[derive(Debug)]
struct Args {
    config: PathBuf,
    json_file: Option<PathBuf>,
    credentials: Option<PathBuf>,
    days_back: Option<u32>,
    now: Option<Timestamp>,
}

fn usage() -> ! {
    eprintln!(
        "usage: newsreel-fetch --load-config <file> [--json-file <file>] \
         [--credentials <file>] [--days-back <days>] [--now [<rfc3339>]]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut config = None;
    let mut json_file = None;
    let mut credentials = None;
    let mut days_back = None;
    let mut now = None;

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--load-config" => config = args.next().map(PathBuf::from),
            "--json-file" => json_file = args.next().map(PathBuf::from),
            "--credentials" => credentials = args.next().map(PathBuf::from),
            "--days-back" => {
                let Some(value) = args.next() else { usage() };
                match value.parse() {
                    Ok(days) => days_back = Some(days),
                    Err(_) => {
                        eprintln!("invalid --days-back value: {value}");
                        usage();
                    }
                }
            }
            "--now" => {
                // Takes an optional RFC 3339 value; bare --now means wall clock.
                if args.peek().is_some_and(|next| !next.starts_with("--")) {
                    let value = args.next().expect("peeked");
                    match value.parse() {
                        Ok(ts) => now = Some(ts),
                        Err(_) => {
                            eprintln!("invalid --now value: {value}");
                            usage();
                        }
                    }
                } else {
                    now = Some(Timestamp::now());
                }
            }
            _ => usage(),
        }
    }

    let Some(config) = config else {
        eprintln!("--load-config is required");
        usage();
    };
    Args {
        config,
        json_file,
        credentials,
        days_back,
        now,
    }
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

    let mut config = RunConfig::load(&args.config)?;
    if let Some(days_back) = args.days_back {
        config.days_back = days_back;
    }
    if let Some(json_file) = &args.json_file {
        if let Some(parent) = json_file.parent() {
            config.output_dir = parent.to_path_buf();
        }
    }

    let credentials = match (&args.credentials, &config.api_key) {
        (Some(path), _) => Credentials::from_file(path, std::path::Path::new(DEFAULT_TOKEN_FILE))
            .context("load credentials")?,
        (None, Some(key)) => Credentials::ApiKey(key.clone()),
        (None, None) => {
            eyre::bail!("either an API key in the config or --credentials must be provided")
        }
    };
    let yt = build_client(&credentials).await?;

    let now = args.now.unwrap_or_else(Timestamp::now);
    let videos = fetcher::collect_news_videos(&yt, &config, now).await?;

    snapshot::write_snapshot(&config.output_dir, &videos)?;
    snapshot::report_changes(&config.output_dir, &videos);

    Ok(())
}
