//! Snapshot artifacts: the selected-video JSON, its HTML rendering, and the
//! change report against the previous run.

use eyre::Context;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the current snapshot within the output directory.
pub const LATEST_JSON: &str = "latest_news.json";
/// File name of the HTML rendering.
pub const LATEST_HTML: &str = "latest_news.html";
/// File name the prior snapshot is preserved under for diffing.
pub const PREVIOUS_JSON: &str = "previous_news.json";

/// One selected video, as fetched from the API and persisted in the snapshot.
///
/// Immutable once fetched, except for the score fields the ranking pass
/// fills in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsVideo {
    /// The video's YouTube ID; unique within a snapshot.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: Timestamp,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration_seconds: u32,
    /// Human-readable duration, `MM:SS` or `H:MM:SS`.
    #[serde(default)]
    pub duration_formatted: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Age at fetch time, used by the recency and viral scores.
    #[serde(default)]
    pub hours_since_published: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viral_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
}

impl NewsVideo {
    /// The video's watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Formats a second count as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    if minutes >= 60 {
        format!("{}:{:02}:{:02}", minutes / 60, minutes % 60, seconds)
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Writes the snapshot artifacts into `output_dir`, preserving any existing
/// JSON snapshot as [`PREVIOUS_JSON`] first.
///
/// Returns the path of the JSON snapshot.
pub fn write_snapshot(output_dir: &Path, videos: &[NewsVideo]) -> eyre::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    let json_path = output_dir.join(LATEST_JSON);
    if json_path.exists() {
        let backup = output_dir.join(PREVIOUS_JSON);
        std::fs::copy(&json_path, &backup)
            .with_context(|| format!("back up previous snapshot to {}", backup.display()))?;
    }

    let json = serde_json::to_string_pretty(videos).context("serialize snapshot")?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("write snapshot {}", json_path.display()))?;

    let html_path = output_dir.join(LATEST_HTML);
    std::fs::write(&html_path, render_html(videos))
        .with_context(|| format!("write snapshot {}", html_path.display()))?;

    tracing::info!(
        path = %json_path.display(),
        videos = videos.len(),
        "snapshot written"
    );
    Ok(json_path)
}

/// Reads a snapshot back from its JSON file.
pub fn read_snapshot(path: &Path) -> eyre::Result<Vec<NewsVideo>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse snapshot {}", path.display()))
}

/// Renders the snapshot as a static HTML page.
pub fn render_html(videos: &[NewsVideo]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Latest news videos</title>\n</head>\n<body>\n<h1>Latest news videos</h1>\n\
         <table>\n<tr><th>Title</th><th>Channel</th><th>Published</th><th>Duration</th></tr>\n",
    );
    for video in videos {
        // write! to a String cannot fail
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{url}\">{title}</a></td><td>{channel}</td>\
             <td>{published}</td><td>{duration}</td></tr>",
            url = video.watch_url(),
            title = escape_html(&video.title),
            channel = escape_html(&video.channel_title),
            published = video.published_at,
            duration = escape_html(&video.duration_formatted),
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The ID-level difference between two snapshots.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// IDs present in the new snapshot but not the old one.
    pub added: Vec<String>,
    /// IDs present in the old snapshot but not the new one.
    pub removed: Vec<String>,
}

/// Computes added/removed video IDs between two snapshots, preserving each
/// snapshot's order within the result.
pub fn diff_snapshots(old: &[NewsVideo], new: &[NewsVideo]) -> SnapshotDiff {
    let old_ids: HashSet<&str> = old.iter().map(|v| v.id.as_str()).collect();
    let new_ids: HashSet<&str> = new.iter().map(|v| v.id.as_str()).collect();
    SnapshotDiff {
        added: new
            .iter()
            .filter(|v| !old_ids.contains(v.id.as_str()))
            .map(|v| v.id.clone())
            .collect(),
        removed: old
            .iter()
            .filter(|v| !new_ids.contains(v.id.as_str()))
            .map(|v| v.id.clone())
            .collect(),
    }
}

/// Logs how the new selection differs from the preserved previous snapshot.
///
/// Purely informational; a missing or unreadable previous snapshot just
/// means everything counts as added.
pub fn report_changes(output_dir: &Path, new: &[NewsVideo]) {
    let previous_path = output_dir.join(PREVIOUS_JSON);
    let previous = match read_snapshot(&previous_path) {
        Ok(videos) => videos,
        Err(e) => {
            tracing::debug!("no previous snapshot to diff against: {e:#}");
            Vec::new()
        }
    };

    let diff = diff_snapshots(&previous, new);
    tracing::info!(
        added = diff.added.len(),
        removed = diff.removed.len(),
        total = new.len(),
        "snapshot changes"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn video(id: &str) -> NewsVideo {
        NewsVideo {
            id: id.to_string(),
            title: format!("Video {id}"),
            description: String::new(),
            published_at: "2026-08-06T12:00:00Z".parse().unwrap(),
            channel_id: "chan".to_string(),
            channel_title: "Channel & Co".to_string(),
            thumbnail: None,
            duration_seconds: 420,
            duration_formatted: format_duration(420),
            view_count: 100,
            like_count: 10,
            comment_count: 1,
            tags: Vec::new(),
            hours_since_published: 2.0,
            quality_score: None,
            viral_score: None,
            total_score: None,
        }
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(423), "7:03");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn snapshot_round_trip_preserves_ids_and_titles() {
        let dir = tempfile::tempdir().unwrap();
        let videos = vec![video("a"), video("b")];

        let json_path = write_snapshot(dir.path(), &videos).unwrap();
        let restored = read_snapshot(&json_path).unwrap();

        let ids: Vec<_> = restored.iter().map(|v| v.id.as_str()).collect();
        let titles: Vec<_> = restored.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(titles, vec!["Video a", "Video b"]);

        // A second write preserves the first snapshot for diffing.
        write_snapshot(dir.path(), &[video("c")]).unwrap();
        let previous = read_snapshot(&dir.path().join(PREVIOUS_JSON)).unwrap();
        assert_eq!(previous.len(), 2);
    }

    #[test]
    fn diff_reports_added_and_removed_ids() {
        let old = vec![video("A"), video("B"), video("C")];
        let new = vec![video("B"), video("C"), video("D")];
        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.added, vec!["D"]);
        assert_eq!(diff.removed, vec!["A"]);
    }

    #[test]
    fn html_escapes_titles() {
        let mut v = video("x");
        v.title = "<script>alert('&')</script>".to_string();
        let html = render_html(&[v]);
        assert!(html.contains("&lt;script&gt;alert(&#39;&amp;&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("https://www.youtube.com/watch?v=x"));
    }
}
