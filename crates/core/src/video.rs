//! Video URL handling for the course player.
//!
//! Admins paste YouTube links in whatever shape their browser gave them.
//! The player needs the canonical embed form, so we recognize the supported
//! shapes explicitly and fall back to the input unchanged for anything else
//! (self-hosted videos, other providers).
//!
//! Supported input shapes:
//! - `https://youtu.be/<id>`
//! - `https://www.youtube.com/watch?v=<id>` (any extra query parameters)
//! - `https://www.youtube.com/embed/<id>`
//! - `https://www.youtube.com/v/<id>`
//!
//! Bare hosts without a scheme are first promoted to `https://`.

use url::Url;

/// Length of a YouTube video ID.
const VIDEO_ID_LEN: usize = 11;

/// Prefixes a scheme-less URL with `https://`; already-schemed input is
/// returned trimmed but otherwise untouched.
#[must_use]
pub fn ensure_https(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_owned();
    }
    format!("https://{trimmed}")
}

/// Maps a video URL to its embeddable form.
///
/// YouTube links in a supported shape become
/// `https://www.youtube.com/embed/<id>`; everything else (including
/// unparseable input) passes through via `ensure_https`.
#[must_use]
pub fn embed_url(raw: &str) -> String {
    let normalized = ensure_https(raw);
    match Url::parse(&normalized) {
        Ok(url) => match youtube_video_id(&url) {
            Some(id) => format!("https://www.youtube.com/embed/{id}"),
            None => normalized,
        },
        Err(_) => normalized,
    }
}

fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => first_path_segment(url)?,
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())?,
                "embed" | "v" => segments.next()?.to_owned(),
                _ => return None,
            }
        }
        _ => return None,
    };

    is_video_id(&candidate).then_some(candidate)
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?.next().map(str::to_owned)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
