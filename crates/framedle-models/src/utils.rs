//! YouTube URL parsing and normalization.

use thiserror::Error;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// URL markers that precede a video id, in order of preference.
const ID_MARKERS: &[&str] = &["?v=", "&v=", "youtu.be/", "/embed/", "/v/", "/shorts/"];

/// Extract the 11-character YouTube video id from a URL.
///
/// Supports `watch?v=`, `youtu.be/`, `/embed/`, `/v/` and `/shorts/`
/// forms, with or without extra query parameters or fragments.
pub fn extract_youtube_id(url: &str) -> YoutubeIdResult<String> {
    let url = url.trim();

    let lower = url.to_ascii_lowercase();
    if !(lower.contains("youtube.com") || lower.contains("youtu.be")) {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    for marker in ID_MARKERS {
        if let Some(pos) = url.find(marker) {
            let remaining = &url[pos + marker.len()..];
            if remaining.is_empty() && *marker != "?v=" && *marker != "&v=" {
                continue;
            }
            return validate_youtube_id(id_segment(remaining));
        }
    }

    Err(YoutubeIdError::VideoIdNotFound)
}

/// Turn user input into a URL the metadata provider can resolve.
///
/// Anything that does not look like an http(s) URL is treated as a bare
/// video id.
pub fn normalize_video_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http") {
        input.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={}", input)
    }
}

/// Take everything up to the first delimiter.
fn id_segment(segment: &str) -> &str {
    let end = segment
        .find(['&', '#', '?', '/'])
        .unwrap_or(segment.len());
    segment[..end].trim()
}

fn validate_youtube_id(id: &str) -> YoutubeIdResult<String> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if id.len() != 11 || !valid_chars {
        return Err(YoutubeIdError::InvalidVideoId);
    }

    Ok(id.to_string())
}
