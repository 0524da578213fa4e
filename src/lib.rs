pub mod artifact;
pub mod config;
pub mod output;
pub mod server;
pub mod transcribe;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: 0.0,
            duration: 0.0,
        }
    }
}

/// Body of `POST /transcribe`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscribeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl TranscribeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()) }
    }
}

/// Joined transcript, returned to the caller and written to the artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub transcription: String,
}

// Markers are tried together; the leftmost marker followed by 11 id characters wins.
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|embed/)([A-Za-z0-9_-]{11})").expect("video id pattern is valid")
});

/// Extract the 11-character video ID from a `v=`, `youtu.be/` or `embed/` URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Join segment texts with a single space, keeping provider order
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/a_b-C1d2E3f"),
            Some("a_b-C1d2E3f".to_string())
        );
    }

    #[test]
    fn test_marker_without_full_id_falls_through() {
        assert_eq!(
            extract_video_id("https://example.com/?v=short&next=https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_leftmost_marker_wins() {
        assert_eq!(
            extract_video_id("https://youtu.be/AAAAAAAAAAA?v=BBBBBBBBBBB"),
            Some("AAAAAAAAAAA".to_string())
        );
    }

    #[test]
    fn test_longer_token_truncated_to_eleven() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQXYZ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_bare_id_is_rejected() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_shorts_url_is_rejected() {
        assert_eq!(extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not a real url"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_join_segments() {
        let segments = vec![Segment::new("Never"), Segment::new("gonna"), Segment::new("give")];
        assert_eq!(join_segments(&segments), "Never gonna give");
    }

    #[test]
    fn test_join_segments_empty() {
        assert_eq!(join_segments(&[]), "");
    }
}
