use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::Segment;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Why a transcript could not be produced. The message is surfaced verbatim to HTTP callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to YouTube failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error(
        "no transcript found for video {video_id} in any of the requested languages ({}); available: {}",
        .requested.join(", "),
        .available.join(", ")
    )]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("error parsing caption XML: {0}")]
    Parse(String),

    #[error("{0}")]
    Upstream(String),
}

/// Source of caption segments for a video
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the segments of the first transcript available in `languages`, in preference order
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// `asr` for auto-generated tracks, absent for manually created ones
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Captions from YouTube's InnerTube API
#[derive(Debug, Clone)]
pub struct YouTubeCaptions {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YouTubeCaptions {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, YOUTUBE_BASE_URL)
    }

    /// Point the watch page and InnerTube requests at another host
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_playability(video_id, resp.playability_status.as_ref())?;

        let tracks = resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
        }
        Ok(tracks)
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeCaptions {
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>, ProviderError> {
        let tracks = self.fetch_tracks(video_id).await?;

        let track = select_track(&tracks, languages).ok_or_else(|| ProviderError::NoTranscriptFound {
            video_id: video_id.to_string(),
            requested: languages.to_vec(),
            available: tracks.iter().map(|t| t.language_code.clone()).collect(),
        })?;
        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        // Step 3: Fetch the caption XML
        let caption_url = track.base_url.replace("&fmt=srv3", "");
        let caption_xml = self
            .client
            .get(&caption_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

fn check_playability(video_id: &str, status: Option<&PlayabilityStatus>) -> Result<(), ProviderError> {
    let Some(status) = status else {
        return Ok(());
    };
    match status.status.as_deref() {
        None | Some("OK") => Ok(()),
        Some(other) => Err(ProviderError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: status.reason.clone().unwrap_or_else(|| other.to_string()),
        }),
    }
}

/// For each language in order, a manually created track beats a generated one
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut same_lang = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = same_lang.clone().find(|t| !t.is_generated());
        manual.or_else(|| same_lang.next())
    })
}

fn extract_api_key(html: &str) -> Result<String, ProviderError> {
    let patterns = [r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#, r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#];
    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| ProviderError::Upstream(e.to_string()))?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }

    if html.contains(r#"action="https://consent.youtube.com/s""#) {
        return Err(ProviderError::Upstream(
            "YouTube redirected to the cookie consent page".to_string(),
        ));
    }
    Err(ProviderError::Upstream(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, ProviderError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = 0.0;
                let mut dur = 0.0;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                    match attr.key.as_ref() {
                        b"start" => start = value.unwrap_or_default(),
                        b"dur" => dur = value.unwrap_or_default(),
                        _ => {}
                    }
                }
                current = Some((start, dur));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw_text = e.unescape().map_err(|err| ProviderError::Parse(err.to_string()))?;
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProviderError::Parse(e.to_string())),
            _ => {}
        }
    }

    Ok(segments)
}
