use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::artifact::ArtifactStore;
use crate::youtube::{ProviderError, TranscriptProvider};
use crate::{TranscribeRequest, TranscriptionResult, extract_video_id, join_segments};

/// Language preference sent to the provider when nothing else is configured
pub const DEFAULT_LANGUAGES: [&str; 2] = ["fr", "en"];

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("No URL provided")]
    NoUrl,

    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Persist(String),
}

impl TranscribeError {
    /// HTTP status code for this outcome
    pub fn status(&self) -> u16 {
        match self {
            TranscribeError::NoUrl | TranscribeError::InvalidUrl => 400,
            TranscribeError::Provider(_) | TranscribeError::Persist(_) => 500,
        }
    }
}

/// What to do when the artifact file cannot be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Log the failure and still answer with the transcript
    #[default]
    BestEffort,
    /// Fail the request with the write error
    Strict,
}

pub struct TranscriptionService {
    provider: Arc<dyn TranscriptProvider>,
    artifacts: ArtifactStore,
    languages: Vec<String>,
    persist_policy: PersistPolicy,
}

impl TranscriptionService {
    pub fn new(
        provider: Arc<dyn TranscriptProvider>,
        artifacts: ArtifactStore,
        languages: Vec<String>,
        persist_policy: PersistPolicy,
    ) -> Self {
        Self {
            provider,
            artifacts,
            languages,
            persist_policy,
        }
    }

    /// Validate, extract the video ID, fetch and join the transcript, then persist it.
    pub async fn handle(&self, request: TranscribeRequest) -> Result<TranscriptionResult, TranscribeError> {
        let url = request
            .url
            .filter(|u| !u.is_empty())
            .ok_or(TranscribeError::NoUrl)?;
        debug!("Validated request for {url}");

        let video_id = extract_video_id(&url).ok_or(TranscribeError::InvalidUrl)?;
        debug!("Extracted video ID {video_id}");

        let segments = self.provider.fetch_transcript(&video_id, &self.languages).await?;
        debug!("Fetched {} segments for {video_id}", segments.len());

        let result = TranscriptionResult {
            transcription: join_segments(&segments),
        };

        if let Err(e) = self.artifacts.save(&result).await {
            match self.persist_policy {
                PersistPolicy::BestEffort => {
                    warn!("Could not persist transcription for {video_id}: {e:#}");
                }
                PersistPolicy::Strict => return Err(TranscribeError::Persist(format!("{e:#}"))),
            }
        }

        info!(
            "Transcribed {video_id}: {} segments, {} chars",
            segments.len(),
            result.transcription.len()
        );
        Ok(result)
    }
}
