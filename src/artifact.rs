use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;

use crate::TranscriptionResult;
use crate::output::render_artifact;

/// Local file holding the last successful transcription. Every save overwrites it.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the result, replacing any previous content.
    pub async fn save(&self, result: &TranscriptionResult) -> Result<()> {
        let data = render_artifact(result)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, data)
            .await
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))?;
        debug!("Saved transcription artifact: {}", self.path.display());
        Ok(())
    }

    /// Read the last saved result, if any.
    pub fn load(&self) -> Option<TranscriptionResult> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&data).ok()
    }
}
