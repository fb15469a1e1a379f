//! Filesystem-backed [`TemplateSource`].

use std::path::PathBuf;

use ignoreguard_core::repository::template::TemplateSource;
use ignoreguard_types::error::TemplateError;

/// Reads the default compliance-file body from disk on every load.
pub struct FileTemplateSource {
    path: PathBuf,
}

impl FileTemplateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateSource for FileTemplateSource {
    async fn load(&self) -> Result<String, TemplateError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TemplateError::Read {
                path: self.path.display().to_string(),
                source,
            })
    }
}
