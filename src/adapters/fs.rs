use crate::domain::ports::FragmentSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileSource {
    base_path: PathBuf,
}

impl FileSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl FragmentSource for FileSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        let full_path = self.base_path.join(location.trim_start_matches('/'));
        tracing::debug!("Reading fragment from {}", full_path.display());
        let text = tokio::fs::read_to_string(&full_path).await?;
        Ok(text)
    }
}
