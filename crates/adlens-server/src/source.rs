use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use adlens_core::Dataset;

/// Where view requests get their raw dataset from.
///
/// Every call returns a fresh snapshot; nothing is cached between requests,
/// so an edited dataset file shows up on the next page load.
#[async_trait]
pub trait DatasetSource: Send + Sync + 'static {
    async fn load(&self) -> anyhow::Result<Dataset>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Reads a JSON dataset from disk on every load.
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn load(&self) -> anyhow::Result<Dataset> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let dataset = Dataset::from_json_slice(&bytes)
            .with_context(|| format!("invalid dataset in {}", self.path.display()))?;
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a fixed dataset held in memory.
pub struct StaticDatasetSource {
    dataset: Dataset,
}

impl StaticDatasetSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl DatasetSource for StaticDatasetSource {
    async fn load(&self) -> anyhow::Result<Dataset> {
        Ok(self.dataset.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
