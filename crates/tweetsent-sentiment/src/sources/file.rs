use std::path::PathBuf;

use super::{decode_posts, PostSource, SourceItem};
use crate::error::SentimentError;

/// Reads a saved `bird --json` dump instead of hitting the network.
/// The keyword is ignored; every element in the file is a candidate.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PostSource for JsonFileSource {
    async fn fetch(&self, keyword: &str, max_posts: usize) -> Result<Vec<SourceItem>, SentimentError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let items = decode_posts(&bytes, max_posts)?;
        tracing::info!(keyword, path = %self.path.display(), found = items.len(), "loaded posts from file");
        Ok(items)
    }
}
