//! X/Twitter search via the `bird` CLI.
//!
//! Invokes `bird search "{keyword}" --json -n {max} --auth-token ... --ct0 ...`
//! as a subprocess and decodes its stdout.

use std::path::PathBuf;

use tweetsent_core::AppConfig;

use super::{decode_posts, PostSource, SourceItem};
use crate::error::SentimentError;

#[derive(Clone)]
pub struct BirdSource {
    bin: PathBuf,
    auth_token: Option<String>,
    ct0: Option<String>,
}

impl std::fmt::Debug for BirdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BirdSource")
            .field("bin", &self.bin)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .field("ct0", &self.ct0.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl BirdSource {
    #[must_use]
    pub fn new(bin: impl Into<PathBuf>, auth_token: Option<String>, ct0: Option<String>) -> Self {
        Self {
            bin: bin.into(),
            auth_token,
            ct0,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.bird_bin.clone(),
            config.twitter_auth_token.clone(),
            config.twitter_ct0.clone(),
        )
    }
}

impl PostSource for BirdSource {
    /// # Errors
    ///
    /// Returns [`SentimentError::MissingCredentials`] when either cookie is
    /// unset, [`SentimentError::Io`] if `bird` cannot be spawned, and
    /// [`SentimentError::Source`] on a non-zero exit or non-array output.
    async fn fetch(&self, keyword: &str, max_posts: usize) -> Result<Vec<SourceItem>, SentimentError> {
        let (auth_token, ct0) = match (&self.auth_token, &self.ct0) {
            (Some(a), Some(c)) => (a.as_str(), c.as_str()),
            _ => {
                return Err(SentimentError::MissingCredentials(
                    "TWITTER_AUTH_TOKEN and TWITTER_CT0 must both be set".to_string(),
                ))
            }
        };

        let limit = max_posts.to_string();
        let output = tokio::process::Command::new(&self.bin)
            .args([
                "search",
                keyword,
                "--json",
                "-n",
                &limit,
                "--auth-token",
                auth_token,
                "--ct0",
                ct0,
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(keyword, status = %output.status, "bird search returned non-zero exit");
            return Err(SentimentError::Source(format!(
                "bird search exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let items = decode_posts(&output.stdout, max_posts)?;
        tracing::info!(keyword, found = items.len(), "bird search complete");
        Ok(items)
    }
}
