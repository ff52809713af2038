//! Ingestion pipeline orchestration.
//!
//! One raw post moves through: normalize, discard if nothing is left,
//! classify, build a record, upsert. Nothing that happens to one post stops
//! the batch; only an empty keyword or a failed store clear does that.

use chrono::{SubsecRound, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tweetsent_core::{normalize, RawPost, Sentiment, TweetRecord};
use tweetsent_db::{TweetStore, UpsertOutcome};

use crate::classifier::Classify;
use crate::error::PipelineError;
use crate::sources::SourceItem;

const PREVIEW_CHARS: usize = 50;

/// Terminal state of one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Stored {
        sentiment: Sentiment,
        outcome: UpsertOutcome,
    },
    /// Nothing left after cleaning; not stored.
    Discarded,
    /// The source could not extract this element.
    Skipped { reason: String },
    /// The store rejected the record.
    Failed { error: String },
}

/// What happened to one item of a batch, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: usize,
    /// First characters of the raw text, empty for skipped items.
    pub preview: String,
    pub outcome: PostOutcome,
}

impl ItemReport {
    /// One human-readable line for the operator.
    #[must_use]
    pub fn status_line(&self) -> String {
        let n = self.index + 1;
        match &self.outcome {
            PostOutcome::Stored { sentiment, outcome } => {
                let verb = match outcome {
                    UpsertOutcome::Inserted => "stored",
                    UpsertOutcome::Updated => "updated",
                };
                format!("[{n}] {verb} ({sentiment}): {}", self.preview)
            }
            PostOutcome::Discarded => format!("[{n}] discarded, empty after cleaning: {}", self.preview),
            PostOutcome::Skipped { reason } => format!("[{n}] skipped: {reason}"),
            PostOutcome::Failed { error } => format!("[{n}] failed to store: {error}"),
        }
    }
}

/// Result of one completed (or cancelled) batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub keyword: String,
    /// Records removed by the clear that precedes every batch.
    pub cleared: u64,
    pub items: Vec<ItemReport>,
    /// `true` if the batch stopped early on request.
    pub cancelled: bool,
}

impl BatchSummary {
    #[must_use]
    pub fn stored(&self) -> usize {
        self.count(|o| matches!(o, PostOutcome::Stored { .. }))
    }

    #[must_use]
    pub fn discarded(&self) -> usize {
        self.count(|o| matches!(o, PostOutcome::Discarded))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, PostOutcome::Skipped { .. }))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PostOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&PostOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

/// Owns a store and a classifier and feeds posts through them.
pub struct IngestionPipeline<S, C> {
    store: S,
    classifier: C,
}

impl<S: TweetStore, C: Classify> IngestionPipeline<S, C> {
    #[must_use]
    pub fn new(store: S, classifier: C) -> Self {
        Self { store, classifier }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Normalize, classify and upsert a single post.
    ///
    /// Never returns an error: a store failure is logged and reported as
    /// [`PostOutcome::Failed`].
    pub async fn process_post(&self, keyword: &str, post: &RawPost) -> PostOutcome {
        let normalized = normalize(&post.text);
        if normalized.is_empty() {
            tracing::debug!(keyword, "post empty after cleaning, discarded");
            return PostOutcome::Discarded;
        }

        let sentiment = self.classifier.classify(&normalized.clean_text).await;

        let record = TweetRecord {
            username: post.username_or_unknown(),
            text: post.text.clone(),
            clean_text: normalized.clean_text,
            hashtags: normalized.hashtags,
            sentiment,
            // Postgres keeps microseconds; match it so both stores agree.
            timestamp: Utc::now().trunc_subsecs(6),
            keyword: keyword.to_string(),
        };

        match self.store.upsert(&record).await {
            Ok(outcome) => {
                tracing::debug!(keyword, %sentiment, ?outcome, "post stored");
                PostOutcome::Stored { sentiment, outcome }
            }
            Err(e) => {
                tracing::error!(keyword, error = %e, "failed to store post");
                PostOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run a whole batch for `keyword`.
    ///
    /// 1. Reject an empty or whitespace-only keyword.
    /// 2. Clear the store.
    /// 3. Process items in order, checking `cancel` before each one.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyKeyword`] before touching the store, or
    /// [`PipelineError::Clear`] if the store cannot be cleared. Per-item
    /// problems land in the returned [`BatchSummary`].
    pub async fn run_batch(
        &self,
        keyword: &str,
        items: Vec<SourceItem>,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, PipelineError> {
        self.run_batch_reporting(keyword, items, cancel, None).await
    }

    /// [`IngestionPipeline::run_batch`], additionally sending each
    /// [`ItemReport`] to `progress` as soon as that item is done.
    pub(crate) async fn run_batch_reporting(
        &self,
        keyword: &str,
        items: Vec<SourceItem>,
        cancel: &CancellationToken,
        progress: Option<&UnboundedSender<ItemReport>>,
    ) -> Result<BatchSummary, PipelineError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PipelineError::EmptyKeyword);
        }

        let cleared = self.store.clear().await.map_err(PipelineError::Clear)?;
        tracing::info!(keyword, cleared, total = items.len(), "starting batch");

        let mut reports = Vec::with_capacity(items.len());
        let mut cancelled = false;

        for (index, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(keyword, processed = index, "batch cancelled");
                cancelled = true;
                break;
            }

            let report = match item {
                Ok(post) => ItemReport {
                    index,
                    preview: preview(&post.text),
                    outcome: self.process_post(keyword, &post).await,
                },
                Err(e) => {
                    tracing::warn!(keyword, index, reason = %e.reason, "skipping unextractable post");
                    ItemReport {
                        index,
                        preview: String::new(),
                        outcome: PostOutcome::Skipped { reason: e.reason },
                    }
                }
            };
            if let Some(tx) = progress {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(report.clone());
            }
            reports.push(report);
        }

        let summary = BatchSummary {
            keyword: keyword.to_string(),
            cleared,
            items: reports,
            cancelled,
        };
        tracing::info!(
            keyword,
            stored = summary.stored(),
            discarded = summary.discarded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "batch complete"
        );
        Ok(summary)
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
