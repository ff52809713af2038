//! Background execution of an ingestion batch.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tweetsent_db::TweetStore;

use crate::classifier::Classify;
use crate::error::PipelineError;
use crate::pipeline::{BatchSummary, IngestionPipeline, ItemReport};
use crate::sources::SourceItem;

/// A batch running on its own tokio task.
///
/// Poll [`BatchHandle::is_finished`] without blocking, then collect the
/// result with [`BatchHandle::wait`]. [`BatchHandle::cancel`] stops the batch
/// before its next item; the summary then has `cancelled` set.
///
/// Per-item reports stream out while the batch runs; drain them with
/// [`BatchHandle::try_next_report`].
#[derive(Debug)]
pub struct BatchHandle {
    task: JoinHandle<Result<BatchSummary, PipelineError>>,
    cancel: CancellationToken,
    reports: UnboundedReceiver<ItemReport>,
}

impl BatchHandle {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The next finished item, if one is waiting. Never blocks.
    pub fn try_next_report(&mut self) -> Option<ItemReport> {
        self.reports.try_recv().ok()
    }

    /// Wait for the batch to end.
    ///
    /// # Errors
    ///
    /// Whatever the batch returned, or [`PipelineError::Task`] if the task
    /// panicked.
    pub async fn wait(self) -> Result<BatchSummary, PipelineError> {
        self.task
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
    }
}

impl<S, C> IngestionPipeline<S, C>
where
    S: TweetStore + 'static,
    C: Classify + 'static,
{
    /// Start [`IngestionPipeline::run_batch`] on a new task and return
    /// immediately.
    #[must_use]
    pub fn spawn_batch(self: Arc<Self>, keyword: String, items: Vec<SourceItem>) -> BatchHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (tx, reports) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            self.run_batch_reporting(&keyword, items, &token, Some(&tx))
                .await
        });
        BatchHandle {
            task,
            cancel,
            reports,
        }
    }
}
