use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference API error: {0}")]
    Inference(String),

    #[error("post source error: {0}")]
    Source(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that stop a whole batch. Per-post failures are reported in the
/// batch summary instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("failed to clear tweet store: {0}")]
    Clear(#[source] tweetsent_db::DbError),

    #[error("batch task failed: {0}")]
    Task(String),
}
