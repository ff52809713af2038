//! Sentiment tagging and ingestion for scraped posts.
//!
//! Raw posts come from a [`PostSource`], are cleaned by
//! [`tweetsent_core::normalize`], labelled by a [`Classify`] implementation
//! (an LLM behind an OpenAI-compatible API, or the offline lexicon) and
//! upserted into a [`tweetsent_db::TweetStore`] keyed on the cleaned text.

pub mod batch;
pub mod classifier;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod scorer;
pub mod sources;

pub use batch::BatchHandle;
pub use classifier::{parse_label, Classify, LlmClassifier};
pub use error::{PipelineError, SentimentError};
pub use inference::InferenceClient;
pub use pipeline::{BatchSummary, IngestionPipeline, ItemReport, PostOutcome};
pub use scorer::{lexicon_score, LexiconClassifier};
pub use sources::{BirdSource, ExtractionError, JsonFileSource, PostSource, SourceItem};
