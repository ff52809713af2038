//! The `scrape` command: fetch, then run an ingestion batch in the background
//! while watching for ctrl-c.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tweetsent_core::{AppConfig, ConfigError, InferenceConfig, Sentiment};
use tweetsent_db::TweetStore;
use tweetsent_sentiment::{
    BatchHandle, BatchSummary, BirdSource, Classify, IngestionPipeline, JsonFileSource,
    LexiconClassifier, LlmClassifier, PipelineError, PostSource, SourceItem,
};

use crate::ClassifierKind;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const HEARTBEAT_EVERY: u32 = 20;

pub(crate) struct ScrapeOptions<'a> {
    pub keyword: &'a str,
    pub max_posts: usize,
    pub from_file: Option<&'a Path>,
    pub classifier: ClassifierKind,
}

/// The classifier picked on the command line.
enum SelectedClassifier {
    Llm(LlmClassifier),
    Lexicon(LexiconClassifier),
}

impl SelectedClassifier {
    fn build(
        kind: ClassifierKind,
        load_inference: impl FnOnce() -> Result<InferenceConfig, ConfigError>,
    ) -> anyhow::Result<Self> {
        Ok(match kind {
            ClassifierKind::Llm => Self::Llm(LlmClassifier::from_config(&load_inference()?)?),
            ClassifierKind::Lexicon => Self::Lexicon(LexiconClassifier),
        })
    }
}

impl Classify for SelectedClassifier {
    async fn classify(&self, clean_text: &str) -> Sentiment {
        match self {
            Self::Llm(c) => c.classify(clean_text).await,
            Self::Lexicon(c) => c.classify(clean_text).await,
        }
    }
}

/// Run a full scrape for one keyword against `store`.
///
/// The classifier is built before anything is fetched, so a missing
/// inference key fails the command without running the source.
///
/// # Errors
///
/// Returns an error for an empty keyword, a missing inference key when the
/// LLM classifier is selected, a source that cannot be read at all, or a
/// store that cannot be cleared. Per-post problems only show up in the
/// printed status lines.
pub(crate) async fn run_scrape<S>(
    config: &AppConfig,
    store: S,
    options: ScrapeOptions<'_>,
    load_inference: impl FnOnce() -> Result<InferenceConfig, ConfigError>,
) -> anyhow::Result<()>
where
    S: TweetStore + 'static,
{
    let keyword = options.keyword.trim();
    if keyword.is_empty() {
        return Err(PipelineError::EmptyKeyword.into());
    }

    let classifier = SelectedClassifier::build(options.classifier, load_inference)?;

    let items = match options.from_file {
        Some(path) => fetch(&JsonFileSource::new(path), keyword, options.max_posts).await?,
        None => fetch(&BirdSource::from_config(config), keyword, options.max_posts).await?,
    };

    if items.is_empty() {
        println!("no posts found for '{keyword}'");
    }

    let summary = run_in_background(store, classifier, keyword, items).await?;
    print_summary(&summary);
    Ok(())
}

async fn fetch<P: PostSource>(
    source: &P,
    keyword: &str,
    max_posts: usize,
) -> anyhow::Result<Vec<SourceItem>> {
    source
        .fetch(keyword, max_posts)
        .await
        .map_err(|e| anyhow::anyhow!("could not fetch posts for '{keyword}': {e}"))
}

async fn run_in_background<S, C>(
    store: S,
    classifier: C,
    keyword: &str,
    items: Vec<SourceItem>,
) -> anyhow::Result<BatchSummary>
where
    S: TweetStore + 'static,
    C: Classify + 'static,
{
    let pipeline = Arc::new(IngestionPipeline::new(store, classifier));
    let total = items.len();
    let mut handle = pipeline.spawn_batch(keyword.to_string(), items);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut ticks = 0_u32;

    while !handle.is_finished() {
        print_reports(&mut handle);
        tokio::select! {
            () = tokio::time::sleep(POLL_INTERVAL) => {
                ticks += 1;
                if ticks % HEARTBEAT_EVERY == 0 {
                    tracing::info!(keyword, total, "scrape still running");
                }
            }
            res = &mut ctrl_c, if !interrupted => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "could not listen for ctrl-c");
                } else {
                    println!("interrupt received; stopping after the current post");
                    handle.cancel();
                }
                interrupted = true;
            }
        }
    }
    print_reports(&mut handle);

    Ok(handle.wait().await?)
}

fn print_reports(handle: &mut BatchHandle) {
    while let Some(report) = handle.try_next_report() {
        println!("{}", report.status_line());
    }
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!(
        "scrape '{}' {}: {} stored, {} discarded, {} skipped, {} failed ({} previous tweets cleared)",
        summary.keyword,
        if summary.cancelled { "cancelled" } else { "complete" },
        summary.stored(),
        summary.discarded(),
        summary.skipped(),
        summary.failed(),
        summary.cleared,
    );
}
