//! Read-only handlers over the tweet store, plus `clear`.

use chrono::Utc;
use tweetsent_core::analytics::{
    best_and_worst, frequent_words, hashtags_by_sentiment, top_hashtags, Ranked,
};
use tweetsent_core::{Sentiment, TweetRecord};
use tweetsent_db::TweetStore;

const TOP_N: usize = 10;
const EXAMPLES_N: usize = 5;
const TEXT_WIDTH: usize = 60;

/// Pick the narrowest store query for the given filters, then apply the rest
/// in memory.
pub(crate) async fn load_filtered<S: TweetStore>(
    store: &S,
    sentiment: Option<Sentiment>,
    keyword: Option<&str>,
    recent: Option<usize>,
) -> anyhow::Result<Vec<TweetRecord>> {
    let mut records = match (recent, sentiment, keyword) {
        (Some(n), _, _) => store.get_recent(n).await?,
        (None, Some(s), _) => store.get_by_sentiment(s).await?,
        (None, None, Some(k)) => store.get_by_keyword(k).await?,
        (None, None, None) => store.get_all().await?,
    };
    if let Some(s) = sentiment {
        records.retain(|r| r.sentiment == s);
    }
    if let Some(k) = keyword {
        records.retain(|r| r.keyword == k);
    }
    Ok(records)
}

/// Print stored tweets as a table.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_results<S: TweetStore>(
    store: &S,
    sentiment: Option<Sentiment>,
    keyword: Option<&str>,
    recent: Option<usize>,
) -> anyhow::Result<()> {
    let records = load_filtered(store, sentiment, keyword, recent).await?;

    if records.is_empty() {
        println!("no tweets found; run `scrape <KEYWORD>` first");
        return Ok(());
    }

    println!("{:<18}{:<10}{:<18}TEXT", "USER", "LABEL", "CAPTURED");
    for r in &records {
        let captured = r.timestamp.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<18}{:<10}{:<18}{}",
            truncate(&r.username, 16),
            r.sentiment,
            captured,
            truncate(&r.clean_text, TEXT_WIDTH)
        );
    }
    println!();
    println!("{} tweet(s)", records.len());
    Ok(())
}

/// Print counts and percentages per label.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_stats<S: TweetStore>(store: &S) -> anyhow::Result<()> {
    let stats = store.stats().await?;
    println!("{:<10}{:<8}SHARE", "LABEL", "COUNT");
    for label in Sentiment::ALL {
        println!(
            "{:<10}{:<8}{:.1}%",
            label,
            stats.count_for(label),
            stats.share(label)
        );
    }
    println!("{:<10}{}", "total", stats.total);
    Ok(())
}

/// Print a markdown report over every stored tweet.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_report<S: TweetStore>(store: &S) -> anyhow::Result<()> {
    let records = store.get_all().await?;
    if records.is_empty() {
        println!("no tweets to report; run `scrape <KEYWORD>` first");
        return Ok(());
    }
    let stats = store.stats().await?;
    print!("{}", render_report(&records, &stats));
    Ok(())
}

pub(crate) fn render_report(records: &[TweetRecord], stats: &tweetsent_core::TweetStats) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    let mut keywords: Vec<&str> = Vec::new();
    for r in records {
        if !keywords.contains(&r.keyword.as_str()) {
            keywords.push(&r.keyword);
        }
    }

    line("# Sentiment Report".to_string());
    line(String::new());
    line(format!("**Generated**: {}", Utc::now().format("%Y-%m-%d %H:%M UTC")));
    line(format!("**Keywords**: {}", keywords.join(", ")));
    line(format!("**Tweets**: {}", stats.total));
    line(String::new());
    line("---".to_string());
    line(String::new());

    line("## Distribution".to_string());
    line(String::new());
    line("| Sentiment | Count | Share |".to_string());
    line("|-----------|-------|-------|".to_string());
    for label in Sentiment::ALL {
        line(format!(
            "| {label} | {} | {:.1}% |",
            stats.count_for(label),
            stats.share(label)
        ));
    }
    line(String::new());

    line("## Top Hashtags".to_string());
    line(String::new());
    push_ranked(&mut line, &top_hashtags(records, TOP_N), "Hashtag");

    line("## Frequent Words".to_string());
    line(String::new());
    push_ranked(&mut line, &frequent_words(records, TOP_N), "Word");

    line("## Hashtags by Sentiment".to_string());
    line(String::new());
    for (label, ranked) in hashtags_by_sentiment(records, EXAMPLES_N) {
        let tags: Vec<String> = ranked
            .iter()
            .map(|r| format!("{} ({})", r.label, r.count))
            .collect();
        let tags = if tags.is_empty() {
            "none".to_string()
        } else {
            tags.join(", ")
        };
        line(format!("- **{label}**: {tags}"));
    }
    line(String::new());

    let examples = best_and_worst(records, EXAMPLES_N);
    for (title, group) in [("Most Positive", &examples.best), ("Most Negative", &examples.worst)] {
        line(format!("## {title}"));
        line(String::new());
        if group.is_empty() {
            line("_none_".to_string());
        }
        for r in group {
            line(format!("- @{}: {}", r.username, r.clean_text));
        }
        line(String::new());
    }

    out
}

fn push_ranked(line: &mut impl FnMut(String), ranked: &[Ranked], heading: &str) {
    if ranked.is_empty() {
        line("_none_".to_string());
        line(String::new());
        return;
    }
    line(format!("| {heading} | Count |"));
    line("|---|---|".to_string());
    for r in ranked {
        line(format!("| {} | {} |", r.label, r.count));
    }
    line(String::new());
}

/// Delete every stored tweet.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub(crate) async fn run_clear<S: TweetStore>(store: &S) -> anyhow::Result<()> {
    let removed = store.clear().await?;
    println!("cleared {removed} tweet(s)");
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}
