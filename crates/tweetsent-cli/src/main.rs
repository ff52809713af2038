mod query;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tweetsent_core::Sentiment;
use tweetsent_db::{PgTweetStore, PoolConfig};

#[derive(Debug, Parser)]
#[command(name = "tweetsent-cli")]
#[command(about = "Scrape posts for a keyword, tag their sentiment, and report on them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clear the store, then scrape, classify and store posts for a keyword
    Scrape {
        /// Search term
        keyword: String,

        /// Maximum posts to fetch (defaults to TWEETSENT_MAX_POSTS)
        #[arg(long)]
        max_posts: Option<usize>,

        /// Read posts from a saved `bird --json` dump instead of running `bird`
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// How to label posts
        #[arg(long, value_enum, default_value_t = ClassifierKind::Llm)]
        classifier: ClassifierKind,

        /// Run against an in-memory store; nothing is written to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// List stored tweets
    Results {
        /// Only tweets with this label
        #[arg(long)]
        sentiment: Option<Sentiment>,

        /// Only tweets captured for this keyword
        #[arg(long)]
        keyword: Option<String>,

        /// Only the N most recently captured tweets
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Show counts per sentiment label
    Stats,
    /// Generate a markdown report of the stored tweets
    Report,
    /// Delete every stored tweet
    Clear,
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    /// Chat-completions model (needs GROQ_API_KEY)
    Llm,
    /// Offline word list
    Lexicon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("tweetsent-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = tweetsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Commands::Scrape {
        keyword,
        max_posts,
        from_file,
        classifier,
        dry_run: true,
    } = &command
    {
        let options = scrape::ScrapeOptions {
            keyword,
            max_posts: max_posts.unwrap_or(config.max_posts),
            from_file: from_file.as_deref(),
            classifier: *classifier,
        };
        return scrape::run_scrape(
            &config,
            tweetsent_db::MemoryTweetStore::new(),
            options,
            tweetsent_core::load_inference_config,
        )
        .await;
    }

    let store = PgTweetStore::connect(&config.database_url, PoolConfig::from_app_config(&config))
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to database: {e}"))?;

    let result = match command {
        Commands::Scrape {
            keyword,
            max_posts,
            from_file,
            classifier,
            ..
        } => {
            let options = scrape::ScrapeOptions {
                keyword: &keyword,
                max_posts: max_posts.unwrap_or(config.max_posts),
                from_file: from_file.as_deref(),
                classifier,
            };
            scrape::run_scrape(
                &config,
                store.clone(),
                options,
                tweetsent_core::load_inference_config,
            )
            .await
        }
        Commands::Results {
            sentiment,
            keyword,
            recent,
        } => query::run_results(&store, sentiment, keyword.as_deref(), recent).await,
        Commands::Stats => query::run_stats(&store).await,
        Commands::Report => query::run_report(&store).await,
        Commands::Clear => query::run_clear(&store).await,
        Commands::Db { command } => run_db(&store, command).await,
    };

    store.close().await;
    result
}

async fn run_db(store: &PgTweetStore, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            tweetsent_db::ping(store.pool()).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = tweetsent_db::run_migrations(store.pool()).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
