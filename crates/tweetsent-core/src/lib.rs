//! Shared domain types, text normalization, analytics and configuration for
//! the tweet sentiment workspace.

pub mod analytics;
pub mod app_config;
pub mod config;
pub mod error;
pub mod normalize;
pub mod tweets;

pub use app_config::{AppConfig, Environment, InferenceConfig};
pub use config::{
    load_app_config, load_app_config_from_env, load_inference_config,
    load_inference_config_from_env,
};
pub use error::{ConfigError, CoreError};
pub use normalize::{normalize, NormalizedText};
pub use tweets::{RawPost, Sentiment, TweetRecord, TweetStats, UNKNOWN_USERNAME};
