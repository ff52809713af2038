use std::env::VarError;

use crate::app_config::{AppConfig, Environment, InferenceConfig};
use crate::ConfigError;

const DEFAULT_INFERENCE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_INFERENCE_MODEL: &str = "llama3-8b-8192";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load the inference API settings, loading `.env` first.
///
/// The API key has no default: a missing `GROQ_API_KEY` fails here, before
/// any batch is started.
///
/// # Errors
///
/// Returns `ConfigError` if `GROQ_API_KEY` is missing or a value is invalid.
pub fn load_inference_config() -> Result<InferenceConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_inference_config_from_env()
}

/// Load the inference API settings from the process environment only.
///
/// # Errors
///
/// Returns `ConfigError` if `GROQ_API_KEY` is missing or a value is invalid.
pub fn load_inference_config_from_env() -> Result<InferenceConfig, ConfigError> {
    build_inference_config(|key| std::env::var(key))
}

fn require<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var).unwrap_or_else(|_| default.to_string())
}

fn parse_or_default<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = or_default(lookup, var, default);
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup; no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let database_url = require(&lookup, "DATABASE_URL")?;
    let env = parse_environment(&or_default(&lookup, "TWEETSENT_ENV", "development"))?;
    let log_level = or_default(&lookup, "TWEETSENT_LOG_LEVEL", "info");

    let db_max_connections = parse_or_default(&lookup, "TWEETSENT_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_or_default(&lookup, "TWEETSENT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs =
        parse_or_default(&lookup, "TWEETSENT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let max_posts: usize = parse_or_default(&lookup, "TWEETSENT_MAX_POSTS", "20")?;
    if max_posts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TWEETSENT_MAX_POSTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let twitter_auth_token = lookup("TWITTER_AUTH_TOKEN").ok().filter(|v| !v.is_empty());
    let twitter_ct0 = lookup("TWITTER_CT0").ok().filter(|v| !v.is_empty());
    let bird_bin = or_default(&lookup, "TWEETSENT_BIRD_BIN", "bird").into();

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        max_posts,
        twitter_auth_token,
        twitter_ct0,
        bird_bin,
    })
}

fn build_inference_config<F>(lookup: F) -> Result<InferenceConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let api_key = require(&lookup, "GROQ_API_KEY")?;
    let base_url = or_default(&lookup, "TWEETSENT_INFERENCE_URL", DEFAULT_INFERENCE_URL)
        .trim_end_matches('/')
        .to_string();
    let model = or_default(&lookup, "TWEETSENT_INFERENCE_MODEL", DEFAULT_INFERENCE_MODEL);
    let timeout_secs = parse_or_default(&lookup, "TWEETSENT_INFERENCE_TIMEOUT_SECS", "30")?;

    Ok(InferenceConfig {
        api_key,
        base_url,
        model,
        timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TWEETSENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
