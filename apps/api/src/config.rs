use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::kinds::ModelRoster;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_RESUME_MATCH_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_SPEECH_QUALITY_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_ANSWER_SCORE_MODEL: &str = "gemini-1.5-flash";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub models: ModelRoster,
    pub model_timeout: Duration,
    pub model_max_retries: u32,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_base_url: optional_env("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            models: ModelRoster {
                resume_match: optional_env("RESUME_MATCH_MODEL", DEFAULT_RESUME_MATCH_MODEL),
                speech_quality: optional_env("SPEECH_QUALITY_MODEL", DEFAULT_SPEECH_QUALITY_MODEL),
                answer_score: optional_env("ANSWER_SCORE_MODEL", DEFAULT_ANSWER_SCORE_MODEL),
            },
            model_timeout: Duration::from_secs(parse_env("MODEL_TIMEOUT_SECS", 30u64)?),
            model_max_retries: parse_env("MODEL_MAX_RETRIES", 0u32)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            port: parse_env("PORT", 5003u16)?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
