//! Process configuration, read once from the environment at startup.
//!
//! Upstream credentials stay optional here: their absence is surfaced as a
//! configuration error on the first request that needs them, not at boot.

use std::path::PathBuf;

pub const APP_NAME: &str = "lerrokatu";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Languages whose analysis pipelines are pre-loaded at startup.
pub const PRELOAD_LANGUAGES: &[&str] = &["eu", "en", "es", "fr"];

#[derive(Debug, Clone)]
pub struct Config {
    pub itzuli_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub itzuli_api_url: String,
    pub stanza_api_url: String,
    pub claude_model: String,
    pub db_path: PathBuf,
    pub daily_limit: i64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            itzuli_api_key: env_opt("ITZULI_API_KEY"),
            claude_api_key: env_opt("CLAUDE_API_KEY"),
            itzuli_api_url: env_or("ITZULI_API_URL", "https://api.itzuli.eus/v1"),
            stanza_api_url: env_or("STANZA_API_URL", "http://localhost:8900"),
            claude_model: env_or("CLAUDE_MODEL", "claude-sonnet-4-5"),
            db_path: PathBuf::from(env_or("ALIGNMENT_DB", ".cache/alignments.db")),
            daily_limit: env_or("DAILY_LIMIT", "10").parse().unwrap_or(10),
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8000").parse().unwrap_or(8000),
        }
    }

    pub fn default_log_filter() -> &'static str {
        "info,lerrokatu=debug"
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}
