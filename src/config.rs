use std::time::Duration;

use tracing::warn;

pub const DEFAULT_HUB_API_BASE: &str = "https://huggingface.co/api";

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub hub_api_base: String,
    /// Model listings are concatenated in this order.
    pub model_authors: Vec<String>,
    pub dataset_authors: Vec<String>,
    pub list_limit: u32,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// Cron expression for cache warm-up; `None` disables the job.
    pub refresh_cron: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            hub_api_base: DEFAULT_HUB_API_BASE.to_string(),
            model_authors: vec!["TeichAI".to_string(), "Liontix".to_string()],
            dataset_authors: vec!["TeichAI".to_string()],
            list_limit: 100,
            cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(15),
            refresh_cron: Some("0 0 * * * *".to_string()),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or invalid values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let model_authors = lookup("MODEL_AUTHORS")
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.model_authors);
        let dataset_authors = lookup("DATASET_AUTHORS")
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.dataset_authors);

        let refresh_cron = match lookup("REFRESH_CRON") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => defaults.refresh_cron,
        };

        Self {
            host: lookup("CATALOG_HOST")
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.host),
            port: parse_or(&lookup, "CATALOG_PORT", defaults.port),
            hub_api_base: lookup("HUB_API_BASE")
                .map(|b| b.trim().trim_end_matches('/').to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or(defaults.hub_api_base),
            model_authors,
            dataset_authors,
            list_limit: parse_or(&lookup, "HUB_LIST_LIMIT", defaults.list_limit),
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "HUB_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HUB_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            refresh_cron,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {}='{}', falling back to {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
