use crate::error::TrendError;
use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const FETCH_SOURCE_GITHUB: &str = "github-search";
pub const FETCH_SOURCE_FILE: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendScheduleConfig {
    pub timezone: String,
}

impl Default for TrendScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFetchConfig {
    pub source: String,
    pub api_url: String,
    pub query: String,
    pub limit: usize,
    pub timeout_secs: u64,
    #[serde(default)]
    pub items_file: Option<String>,
}

impl Default for TrendFetchConfig {
    fn default() -> Self {
        Self {
            source: FETCH_SOURCE_GITHUB.to_string(),
            api_url: "https://api.github.com/search/repositories".to_string(),
            query: "stars:>1000".to_string(),
            limit: 10,
            timeout_secs: 30,
            items_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrendDocumentConfig {
    /// Written as `# <title>` when a new document is created.
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrendConfig {
    pub schedule: TrendScheduleConfig,
    pub fetch: TrendFetchConfig,
    pub document: TrendDocumentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialTrendConfig {
    schedule: Option<TrendScheduleConfig>,
    fetch: Option<TrendFetchConfig>,
    document: Option<TrendDocumentConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_optional_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    TrendError::InvalidConfig(message.into()).into()
}

impl TrendConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.schedule
            .timezone
            .trim()
            .parse::<Tz>()
            .map_err(|err| invalid(format!("invalid timezone `{}`: {err}", self.schedule.timezone)))
    }
}

fn validate(cfg: &TrendConfig) -> Result<()> {
    cfg.timezone()?;
    if cfg.fetch.source != FETCH_SOURCE_GITHUB && cfg.fetch.source != FETCH_SOURCE_FILE {
        return Err(invalid(format!(
            "invalid fetch source `{}`: use `{FETCH_SOURCE_GITHUB}` or `{FETCH_SOURCE_FILE}`",
            cfg.fetch.source
        )));
    }
    if cfg.fetch.source == FETCH_SOURCE_FILE
        && cfg
            .fetch
            .items_file
            .as_deref()
            .is_none_or(|v| v.trim().is_empty())
    {
        return Err(invalid("fetch source `file` requires fetch.items_file"));
    }
    if cfg.fetch.limit == 0 || cfg.fetch.limit > 100 {
        return Err(invalid("invalid fetch limit: require 1 <= limit <= 100"));
    }
    if cfg.fetch.timeout_secs == 0 {
        return Err(invalid("invalid fetch timeout: must be >= 1 second"));
    }
    if cfg.fetch.query.trim().is_empty() {
        return Err(invalid("invalid fetch query: cannot be empty"));
    }
    if !cfg.fetch.api_url.starts_with("http://") && !cfg.fetch.api_url.starts_with("https://") {
        return Err(invalid("invalid fetch api_url: must be http or https"));
    }
    Ok(())
}

pub fn resolve_config_path(home: &Path) -> Option<PathBuf> {
    if let Ok(custom) = env::var("TRENDLOG_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let local = home.join("trendlog.toml");
    if local.exists() {
        return Some(local);
    }

    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("trendlog").join("trendlog.toml"))
}

fn merge_file_config(base: &mut TrendConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)
        .map_err(|err| invalid(format!("failed to read {}: {err}", path.display())))?;
    let parsed: PartialTrendConfig = toml::from_str(&raw)
        .map_err(|err| invalid(format!("failed to parse {}: {err}", path.display())))?;
    if let Some(schedule) = parsed.schedule {
        base.schedule = schedule;
    }
    if let Some(fetch) = parsed.fetch {
        base.fetch = fetch;
    }
    if let Some(document) = parsed.document {
        base.document = document;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut TrendConfig) {
    cfg.schedule.timezone = env_or_string("TRENDLOG_TIMEZONE", &cfg.schedule.timezone);
    cfg.fetch.source = env_or_string("TRENDLOG_FETCH_SOURCE", &cfg.fetch.source);
    cfg.fetch.api_url = env_or_string("TRENDLOG_FETCH_API_URL", &cfg.fetch.api_url);
    cfg.fetch.query = env_or_string("TRENDLOG_FETCH_QUERY", &cfg.fetch.query);
    cfg.fetch.limit = env_or_usize("TRENDLOG_FETCH_LIMIT", cfg.fetch.limit);
    cfg.fetch.timeout_secs = env_or_u64("TRENDLOG_FETCH_TIMEOUT_SECS", cfg.fetch.timeout_secs);
    cfg.fetch.items_file = env_optional_string("TRENDLOG_ITEMS_FILE", cfg.fetch.items_file.take());
    cfg.document.title = env_optional_string("TRENDLOG_DOCUMENT_TITLE", cfg.document.title.take());
}

pub fn load_config(home: &Path) -> Result<TrendConfig> {
    let mut cfg = TrendConfig::default();
    if let Some(path) = resolve_config_path(home) {
        merge_file_config(&mut cfg, &path)?;
    }
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
