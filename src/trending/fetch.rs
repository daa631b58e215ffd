use crate::error::TrendError;
use crate::trending::config::{FETCH_SOURCE_FILE, FETCH_SOURCE_GITHUB, TrendFetchConfig};
use crate::trending::item::Item;
use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Produces the day's items. Any failure aborts the run before files are
/// touched.
pub trait ItemSource {
    fn name(&self) -> &'static str;
    fn fetch(&self) -> Result<Vec<Item>>;
}

pub struct GitHubSearchSource {
    pub api_url: String,
    pub query: String,
    pub limit: usize,
    pub timeout_secs: u64,
    pub token: Option<String>,
}

pub struct ItemsFileSource {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

pub fn parse_search_response(raw: &str, limit: usize) -> Result<Vec<Item>, TrendError> {
    let parsed: SearchResponse = serde_json::from_str(raw)
        .map_err(|err| TrendError::fetch(FETCH_SOURCE_GITHUB, format!("malformed payload: {err}")))?;
    Ok(parsed.items.into_iter().take(limit).collect())
}

impl ItemSource for GitHubSearchSource {
    fn name(&self) -> &'static str {
        FETCH_SOURCE_GITHUB
    }

    fn fetch(&self) -> Result<Vec<Item>> {
        let fail = |message: String| TrendError::fetch(FETCH_SOURCE_GITHUB, message);
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("trendlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| fail(format!("failed to build http client: {err}")))?;

        let per_page = self.limit.to_string();
        let mut request = client
            .get(&self.api_url)
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", self.query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|err| fail(format!("request to {} failed: {err}", self.api_url)))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| fail(format!("failed to read response body: {err}")))?;
        if !status.is_success() {
            let snippet = body.chars().take(200).collect::<String>();
            return Err(fail(format!("status {status}: {snippet}")).into());
        }

        Ok(parse_search_response(&body, self.limit)?)
    }
}

pub fn parse_items_file(raw: &str, path: &Path) -> Result<Vec<Item>, TrendError> {
    json5::from_str::<Vec<Item>>(raw).map_err(|err| {
        TrendError::fetch(
            FETCH_SOURCE_FILE,
            format!("malformed items file {}: {err}", path.display()),
        )
    })
}

impl ItemSource for ItemsFileSource {
    fn name(&self) -> &'static str {
        FETCH_SOURCE_FILE
    }

    fn fetch(&self) -> Result<Vec<Item>> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            TrendError::fetch(
                FETCH_SOURCE_FILE,
                format!("failed to read {}: {err}", self.path.display()),
            )
        })?;
        Ok(parse_items_file(&raw, &self.path)?)
    }
}

/// Picks the configured source. An explicit items file always wins.
pub fn source_from_config(
    cfg: &TrendFetchConfig,
    items_override: Option<&Path>,
    home: &Path,
) -> Box<dyn ItemSource> {
    let file = items_override.map(Path::to_path_buf).or_else(|| {
        (cfg.source == FETCH_SOURCE_FILE)
            .then(|| cfg.items_file.as_deref().map(PathBuf::from))
            .flatten()
    });
    if let Some(path) = file {
        let path = if path.is_absolute() { path } else { home.join(path) };
        return Box::new(ItemsFileSource { path });
    }

    Box::new(GitHubSearchSource {
        api_url: cfg.api_url.clone(),
        query: cfg.query.clone(),
        limit: cfg.limit,
        timeout_secs: cfg.timeout_secs,
        token: env_non_empty("GITHUB_TOKEN"),
    })
}
