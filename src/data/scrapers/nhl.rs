//! NHL web API and HTML report client
//!
//! Supports caching fetched documents for offline runs and reduced load.

use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{parse_schedule, with_retry, GameSource};
use crate::{ApiConfig, GameId, PbpError, Result};

/// Client for api-web.nhle.com and the nhl.com report archive
pub struct NhlClient {
    client: reqwest::blocking::Client,
    base_url: String,
    report_base_url: String,
    max_attempts: u32,
    /// Optional cache directory for fetched documents
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl NhlClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(NhlClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            report_base_url: config.report_base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
            cache_dir: None,
            offline_only: false,
        })
    }

    /// Create client with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    pub fn play_by_play_url(&self, game: GameId) -> String {
        format!("{}/gamecenter/{}/play-by-play", self.base_url, game)
    }

    pub fn landing_url(&self, game: GameId) -> String {
        format!("{}/gamecenter/{}/landing", self.base_url, game)
    }

    pub fn schedule_url(&self, date: NaiveDate) -> String {
        format!("{}/schedule/{}", self.base_url, date.format("%Y-%m-%d"))
    }

    pub fn report_url(&self, season: i64, game: GameId) -> String {
        format!(
            "{}/{}/PL0{}.HTM",
            self.report_base_url,
            season,
            game.report_suffix()
        )
    }

    /// Get the cache file path for a URL
    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            let filename = url
                .replace("https://", "")
                .replace("http://", "")
                .replace(['/', '?'], "_");
            dir.join(filename)
        })
    }

    fn load_from_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    fn save_to_cache(&self, url: &str, body: &str) -> Result<()> {
        if let Some(path) = self.cache_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    /// Fetch a URL as text, from cache when possible
    fn fetch_text(&self, url: &str, game: GameId) -> Result<String> {
        if let Some(body) = self.load_from_cache(url) {
            return Ok(body);
        }

        if self.offline_only {
            return Err(PbpError::Retrieval {
                game_id: game,
                message: format!("No cached data for {} (offline mode)", url),
            });
        }

        log::debug!("Fetching {}", url);
        let body = with_retry(
            || {
                let response = self.client.get(url).send()?;
                if !response.status().is_success() {
                    return Err(PbpError::Retrieval {
                        game_id: game,
                        message: format!("HTTP {}: {}", response.status(), url),
                    });
                }
                Ok(response.text()?)
            },
            self.max_attempts,
        )?;

        if let Err(e) = self.save_to_cache(url, &body) {
            log::warn!("Failed to cache {}: {}", url, e);
        }
        Ok(body)
    }

    fn fetch_json(&self, url: &str, game: GameId) -> Result<Value> {
        let body = self.fetch_text(url, game)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl GameSource for NhlClient {
    fn schedule(&self, date: NaiveDate) -> Result<Vec<GameId>> {
        log::info!("Fetching schedule for {}", date);
        let doc = self.fetch_json(&self.schedule_url(date), GameId::default())?;
        parse_schedule(&doc, date)
    }

    fn play_by_play(&self, game: GameId) -> Result<Value> {
        self.fetch_json(&self.play_by_play_url(game), game)
    }

    fn landing(&self, game: GameId) -> Result<Value> {
        self.fetch_json(&self.landing_url(game), game)
    }

    fn report_html(&self, season: i64, game: GameId) -> Result<String> {
        self.fetch_text(&self.report_url(season, game), game)
    }
}
