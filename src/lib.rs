//! NHL play-by-play scraping and reconciliation
//!
//! Joins the structured game-events feed with the HTML play-by-play report
//! into one enriched row per event.

pub mod data;
pub mod features;
pub mod pipeline;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a game, e.g. 2023020350
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GameId(pub i64);

impl GameId {
    /// Report file stem used by the HTML report archive: everything after the
    /// season and game-type prefix (2023020350 -> "20350").
    pub fn report_suffix(&self) -> String {
        let digits = self.0.to_string();
        digits.get(5..).unwrap_or_default().to_string()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Unique identifier for a player within a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// Game type code as published by the API (2 = regular season, 3 = playoffs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameType(pub u8);

impl GameType {
    pub const REGULAR: GameType = GameType(2);
    pub const PLAYOFF: GameType = GameType(3);

    pub fn is_playoff(&self) -> bool {
        *self == GameType::PLAYOFF
    }
}

/// Kind of play-by-play event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Faceoff,
    ShotOnGoal,
    MissedShot,
    BlockedShot,
    FailedShotAttempt,
    Hit,
    Giveaway,
    Takeaway,
    Goal,
    Penalty,
    Stoppage,
    PeriodStart,
    PeriodEnd,
    DelayedPenalty,
    GameEnd,
    ShootoutComplete,
    ShootoutGoal,
    /// Any event key the API emits that the pipeline has no rules for
    Other(String),
}

impl EventType {
    /// Parse the API's `typeDescKey`
    pub fn from_key(key: &str) -> Self {
        match key {
            "faceoff" => EventType::Faceoff,
            "shot-on-goal" => EventType::ShotOnGoal,
            "missed-shot" => EventType::MissedShot,
            "blocked-shot" => EventType::BlockedShot,
            "failed-shot-attempt" => EventType::FailedShotAttempt,
            "hit" => EventType::Hit,
            "giveaway" => EventType::Giveaway,
            "takeaway" => EventType::Takeaway,
            "goal" => EventType::Goal,
            "penalty" => EventType::Penalty,
            "stoppage" => EventType::Stoppage,
            "period-start" => EventType::PeriodStart,
            "period-end" => EventType::PeriodEnd,
            "delayed-penalty" => EventType::DelayedPenalty,
            "game-end" => EventType::GameEnd,
            "shootout-complete" => EventType::ShootoutComplete,
            "shootout-goal" => EventType::ShootoutGoal,
            other => EventType::Other(other.to_string()),
        }
    }

    /// Map an HTML report event code onto the API vocabulary
    pub fn from_report_code(code: &str) -> Option<Self> {
        let event = match code {
            "FAC" => EventType::Faceoff,
            "SHOT" => EventType::ShotOnGoal,
            "BLOCK" => EventType::BlockedShot,
            "STOP" | "CHL" | "EIEND" | "EISTR" => EventType::Stoppage,
            "MISS" => EventType::MissedShot,
            "HIT" => EventType::Hit,
            "TAKE" => EventType::Takeaway,
            "GIVE" => EventType::Giveaway,
            "GOAL" => EventType::Goal,
            "PSTR" => EventType::PeriodStart,
            "PENL" => EventType::Penalty,
            "PEND" => EventType::PeriodEnd,
            "DELPEN" => EventType::DelayedPenalty,
            "GEND" => EventType::GameEnd,
            "SOC" => EventType::ShootoutComplete,
            _ => return None,
        };
        Some(event)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Faceoff => "faceoff",
            EventType::ShotOnGoal => "shot-on-goal",
            EventType::MissedShot => "missed-shot",
            EventType::BlockedShot => "blocked-shot",
            EventType::FailedShotAttempt => "failed-shot-attempt",
            EventType::Hit => "hit",
            EventType::Giveaway => "giveaway",
            EventType::Takeaway => "takeaway",
            EventType::Goal => "goal",
            EventType::Penalty => "penalty",
            EventType::Stoppage => "stoppage",
            EventType::PeriodStart => "period-start",
            EventType::PeriodEnd => "period-end",
            EventType::DelayedPenalty => "delayed-penalty",
            EventType::GameEnd => "game-end",
            EventType::ShootoutComplete => "shootout-complete",
            EventType::ShootoutGoal => "shootout-goal",
            EventType::Other(key) => key,
        }
    }

    /// Events that count as a shot attempt for the empty-net flag
    pub fn is_shot(&self) -> bool {
        matches!(
            self,
            EventType::ShotOnGoal | EventType::MissedShot | EventType::BlockedShot | EventType::Goal
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum PbpError {
    #[error("Retrieval failed for game {game_id}: {message}")]
    Retrieval { game_id: GameId, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing required data: {0}")]
    Schema(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shootout tally is level at {home}-{away}; cannot pick a winner")]
    ShootoutTie { home: usize, away: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PbpError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub report_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub cache_dir: Option<String>,
    pub offline_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "https://api-web.nhle.com/v1".to_string(),
                report_base_url: "https://www.nhl.com/scores/htmlreports".to_string(),
                user_agent: "pbp-scraper/0.1".to_string(),
                timeout_secs: 30,
                max_attempts: 3,
            },
            data: DataConfig {
                cache_dir: None,
                offline_only: false,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PbpError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PbpError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PbpError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_suffix() {
        assert_eq!(GameId(2023020350).report_suffix(), "20350");
    }

    #[test]
    fn test_event_key_roundtrip() {
        for key in ["faceoff", "blocked-shot", "shootout-complete", "failed-shot-attempt"] {
            assert_eq!(EventType::from_key(key).as_str(), key);
        }
        assert_eq!(
            EventType::from_key("something-new"),
            EventType::Other("something-new".to_string())
        );
    }

    #[test]
    fn test_report_codes() {
        assert_eq!(EventType::from_report_code("FAC"), Some(EventType::Faceoff));
        assert_eq!(EventType::from_report_code("CHL"), Some(EventType::Stoppage));
        assert_eq!(EventType::from_report_code("SOC"), Some(EventType::ShootoutComplete));
        assert_eq!(EventType::from_report_code("PGSTR"), None);
    }

    #[test]
    fn test_config_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert!(parsed.data.cache_dir.is_none());
    }
}
