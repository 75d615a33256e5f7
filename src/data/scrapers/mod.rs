//! Retrieval of the source documents

pub mod nhl;

pub use nhl::NhlClient;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::{GameId, PbpError, Result};

/// Anything that can hand over the raw documents for a game
pub trait GameSource {
    /// Game ids scheduled on a date
    fn schedule(&self, date: NaiveDate) -> Result<Vec<GameId>>;

    /// The play-by-play document
    fn play_by_play(&self, game: GameId) -> Result<Value>;

    /// The landing document (coaches, venue, season)
    fn landing(&self, game: GameId) -> Result<Value>;

    /// Raw HTML of the play-by-play report
    fn report_html(&self, season: i64, game: GameId) -> Result<String>;
}

/// Retry an operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 >= max_attempts => return Err(e),
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                let delay = std::time::Duration::from_millis(100 * 2u64.pow(attempt));
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleDoc {
    #[serde(default)]
    game_week: Vec<ScheduleDay>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDay {
    date: Option<String>,
    #[serde(default)]
    games: Vec<ScheduledGame>,
}

#[derive(Debug, Deserialize)]
struct ScheduledGame {
    id: GameId,
}

/// Game ids for `date` from a schedule document. The document covers a
/// week starting at the requested date; the matching day is used, falling
/// back to the first.
pub fn parse_schedule(doc: &Value, date: NaiveDate) -> Result<Vec<GameId>> {
    let schedule: ScheduleDoc = serde_json::from_value(doc.clone())?;
    let wanted = date.format("%Y-%m-%d").to_string();
    let day = schedule
        .game_week
        .iter()
        .find(|d| d.date.as_deref() == Some(wanted.as_str()))
        .or_else(|| schedule.game_week.first())
        .ok_or_else(|| PbpError::Schema(format!("schedule for {} has no gameWeek", date)))?;
    Ok(day.games.iter().map(|g| g.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schedule() {
        let doc = json!({
            "gameWeek": [
                {"date": "2023-12-19", "games": [{"id": 2023020340}]},
                {"date": "2023-12-20", "games": [{"id": 2023020350}, {"id": 2023020351}]}
            ]
        });
        let date = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        assert_eq!(
            parse_schedule(&doc, date).unwrap(),
            vec![GameId(2023020350), GameId(2023020351)]
        );

        let empty = json!({"gameWeek": []});
        assert!(parse_schedule(&empty, date).is_err());
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let result: Result<()> = with_retry(
            || {
                calls += 1;
                Err(PbpError::Parse("nope".to_string()))
            },
            2,
        );
        assert!(result.is_err());
        assert_eq!(calls, 2);

        let mut calls = 0;
        let result = with_retry(
            || {
                calls += 1;
                if calls < 2 {
                    Err(PbpError::Parse("once".to_string()))
                } else {
                    Ok(calls)
                }
            },
            3,
        );
        assert_eq!(result.unwrap(), 2);
    }
}
