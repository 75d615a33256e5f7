//! Game-events feed normalization
//!
//! Flattens the nested play-by-play document into three tables: plays,
//! roster spots and game metadata. Detail fields that a particular game never
//! emits (no shootout, no assists) deserialize to `None` rather than being
//! missing, so every downstream stage sees the same schema.

use serde::Deserialize;
use serde_json::Value;

use crate::{EventType, GameId, GameType, PbpError, PlayerId, Result, TeamId};

/// Localized text as published by the API (`{"default": "..."}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub default: String,
}

/// Event-type-specific detail fields. All optional: which ones appear
/// depends on the event type and on the game.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayDetails {
    pub event_owner_team_id: Option<TeamId>,
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub zone_code: Option<String>,
    pub shot_type: Option<String>,
    pub scoring_player_id: Option<PlayerId>,
    pub assist1_player_id: Option<PlayerId>,
    pub assist2_player_id: Option<PlayerId>,
    pub shooting_player_id: Option<PlayerId>,
    pub blocking_player_id: Option<PlayerId>,
    pub hitting_player_id: Option<PlayerId>,
    pub hittee_player_id: Option<PlayerId>,
    pub winning_player_id: Option<PlayerId>,
    pub losing_player_id: Option<PlayerId>,
    pub player_id: Option<PlayerId>,
    pub committed_by_player_id: Option<PlayerId>,
    pub drawn_by_player_id: Option<PlayerId>,
    pub served_by_player_id: Option<PlayerId>,
}

/// One flattened row of the plays table
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    pub event_id: Option<i64>,
    pub event: EventType,
    pub period: u8,
    pub period_type: Option<String>,
    /// "MM:SS" elapsed in the period
    pub time_in_period: String,
    pub situation_code: Option<String>,
    pub home_team_def_side: Option<String>,
    pub details: PlayDetails,
}

/// One row of the roster table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSpot {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub first_name: LocalizedName,
    #[serde(default)]
    pub last_name: LocalizedName,
    pub sweater_number: Option<u32>,
    pub position_code: Option<String>,
}

/// Home or away team reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub abbrev: String,
}

/// Game-level metadata carried onto every output row
#[derive(Debug, Clone)]
pub struct GameMeta {
    pub game_id: GameId,
    pub season: Option<i64>,
    pub game_date: Option<String>,
    pub game_type: GameType,
    pub venue: Option<String>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_coach: Option<String>,
    pub away_coach: Option<String>,
}

/// The three normalized tables for one game
#[derive(Debug, Clone)]
pub struct GameFeed {
    pub meta: GameMeta,
    pub plays: Vec<Play>,
    pub roster: Vec<RosterSpot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriodDescriptor {
    number: Option<u8>,
    period_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlay {
    event_id: Option<i64>,
    type_desc_key: String,
    period: Option<u8>,
    period_descriptor: Option<RawPeriodDescriptor>,
    time_in_period: String,
    situation_code: Option<String>,
    home_team_defending_side: Option<String>,
    #[serde(default)]
    details: PlayDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoach {
    head_coach: Option<LocalizedName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameInfo {
    home_team: Option<RawCoach>,
    away_team: Option<RawCoach>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    game_info: Option<RawGameInfo>,
}

/// Shared shape of the play-by-play and landing documents
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGame {
    season: Option<i64>,
    game_type: Option<u8>,
    game_date: Option<String>,
    venue: Option<LocalizedName>,
    home_team: Option<TeamRef>,
    away_team: Option<TeamRef>,
    summary: Option<RawSummary>,
    plays: Option<Vec<RawPlay>>,
    roster_spots: Option<Vec<RosterSpot>>,
}

impl RawGame {
    fn coaches(&self) -> (Option<String>, Option<String>) {
        let info = self.summary.as_ref().and_then(|s| s.game_info.as_ref());
        let coach = |side: Option<&RawCoach>| {
            side.and_then(|c| c.head_coach.as_ref())
                .map(|name| name.default.trim().to_uppercase())
                .filter(|name| !name.is_empty())
        };
        (
            coach(info.and_then(|i| i.home_team.as_ref())),
            coach(info.and_then(|i| i.away_team.as_ref())),
        )
    }
}

impl GameFeed {
    /// Normalize the play-by-play document, optionally overlaying metadata
    /// from the landing document.
    ///
    /// Fails with `PbpError::Schema` when `plays` or `rosterSpots` is absent:
    /// without them there is no event table for this game. A landing
    /// document that does not parse is ignored.
    pub fn from_documents(game_id: GameId, pbp: &Value, landing: Option<&Value>) -> Result<Self> {
        let raw: RawGame = serde_json::from_value(pbp.clone())?;
        let landing: Option<RawGame> =
            landing.and_then(|doc| match serde_json::from_value(doc.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("Game {}: ignoring malformed landing document: {}", game_id, e);
                    None
                }
            });

        let raw_plays = raw
            .plays
            .as_ref()
            .ok_or_else(|| PbpError::Schema(format!("game {} has no plays list", game_id)))?;
        let roster = raw.roster_spots.clone().ok_or_else(|| {
            PbpError::Schema(format!("game {} has no rosterSpots list", game_id))
        })?;

        let home_team = raw
            .home_team
            .clone()
            .or_else(|| landing.as_ref().and_then(|l| l.home_team.clone()))
            .ok_or_else(|| PbpError::Schema(format!("game {} has no homeTeam", game_id)))?;
        let away_team = raw
            .away_team
            .clone()
            .or_else(|| landing.as_ref().and_then(|l| l.away_team.clone()))
            .ok_or_else(|| PbpError::Schema(format!("game {} has no awayTeam", game_id)))?;

        let (mut home_coach, mut away_coach) = raw.coaches();
        let mut season = raw.season;
        let mut game_type = raw.game_type;
        let mut venue = raw.venue.as_ref().map(|v| v.default.clone());
        if let Some(landing) = &landing {
            let (home, away) = landing.coaches();
            home_coach = home.or(home_coach);
            away_coach = away.or(away_coach);
            season = landing.season.or(season);
            game_type = landing.game_type.or(game_type);
            venue = landing.venue.as_ref().map(|v| v.default.clone()).or(venue);
        }

        let plays = raw_plays
            .iter()
            .map(|p| normalize_play(game_id, p))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Game {}: normalized {} plays and {} roster spots",
            game_id,
            plays.len(),
            roster.len()
        );

        Ok(GameFeed {
            meta: GameMeta {
                game_id,
                season,
                game_date: raw.game_date.clone(),
                game_type: GameType(game_type.unwrap_or(GameType::REGULAR.0)),
                venue,
                home_team,
                away_team,
                home_coach,
                away_coach,
            },
            plays,
            roster,
        })
    }
}

fn normalize_play(game_id: GameId, raw: &RawPlay) -> Result<Play> {
    let descriptor = raw.period_descriptor.as_ref();
    let period = raw
        .period
        .or_else(|| descriptor.and_then(|d| d.number))
        .ok_or_else(|| {
            PbpError::Schema(format!(
                "game {}: play {:?} has no period",
                game_id, raw.event_id
            ))
        })?;

    Ok(Play {
        event_id: raw.event_id,
        event: EventType::from_key(&raw.type_desc_key),
        period,
        period_type: descriptor.and_then(|d| d.period_type.clone()),
        time_in_period: raw.time_in_period.clone(),
        situation_code: raw.situation_code.clone(),
        home_team_def_side: raw.home_team_defending_side.clone(),
        details: raw.details.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_game() -> Value {
        json!({
            "season": 20232024,
            "gameType": 2,
            "gameDate": "2023-12-20",
            "venue": {"default": "Scotiabank Arena"},
            "homeTeam": {"id": 10, "abbrev": "TOR"},
            "awayTeam": {"id": 8, "abbrev": "MTL"},
            "plays": [
                {
                    "eventId": 1,
                    "typeDescKey": "goal",
                    "periodDescriptor": {"number": 2, "periodType": "REG"},
                    "timeInPeriod": "05:12",
                    "situationCode": "1551",
                    "homeTeamDefendingSide": "left",
                    "details": {"eventOwnerTeamId": 10, "scoringPlayerId": 34, "xCoord": 80, "yCoord": -3}
                }
            ],
            "rosterSpots": [
                {"teamId": 10, "playerId": 34, "firstName": {"default": "Auston"},
                 "lastName": {"default": "Matthews"}, "sweaterNumber": 34, "positionCode": "C"}
            ]
        })
    }

    #[test]
    fn test_normalize_game() {
        let feed = GameFeed::from_documents(GameId(2023020350), &sample_game(), None).unwrap();
        assert_eq!(feed.meta.home_team.abbrev, "TOR");
        assert_eq!(feed.meta.venue.as_deref(), Some("Scotiabank Arena"));
        assert_eq!(feed.plays.len(), 1);

        let play = &feed.plays[0];
        assert_eq!(play.event, EventType::Goal);
        assert_eq!(play.period, 2);
        assert_eq!(play.period_type.as_deref(), Some("REG"));
        assert_eq!(play.details.x_coord, Some(80.0));
        assert_eq!(play.details.scoring_player_id, Some(PlayerId(34)));
    }

    #[test]
    fn test_absent_detail_fields_are_none() {
        let feed = GameFeed::from_documents(GameId(1), &sample_game(), None).unwrap();
        let details = &feed.plays[0].details;
        assert_eq!(details.assist1_player_id, None);
        assert_eq!(details.assist2_player_id, None);
        assert_eq!(details.served_by_player_id, None);
    }

    #[test]
    fn test_missing_tables_fail() {
        let mut doc = sample_game();
        doc.as_object_mut().unwrap().remove("rosterSpots");
        let err = GameFeed::from_documents(GameId(1), &doc, None).unwrap_err();
        assert!(matches!(err, PbpError::Schema(_)));

        let mut doc = sample_game();
        doc.as_object_mut().unwrap().remove("plays");
        let err = GameFeed::from_documents(GameId(1), &doc, None).unwrap_err();
        assert!(matches!(err, PbpError::Schema(_)));
    }

    #[test]
    fn test_landing_overlay() {
        let landing = json!({
            "season": 20232024,
            "gameType": 3,
            "venue": {"default": "Bell Centre"},
            "summary": {"gameInfo": {
                "homeTeam": {"headCoach": {"default": "Sheldon Keefe"}},
                "awayTeam": {"headCoach": {"default": "Martin St. Louis"}}
            }}
        });
        let feed =
            GameFeed::from_documents(GameId(1), &sample_game(), Some(&landing)).unwrap();
        assert_eq!(feed.meta.home_coach.as_deref(), Some("SHELDON KEEFE"));
        assert_eq!(feed.meta.away_coach.as_deref(), Some("MARTIN ST. LOUIS"));
        assert_eq!(feed.meta.venue.as_deref(), Some("Bell Centre"));
        assert!(feed.meta.game_type.is_playoff());
    }

    #[test]
    fn test_malformed_landing_falls_back_to_play_by_play() {
        let landing = json!({"homeTeam": {"id": 10, "name": {"default": "Maple Leafs"}}});
        let feed =
            GameFeed::from_documents(GameId(1), &sample_game(), Some(&landing)).unwrap();
        assert_eq!(feed.meta.home_team.abbrev, "TOR");
        assert_eq!(feed.meta.season, Some(20232024));
        assert_eq!(feed.meta.venue.as_deref(), Some("Scotiabank Arena"));
        assert_eq!(feed.meta.home_coach, None);
        assert_eq!(feed.plays.len(), 1);
    }
}
