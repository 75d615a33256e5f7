//! Per-game pipeline and the date fan-out
//!
//! Stages run in a fixed order, each taking and returning the event table:
//! attribute, score, situation, clock, report join, shootout correction,
//! projection.

pub mod output;
pub mod reconcile;
pub mod run_log;

pub use output::PbpRow;
pub use run_log::RunLog;

use chrono::NaiveDate;
use scraper::Html;

use crate::data::directory::Directory;
use crate::data::report::parse_report;
use crate::data::scrapers::GameSource;
use crate::data::source::GameFeed;
use crate::features::attribute;
use crate::features::situation::add_situations;
use crate::features::timeline::{add_elapsed_time, add_scores, apply_shootout};
use crate::{GameId, PbpError, Result};

/// Rows for one game plus what was lost on the way
#[derive(Debug, Clone)]
pub struct GameScrape {
    pub rows: Vec<PbpRow>,
    pub log: RunLog,
}

/// Run every stage over an already-fetched game
pub fn process_game(feed: GameFeed, report: &Html) -> Result<GameScrape> {
    let GameFeed {
        meta,
        plays,
        roster,
    } = feed;
    let mut run = RunLog::new(meta.game_id);
    let directory = Directory::build(&meta, &roster);

    let events = attribute(plays, &directory);
    let events = add_scores(events, &meta);
    let events = add_situations(events, &meta);
    let events = add_elapsed_time(events)?;

    let report_rows = parse_report(report, &directory, &mut run);
    let events = reconcile::reconcile(events, &report_rows, &mut run);
    let events = apply_shootout(events, &meta)?;

    let rows = events
        .iter()
        .map(|event| PbpRow::from_event(event, &meta))
        .collect();
    log::info!("{}", run.summary());
    Ok(GameScrape { rows, log: run })
}

/// Fetch and process one game.
///
/// The landing document only adds coaches and venue, so its absence is
/// tolerated. The report location needs the season.
pub fn scrape_game<S: GameSource + ?Sized>(source: &S, game_id: GameId) -> Result<GameScrape> {
    log::info!("Scraping game {}", game_id);
    let pbp = source.play_by_play(game_id)?;
    let landing = match source.landing(game_id) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Game {}: landing document unavailable: {}", game_id, e);
            None
        }
    };

    let feed = GameFeed::from_documents(game_id, &pbp, landing.as_ref())?;
    let season = feed
        .meta
        .season
        .ok_or_else(|| PbpError::Schema(format!("game {} has no season", game_id)))?;

    let html = source.report_html(season, game_id)?;
    let report = Html::parse_document(&html);
    process_game(feed, &report)
}

/// Scrape every game scheduled on `date`. Games that fail are logged and
/// skipped; the rest are concatenated in schedule order.
pub fn scrape_date<S: GameSource + ?Sized>(source: &S, date: NaiveDate) -> Result<Vec<PbpRow>> {
    let games = source.schedule(date)?;
    log::info!("{} games scheduled on {}", games.len(), date);

    let mut rows = Vec::new();
    for game_id in games {
        match scrape_game(source, game_id) {
            Ok(scrape) => rows.extend(scrape.rows),
            Err(e) => log::warn!("Skipping game {}: {}", game_id, e),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const GAME: GameId = GameId(2023020350);

    struct FixtureSource {
        schedule: Vec<GameId>,
        games: HashMap<GameId, (Value, Option<Value>, String)>,
    }

    impl GameSource for FixtureSource {
        fn schedule(&self, _date: NaiveDate) -> Result<Vec<GameId>> {
            Ok(self.schedule.clone())
        }

        fn play_by_play(&self, game: GameId) -> Result<Value> {
            self.games
                .get(&game)
                .map(|(pbp, _, _)| pbp.clone())
                .ok_or_else(|| PbpError::Retrieval {
                    game_id: game,
                    message: "no fixture".to_string(),
                })
        }

        fn landing(&self, game: GameId) -> Result<Value> {
            self.games
                .get(&game)
                .and_then(|(_, landing, _)| landing.clone())
                .ok_or_else(|| PbpError::Retrieval {
                    game_id: game,
                    message: "no landing".to_string(),
                })
        }

        fn report_html(&self, season: i64, game: GameId) -> Result<String> {
            assert_eq!(season, 20232024);
            self.games
                .get(&game)
                .map(|(_, _, html)| html.clone())
                .ok_or_else(|| PbpError::Retrieval {
                    game_id: game,
                    message: "no report".to_string(),
                })
        }
    }

    fn player(team: i64, id: i64, first: &str, last: &str, number: u32, pos: &str) -> Value {
        json!({
            "teamId": team,
            "playerId": id,
            "firstName": {"default": first},
            "lastName": {"default": last},
            "sweaterNumber": number,
            "positionCode": pos
        })
    }

    fn play(id: i64, kind: &str, time: &str, details: Value) -> Value {
        json!({
            "eventId": id,
            "typeDescKey": kind,
            "periodDescriptor": {"number": 1, "periodType": "REG"},
            "timeInPeriod": time,
            "situationCode": "1551",
            "homeTeamDefendingSide": "left",
            "details": details
        })
    }

    fn play_by_play() -> Value {
        json!({
            "id": 2023020350,
            "season": 20232024,
            "gameType": 2,
            "gameDate": "2023-12-20",
            "venue": {"default": "Scotiabank Arena"},
            "homeTeam": {"id": 10, "abbrev": "TOR"},
            "awayTeam": {"id": 8, "abbrev": "MTL"},
            "plays": [
                play(1, "period-start", "00:00", json!({})),
                play(2, "faceoff", "00:00", json!({
                    "eventOwnerTeamId": 10, "winningPlayerId": 34, "losingPlayerId": 14,
                    "xCoord": 0, "yCoord": 0, "zoneCode": "N"
                })),
                play(3, "goal", "02:05", json!({
                    "eventOwnerTeamId": 10, "scoringPlayerId": 34, "assist1PlayerId": 44,
                    "shotType": "wrist", "xCoord": 77, "yCoord": -5, "zoneCode": "O"
                })),
                play(4, "hit", "03:00", json!({
                    "eventOwnerTeamId": 8, "hittingPlayerId": 20, "hitteePlayerId": 44
                })),
                play(5, "shot-on-goal", "05:00", json!({
                    "eventOwnerTeamId": 8, "shootingPlayerId": 14, "shotType": "wrist"
                })),
                play(6, "period-end", "20:00", json!({}))
            ],
            "rosterSpots": [
                player(10, 34, "Auston", "Matthews", 34, "C"),
                player(10, 44, "Morgan", "Rielly", 44, "D"),
                player(10, 60, "Joseph", "Woll", 60, "G"),
                player(8, 14, "Nick", "Suzuki", 14, "C"),
                player(8, 20, "Juraj", "Slafkovsky", 20, "L"),
                player(8, 75, "Jake", "Allen", 34, "G")
            ]
        })
    }

    fn landing() -> Value {
        json!({
            "season": 20232024,
            "summary": {"gameInfo": {
                "homeTeam": {"headCoach": {"default": "Sheldon Keefe"}},
                "awayTeam": {"headCoach": {"default": "Martin St. Louis"}}
            }}
        })
    }

    fn cells(values: [&str; 8]) -> String {
        let tds: String = values
            .iter()
            .map(|v| format!("<td class=\"bborder\">{}</td>", v))
            .collect();
        format!("<tr>{}</tr>", tds)
    }

    fn report() -> String {
        let away = "<font title=\"Center - NICK SUZUKI\">14</font>\
                    <font title=\"Goalie - JAKE ALLEN\">34</font>";
        let home = "<font title=\"Center - AUSTON MATTHEWS\">34</font>\
                    <font title=\"Defense - MORGAN RIELLY\">44</font>\
                    <font title=\"Goalie - JOSEPH WOLL\">60</font>";
        let goal = "TOR #34 MATTHEWS(1), Wrist, Off. Zone, 12 ft.Assists: #44 RIELLY(3)";
        let rows = [
            cells(["#", "Per", "Str", "Time:Elapsed Game", "Event", "Description", "MTL On Ice", "TOR On Ice"]),
            cells(["1", "1", "", "0:0020:00", "PGSTR", "Pre-game start", "", ""]),
            cells(["2", "1", "", "0:0020:00", "PSTR", "Period Start- Local time: 7:08 EST", away, home]),
            cells(["3", "1", "EV", "0:0020:00", "FAC", "TOR won Neu. Zone - MTL #14 SUZUKI vs TOR #34 MATTHEWS", away, home]),
            cells(["4", "1", "EV", "2:0517:55", "GOAL", goal, away, home]),
            cells(["4", "1", "EV", "2:0517:55", "GOAL", goal, away, home]),
            cells(["5", "1", "EV", "5:0015:00", "SHOT", "MTL ONGOAL - #14 SUZUKI, Wrist, Off. Zone, 30 ft.", away, home]),
            cells(["6", "1", "EV", "20:000:00", "PEND", "Period End- Local time: 7:48 EST", away, home]),
        ];
        format!("<html><body><table>{}</table></body></html>", rows.concat())
    }

    fn source(with_landing: bool) -> FixtureSource {
        let mut games = HashMap::new();
        games.insert(
            GAME,
            (play_by_play(), with_landing.then(landing), report()),
        );
        FixtureSource {
            schedule: vec![GAME],
            games,
        }
    }

    #[test]
    fn test_scrape_game_end_to_end() {
        let scrape = scrape_game(&source(true), GAME).unwrap();
        let events: Vec<&str> = scrape.rows.iter().map(|r| r.event.as_str()).collect();
        assert_eq!(
            events,
            vec!["period-start", "faceoff", "goal", "shot-on-goal", "period-end"]
        );

        let faceoff = &scrape.rows[1];
        assert_eq!(faceoff.event_primary_player.as_deref(), Some("AUSTON MATTHEWS"));
        assert_eq!(faceoff.event_secondary_player.as_deref(), Some("NICK SUZUKI"));

        let goal = &scrape.rows[2];
        assert_eq!(goal.game_seconds_elapsed, 125);
        assert_eq!(goal.home_score, 0);
        assert_eq!(goal.event_team.as_deref(), Some("TOR"));
        assert_eq!(goal.event_secondary_player.as_deref(), Some("MORGAN RIELLY"));
        assert_eq!(goal.event_tertiary_player, None);
        assert_eq!(goal.strength_rel.as_deref(), Some("5v5"));
        assert_eq!(goal.strength_cat_rel.as_deref(), Some("even"));
        assert_eq!(goal.is_shot_on_empty_net_rel, Some(0));
        assert_eq!(goal.home_skater2.as_deref(), Some("MORGAN RIELLY"));
        assert_eq!(goal.home_goalie.as_deref(), Some("JOSEPH WOLL"));
        assert_eq!(goal.away_goalie.as_deref(), Some("JAKE ALLEN"));
        assert_eq!(goal.home_coach.as_deref(), Some("SHELDON KEEFE"));
        assert_eq!(goal.game_date.as_deref(), Some("2023-12-20"));

        let shot = &scrape.rows[3];
        assert_eq!(shot.home_score, 1);
        assert_eq!(shot.away_score, 0);
        assert_eq!(shot.event_primary_player.as_deref(), Some("NICK SUZUKI"));

        assert_eq!(scrape.log.unmatched_events, 1);
        assert_eq!(scrape.log.unmatched_report_rows, 0);
        assert_eq!(scrape.log.duplicates_dropped, 1);
    }

    #[test]
    fn test_missing_landing_is_tolerated() {
        let scrape = scrape_game(&source(false), GAME).unwrap();
        assert_eq!(scrape.rows.len(), 5);
        assert_eq!(scrape.rows[0].home_coach, None);
        assert_eq!(scrape.rows[0].venue.as_deref(), Some("Scotiabank Arena"));
    }

    #[test]
    fn test_missing_roster_aborts_game() {
        let mut source = source(true);
        let entry = source.games.get_mut(&GAME).unwrap();
        if let Some(doc) = entry.0.as_object_mut() {
            doc.remove("rosterSpots");
        }
        assert!(matches!(
            scrape_game(&source, GAME),
            Err(PbpError::Schema(_))
        ));
    }

    #[test]
    fn test_scrape_date_skips_failed_games() {
        let mut source = source(true);
        source.schedule = vec![GameId(2023020349), GAME];
        let date = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        let rows = scrape_date(&source, date).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.game_id == GAME.0));
    }
}
