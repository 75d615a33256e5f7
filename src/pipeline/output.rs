//! Final column projection and writers

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::data::source::GameMeta;
use crate::features::Event;
use crate::Result;

/// Output columns, in order
pub const COLUMNS: [&str; 51] = [
    "game_id",
    "game_season",
    "game_date",
    "game_type",
    "venue",
    "home_team",
    "away_team",
    "home_coach",
    "away_coach",
    "period",
    "period_type",
    "period_minutes_elapsed",
    "period_seconds_elapsed",
    "game_minutes_elapsed",
    "game_seconds_elapsed",
    "event",
    "event_team",
    "shot_type",
    "description",
    "x_coordinate",
    "y_coordinate",
    "zone",
    "is_shot_on_empty_net_rel",
    "home_team_def_side",
    "home_score",
    "away_score",
    "event_primary_player",
    "event_secondary_player",
    "event_tertiary_player",
    "situation_code",
    "home_skaters_on_ice",
    "away_skaters_on_ice",
    "home_goalie_on_ice",
    "away_goalie_on_ice",
    "strength",
    "strength_rel",
    "strength_cat_rel",
    "home_skater1",
    "home_skater2",
    "home_skater3",
    "home_skater4",
    "home_skater5",
    "home_skater6",
    "home_goalie",
    "away_skater1",
    "away_skater2",
    "away_skater3",
    "away_skater4",
    "away_skater5",
    "away_skater6",
    "away_goalie",
];

/// One reconciled play-by-play event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PbpRow {
    pub game_id: i64,
    pub game_season: Option<i64>,
    pub game_date: Option<String>,
    pub game_type: u8,
    pub venue: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_coach: Option<String>,
    pub away_coach: Option<String>,
    pub period: u8,
    pub period_type: Option<String>,
    pub period_minutes_elapsed: f64,
    pub period_seconds_elapsed: u32,
    pub game_minutes_elapsed: f64,
    pub game_seconds_elapsed: u32,
    pub event: String,
    pub event_team: Option<String>,
    pub shot_type: Option<String>,
    pub description: Option<String>,
    pub x_coordinate: Option<f64>,
    pub y_coordinate: Option<f64>,
    pub zone: Option<String>,
    pub is_shot_on_empty_net_rel: Option<u8>,
    pub home_team_def_side: Option<String>,
    pub home_score: u32,
    pub away_score: u32,
    pub event_primary_player: Option<String>,
    pub event_secondary_player: Option<String>,
    pub event_tertiary_player: Option<String>,
    pub situation_code: String,
    pub home_skaters_on_ice: u8,
    pub away_skaters_on_ice: u8,
    pub home_goalie_on_ice: u8,
    pub away_goalie_on_ice: u8,
    pub strength: String,
    pub strength_rel: Option<String>,
    pub strength_cat_rel: Option<String>,
    pub home_skater1: Option<String>,
    pub home_skater2: Option<String>,
    pub home_skater3: Option<String>,
    pub home_skater4: Option<String>,
    pub home_skater5: Option<String>,
    pub home_skater6: Option<String>,
    pub home_goalie: Option<String>,
    pub away_skater1: Option<String>,
    pub away_skater2: Option<String>,
    pub away_skater3: Option<String>,
    pub away_skater4: Option<String>,
    pub away_skater5: Option<String>,
    pub away_skater6: Option<String>,
    pub away_goalie: Option<String>,
}

impl PbpRow {
    pub fn from_event(event: &Event, meta: &GameMeta) -> Self {
        let play = &event.play;
        let code = &event.situation.code;
        let [h1, h2, h3, h4, h5, h6] = event.on_ice.home.skaters.clone();
        let [a1, a2, a3, a4, a5, a6] = event.on_ice.away.skaters.clone();

        PbpRow {
            game_id: meta.game_id.0,
            game_season: meta.season,
            game_date: meta.game_date.clone(),
            game_type: meta.game_type.0,
            venue: meta.venue.clone(),
            home_team: meta.home_team.abbrev.clone(),
            away_team: meta.away_team.abbrev.clone(),
            home_coach: meta.home_coach.clone(),
            away_coach: meta.away_coach.clone(),
            period: play.period,
            period_type: play.period_type.clone(),
            period_minutes_elapsed: event.clock.period_minutes(),
            period_seconds_elapsed: event.clock.period_seconds,
            game_minutes_elapsed: event.clock.game_minutes(),
            game_seconds_elapsed: event.clock.game_seconds,
            event: event.event.to_string(),
            event_team: event.event_team.clone(),
            shot_type: play.details.shot_type.clone(),
            description: event.description.clone(),
            x_coordinate: play.details.x_coord,
            y_coordinate: play.details.y_coord,
            zone: play.details.zone_code.clone(),
            is_shot_on_empty_net_rel: event.situation.is_shot_on_empty_net_rel,
            home_team_def_side: play.home_team_def_side.clone(),
            home_score: event.score.home,
            away_score: event.score.away,
            event_primary_player: event.actors.primary.clone(),
            event_secondary_player: event.actors.secondary.clone(),
            event_tertiary_player: event.actors.tertiary.clone(),
            situation_code: code.to_string(),
            home_skaters_on_ice: code.home_skaters,
            away_skaters_on_ice: code.away_skaters,
            home_goalie_on_ice: code.home_goalie,
            away_goalie_on_ice: code.away_goalie,
            strength: event.situation.strength.clone(),
            strength_rel: event.situation.strength_rel.clone(),
            strength_cat_rel: event
                .situation
                .strength_cat_rel
                .map(|c| c.as_str().to_string()),
            home_skater1: h1,
            home_skater2: h2,
            home_skater3: h3,
            home_skater4: h4,
            home_skater5: h5,
            home_skater6: h6,
            home_goalie: event.on_ice.home.goalie.clone(),
            away_skater1: a1,
            away_skater2: a2,
            away_skater3: a3,
            away_skater4: a4,
            away_skater5: a5,
            away_skater6: a6,
            away_goalie: event.on_ice.away.goalie.clone(),
        }
    }

    /// Cell values in `COLUMNS` order; nulls become empty strings
    pub fn to_record(&self) -> Result<Vec<String>> {
        let value = serde_json::to_value(self)?;
        Ok(COLUMNS
            .iter()
            .map(|column| match value.get(column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_record<W: Write>(w: &mut W, record: &[String]) -> std::io::Result<()> {
    let line: Vec<String> = record
        .iter()
        .map(|cell| {
            if needs_quotes(cell) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect();
    writeln!(w, "{}", line.join(","))
}

/// Write rows as CSV with a header line
pub fn write_csv<W: Write>(mut w: W, rows: &[PbpRow]) -> Result<()> {
    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    write_record(&mut w, &header)?;
    for row in rows {
        write_record(&mut w, &row.to_record()?)?;
    }
    Ok(())
}

/// Write rows as a pretty-printed JSON array
pub fn write_json<W: Write>(w: W, rows: &[PbpRow]) -> Result<()> {
    serde_json::to_writer_pretty(w, rows)?;
    Ok(())
}

/// Compact one-line-per-event summary for the terminal
pub fn format_table(rows: &[PbpRow]) -> String {
    let mut out = format!(
        "{:<12} {:>3} {:>5}  {:<18} {:<4} {:>5}  {:<6} {}\n",
        "GAME", "PER", "TIME", "EVENT", "TEAM", "SCORE", "STR", "PLAYER"
    );
    out.push_str(&"─".repeat(80));
    out.push('\n');

    for row in rows {
        let clock = format!(
            "{:02}:{:02}",
            row.period_seconds_elapsed / 60,
            row.period_seconds_elapsed % 60
        );
        out.push_str(&format!(
            "{:<12} {:>3} {:>5}  {:<18} {:<4} {:>5}  {:<6} {}\n",
            row.game_id,
            row.period,
            clock,
            row.event,
            row.event_team.as_deref().unwrap_or("-"),
            format!("{}-{}", row.away_score, row.home_score),
            row.strength,
            row.event_primary_player.as_deref().unwrap_or("")
        ));
    }
    out
}
