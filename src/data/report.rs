//! HTML play-by-play report parser
//!
//! The report is a flat run of `td.bborder` cells, eight per event row:
//! number, period, strength, time, event code, description, away on ice,
//! home on ice. On-ice cells hold one `<font title="Position - Name">` per
//! player.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::directory::Directory;
use crate::features::timeline::{game_seconds, parse_clock};
use crate::pipeline::RunLog;
use crate::EventType;

const CELLS_PER_ROW: usize = 8;

/// Skater slots per side in the output
pub const SKATER_SLOTS: usize = 6;

/// Event codes that have no counterpart in the events feed
const NON_EVENT_CODES: [&str; 4] = ["PGSTR", "PGEND", "ANTHEM", "Event"];

/// Codes whose description names no acting player
const NO_ACTOR_CODES: [&str; 12] = [
    "PGSTR", "PGEND", "ANTHEM", "PSTR", "GEND", "STOP", "PEND", "DELPEN", "SOC", "CHL", "EIEND",
    "EISTR",
];

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td[class*='bborder']").expect("static selector"));
static PLAYER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("font").expect("static selector"));
static SERVED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"By:\s*#?(\d+)").expect("static regex"));

/// Players on the ice for one side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideOnIce {
    pub skaters: [Option<String>; SKATER_SLOTS],
    pub goalie: Option<String>,
}

/// Players on the ice for both sides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnIce {
    pub home: SideOnIce,
    pub away: SideOnIce,
}

/// One event row of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub period: u8,
    /// Elapsed "MM:SS" in the period
    pub time_in_period: String,
    /// `None` for codes with no feed equivalent; such rows never join
    pub event: Option<EventType>,
    /// Cell text as published, non-breaking spaces included
    pub description: String,
    pub primary_player: Option<String>,
    pub on_ice: OnIce,
    pub game_seconds: u32,
}

/// Parse every event row of a report document
pub fn parse_report(document: &Html, directory: &Directory, log: &mut RunLog) -> Vec<ReportRow> {
    let cells: Vec<ElementRef> = document.select(&CELL_SELECTOR).collect();
    let mut rows = Vec::new();

    for chunk in cells.chunks(CELLS_PER_ROW) {
        let [num, period, _strength, time, code, description, away, home] = chunk else {
            log.skip_report_row(&format!("trailing chunk of {} cells", chunk.len()));
            continue;
        };

        let code = cell_text(code);
        if NON_EVENT_CODES.contains(&code.as_str()) {
            continue;
        }

        let period = match cell_text(period).parse::<u8>() {
            Ok(p) => p,
            Err(_) => {
                log.skip_report_row(&format!("bad period in event {}", cell_text(num)));
                continue;
            }
        };
        let Some(time_in_period) = clean_time(&cell_text(time)) else {
            log.skip_report_row(&format!("bad time in event {}", cell_text(num)));
            continue;
        };
        let Ok(period_seconds) = parse_clock(&time_in_period) else {
            log.skip_report_row(&format!("bad time in event {}", cell_text(num)));
            continue;
        };

        let description = cell_text(description);
        let primary_player = extract_event_primary_player(&code, &description, directory);
        if primary_player.is_none() && !NO_ACTOR_CODES.contains(&code.as_str()) {
            log.unresolved_actor(&code, &description);
        }

        rows.push(ReportRow {
            period,
            time_in_period,
            event: EventType::from_report_code(&code),
            description,
            primary_player,
            on_ice: OnIce {
                home: on_ice_players(home),
                away: on_ice_players(away),
            },
            game_seconds: game_seconds(period, period_seconds),
        });
    }

    log::debug!("Parsed {} report rows", rows.len());
    rows
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Keep the elapsed part of a time cell.
///
/// The cell renders elapsed and remaining time back to back ("5:3214:28"),
/// so the elapsed seconds are the first two digits after the first colon.
/// Minutes are zero-padded to two digits.
pub fn clean_time(raw: &str) -> Option<String> {
    let mut parts = raw.split(':');
    let minutes = parts.next()?.trim();
    let seconds = parts.next()?.get(..2)?;
    if minutes.is_empty() {
        return None;
    }
    Some(format!("{:0>2}:{}", minutes, seconds))
}

/// Names from an on-ice cell. Goalies take the goalie slot; skaters fill
/// slots 1 to 6 in order of appearance.
fn on_ice_players(cell: &ElementRef) -> SideOnIce {
    let mut side = SideOnIce::default();
    let mut slot = 0;
    for player in cell.select(&PLAYER_SELECTOR) {
        let Some((position, name)) = player
            .value()
            .attr("title")
            .and_then(|title| title.split_once(" - "))
        else {
            continue;
        };
        let name = name.trim().to_string();
        if position.trim() == "Goalie" {
            side.goalie = Some(name);
        } else if slot < SKATER_SLOTS {
            side.skaters[slot] = Some(name);
            slot += 1;
        } else {
            log::warn!("More than {} skaters on ice; dropping {}", SKATER_SLOTS, name);
        }
    }
    side
}

/// Resolve the acting player named in a report description.
///
/// Descriptions name players as "{TEAM} #{NUMBER} NAME". Where the number
/// sits depends on the event code:
/// - HIT, MISS, BLOCK, PENL, GOAL: second token, or after "By:" when the
///   penalty was served by someone else
/// - GIVE, TAKE, SHOT: fourth token
/// - FAC: the winner's number, seventh token, or the number after "vs " when
///   the winning team is listed second
///
/// Anything that does not fit yields `None`.
pub fn extract_event_primary_player(
    code: &str,
    description: &str,
    directory: &Directory,
) -> Option<String> {
    if NO_ACTOR_CODES.contains(&code) {
        return None;
    }

    let description = description.replace('\u{a0}', " ");
    let tokens: Vec<&str> = description.split(' ').collect();
    let team = *tokens.first()?;

    let number = match code {
        "HIT" | "MISS" | "BLOCK" | "PENL" | "GOAL" => {
            if description.contains("Served") {
                SERVED_BY.captures(&description)?.get(1)?.as_str()
            } else {
                *tokens.get(1)?
            }
        }
        "GIVE" | "TAKE" | "SHOT" => *tokens.get(3)?,
        "FAC" => {
            if tokens.get(5) == Some(&team) {
                *tokens.get(6)?
            } else {
                // winner listed second, or a multi-word zone/name shifted the tokens
                description.split("vs ").nth(1)?.split(' ').nth(1)?
            }
        }
        _ => return None,
    };

    let number: u32 = number.trim_start_matches('#').parse().ok()?;
    directory.name_by_number(number, team).map(str::to_string)
}
