//! Join of the feed's event table with the report rows
//!
//! Key: (game seconds, event type, primary player). Inner join; rows
//! unmatched on either side are dropped and counted in the run log. Period,
//! strength and clock come from the feed; the report contributes only the
//! description and the on-ice players.

use std::collections::{HashMap, HashSet};

use super::RunLog;
use crate::data::report::ReportRow;
use crate::features::Event;
use crate::EventType;

type JoinKey = (u32, EventType, Option<String>);

/// The report has no separate failed-shot-attempt code; it writes those as
/// misses.
pub fn normalize_event_types(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|mut event| {
            if event.event == EventType::FailedShotAttempt {
                event.event = EventType::MissedShot;
            }
            event
        })
        .collect()
}

/// Inner-join events with report rows. Output follows event order, then
/// report order for an event with several matches.
pub fn join(events: Vec<Event>, report: &[ReportRow], log: &mut RunLog) -> Vec<Event> {
    let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
    for (i, row) in report.iter().enumerate() {
        if let Some(event) = &row.event {
            index
                .entry((row.game_seconds, event.clone(), row.primary_player.clone()))
                .or_default()
                .push(i);
        }
    }

    let mut matched = vec![false; report.len()];
    let mut unmatched_events = 0;
    let mut merged = Vec::with_capacity(events.len());

    for event in events {
        let key = (
            event.clock.game_seconds,
            event.event.clone(),
            event.actors.primary.clone(),
        );
        let Some(rows) = index.get(&key) else {
            unmatched_events += 1;
            continue;
        };
        for &i in rows {
            matched[i] = true;
            let row = &report[i];
            merged.push(Event {
                description: Some(row.description.clone()),
                on_ice: row.on_ice.clone(),
                ..event.clone()
            });
        }
    }

    let unmatched_report_rows = matched.iter().filter(|m| !**m).count();
    let before = merged.len();
    let merged = drop_duplicates(merged);
    log.record_join(unmatched_events, unmatched_report_rows, before - merged.len());
    merged
}

/// Keep the first row for each (description, game seconds, primary player).
/// Coincident penalties share a second and a type, so two keys are not enough.
pub fn drop_duplicates(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|e| {
            seen.insert((
                e.description.clone(),
                e.clock.game_seconds,
                e.actors.primary.clone(),
            ))
        })
        .collect()
}

/// Normalize, join and de-duplicate
pub fn reconcile(events: Vec<Event>, report: &[ReportRow], log: &mut RunLog) -> Vec<Event> {
    join(normalize_event_types(events), report, log)
}
