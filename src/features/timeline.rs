//! Elapsed time and running score
//!
//! Scores stored on an event are the score before that event resolves, so a
//! goal row carries the scorer's pre-goal total.

use super::{Clock, Event, Score, Side, StrengthCategory};
use crate::data::source::GameMeta;
use crate::{EventType, PbpError, Result};

/// Every period, overtime included, is counted as 20 minutes of game time
const PERIOD_SECONDS: u32 = 1200;

/// Overtime period whose end freezes the score before a shootout
const OVERTIME_PERIOD: u8 = 4;

/// Seconds elapsed for a "MM:SS" period clock
pub fn parse_clock(time: &str) -> Result<u32> {
    let (minutes, seconds) = time
        .trim()
        .split_once(':')
        .ok_or_else(|| PbpError::Parse(format!("clock {:?} is not MM:SS", time)))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| PbpError::Parse(format!("bad minutes in clock {:?}", time)))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| PbpError::Parse(format!("bad seconds in clock {:?}", time)))?;
    Ok(minutes * 60 + seconds)
}

/// Game seconds for a time within a period
pub fn game_seconds(period: u8, period_seconds: u32) -> u32 {
    period_seconds + u32::from(period.saturating_sub(1)) * PERIOD_SECONDS
}

/// Fill period and game clocks from `time_in_period`
pub fn add_elapsed_time(events: Vec<Event>) -> Result<Vec<Event>> {
    events
        .into_iter()
        .map(|mut event| {
            let period_seconds = parse_clock(&event.play.time_in_period)?;
            event.clock = Clock {
                period_seconds,
                game_seconds: game_seconds(event.play.period, period_seconds),
            };
            Ok(event)
        })
        .collect()
}

/// Running score in table order
pub fn add_scores(events: Vec<Event>, meta: &GameMeta) -> Vec<Event> {
    let mut running = Score::default();
    events
        .into_iter()
        .map(|mut event| {
            event.score = running;
            if event.event == EventType::Goal {
                match event.side(meta) {
                    Some(Side::Home) => running.home += 1,
                    Some(Side::Away) => running.away += 1,
                    None => {}
                }
            }
            event
        })
        .collect()
}

/// Rewrite scores for a game decided in a shootout.
///
/// Shootout attempts keep the score at the end of overtime, their goals
/// become `shootout-goal`, and the game-end row credits the shootout winner
/// with one extra goal. A game without a `shootout-complete` event is
/// returned unchanged.
pub fn apply_shootout(mut events: Vec<Event>, meta: &GameMeta) -> Result<Vec<Event>> {
    if !events
        .iter()
        .any(|e| e.event == EventType::ShootoutComplete)
    {
        return Ok(events);
    }

    let frozen = events
        .iter()
        .find(|e| e.event == EventType::PeriodEnd && e.play.period == OVERTIME_PERIOD)
        .map(|e| e.score.home)
        .ok_or_else(|| {
            PbpError::Schema(format!(
                "game {} has a shootout but no overtime period-end",
                meta.game_id
            ))
        })?;

    let (mut home_goals, mut away_goals) = (0usize, 0usize);
    for event in events
        .iter_mut()
        .filter(|e| e.situation.strength_cat_rel == Some(StrengthCategory::ShootoutShot))
    {
        event.score = Score {
            home: frozen,
            away: frozen,
        };
        if event.event == EventType::Goal {
            event.event = EventType::ShootoutGoal;
            match event.side(meta) {
                Some(Side::Home) => home_goals += 1,
                Some(Side::Away) => away_goals += 1,
                None => {}
            }
        }
    }

    let final_score = match home_goals.cmp(&away_goals) {
        std::cmp::Ordering::Greater => Score {
            home: frozen + 1,
            away: frozen,
        },
        std::cmp::Ordering::Less => Score {
            home: frozen,
            away: frozen + 1,
        },
        std::cmp::Ordering::Equal => {
            return Err(PbpError::ShootoutTie {
                home: home_goals,
                away: away_goals,
            })
        }
    };
    log::debug!(
        "Game {}: shootout {}-{}, final {}-{}",
        meta.game_id,
        home_goals,
        away_goals,
        final_score.home,
        final_score.away
    );

    for event in events.iter_mut().filter(|e| e.event == EventType::GameEnd) {
        event.score = final_score;
    }
    Ok(events)
}
