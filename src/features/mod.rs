//! Event enrichment stages
//!
//! Each stage takes the event table by value and returns the enriched table:
//! attribution, score, situation, elapsed time and the shootout correction.

pub mod attribution;
pub mod situation;
pub mod timeline;

pub use attribution::attribute;
pub use situation::{SituationCode, StrengthCategory};

use crate::data::report::OnIce;
use crate::data::source::{GameMeta, Play};
use crate::{EventType, PlayerId};

/// Which side of the game a team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Resolve a team abbreviation against the game's two teams
    pub fn of(team: Option<&str>, meta: &GameMeta) -> Option<Side> {
        match team {
            Some(t) if t == meta.home_team.abbrev => Some(Side::Home),
            Some(t) if t == meta.away_team.abbrev => Some(Side::Away),
            _ => None,
        }
    }
}

/// Players credited with an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Actors {
    pub primary_id: Option<PlayerId>,
    pub secondary_id: Option<PlayerId>,
    pub tertiary_id: Option<PlayerId>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
}

/// Elapsed time at the event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub period_seconds: u32,
    pub game_seconds: u32,
}

impl Clock {
    pub fn period_minutes(&self) -> f64 {
        self.period_seconds as f64 / 60.0
    }

    pub fn game_minutes(&self) -> f64 {
        self.game_seconds as f64 / 60.0
    }
}

/// Score immediately before the event resolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// Decoded on-ice strength at the event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Situation {
    pub code: SituationCode,
    /// "{away skaters}v{home skaters}"
    pub strength: String,
    /// Skaters from the owning team's perspective
    pub strength_rel: Option<String>,
    pub strength_cat_rel: Option<StrengthCategory>,
    /// Only set for shot attempts
    pub is_shot_on_empty_net_rel: Option<u8>,
}

/// One row of the event table as it moves through the stages
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub play: Play,
    /// Current classification; starts as the feed's type and is rewritten by
    /// the merge normalization and the shootout correction
    pub event: EventType,
    pub actors: Actors,
    pub event_team: Option<String>,
    pub score: Score,
    pub situation: Situation,
    pub clock: Clock,
    /// Filled in from the report at merge time
    pub description: Option<String>,
    pub on_ice: OnIce,
}

impl Event {
    pub fn new(play: Play) -> Self {
        Event {
            event: play.event.clone(),
            play,
            actors: Actors::default(),
            event_team: None,
            score: Score::default(),
            situation: Situation::default(),
            clock: Clock::default(),
            description: None,
            on_ice: OnIce::default(),
        }
    }

    pub fn side(&self, meta: &GameMeta) -> Option<Side> {
        Side::of(self.event_team.as_deref(), meta)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::source::PlayDetails;

    /// Minimal play for stage tests
    pub(crate) fn play(event: &str, period: u8, time: &str) -> Play {
        Play {
            event_id: None,
            event: EventType::from_key(event),
            period,
            period_type: Some("REG".to_string()),
            time_in_period: time.to_string(),
            situation_code: Some("1551".to_string()),
            home_team_def_side: None,
            details: PlayDetails::default(),
        }
    }

    #[test]
    fn test_clock_minutes() {
        let clock = Clock {
            period_seconds: 90,
            game_seconds: 1290,
        };
        assert!((clock.period_minutes() - 1.5).abs() < 1e-9);
        assert!((clock.game_minutes() - 21.5).abs() < 1e-9);
    }
}
