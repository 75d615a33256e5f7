//! Situation code decoding
//!
//! The feed's situation code is four digits:
//! away goalie on ice (0/1), away skaters, home skaters, home goalie on ice (0/1).

use std::fmt;

use super::{Event, Side, Situation};
use crate::data::source::GameMeta;
use crate::{GameType, PbpError, Result};

/// Period number the regular season uses for the shootout
const SHOOTOUT_PERIOD: u8 = 5;

/// Parsed four-digit situation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SituationCode {
    raw: String,
    pub away_goalie: u8,
    pub away_skaters: u8,
    pub home_skaters: u8,
    pub home_goalie: u8,
}

impl Default for SituationCode {
    fn default() -> Self {
        SituationCode {
            raw: "0000".to_string(),
            away_goalie: 0,
            away_skaters: 0,
            home_skaters: 0,
            home_goalie: 0,
        }
    }
}

impl SituationCode {
    pub fn parse(code: &str) -> Result<Self> {
        let digits: Vec<u8> = code
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| PbpError::Parse(format!("situation code {:?} is not numeric", code)))?;

        match digits[..] {
            [away_goalie, away_skaters, home_skaters, home_goalie] => Ok(SituationCode {
                raw: code.to_string(),
                away_goalie,
                away_skaters,
                home_skaters,
                home_goalie,
            }),
            _ => Err(PbpError::Parse(format!(
                "situation code {:?} is not four digits",
                code
            ))),
        }
    }

    /// One skater facing one goalie: a penalty shot or a shootout attempt
    pub fn is_one_on_one(&self) -> bool {
        self.raw == "1010" || self.raw == "0101"
    }
}

impl fmt::Display for SituationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Strength from the owning team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthCategory {
    Even,
    Advantage,
    ShortHanded,
    PenaltyShot,
    ShootoutShot,
}

impl StrengthCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthCategory::Even => "even",
            StrengthCategory::Advantage => "advantage",
            StrengthCategory::ShortHanded => "short-handed",
            StrengthCategory::PenaltyShot => "penalty-shot",
            StrengthCategory::ShootoutShot => "shootout-shot",
        }
    }
}

impl fmt::Display for StrengthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode a situation for an event owned by `side`
pub fn decode(
    code: SituationCode,
    side: Option<Side>,
    period: u8,
    game_type: GameType,
    is_shot: bool,
) -> Situation {
    let home = code.home_skaters;
    let away = code.away_skaters;

    let strength_rel = side.map(|s| match s {
        Side::Home => format!("{}v{}", home, away),
        Side::Away => format!("{}v{}", away, home),
    });

    let mut category = match side {
        _ if home == away => Some(StrengthCategory::Even),
        Some(Side::Home) if home > away => Some(StrengthCategory::Advantage),
        Some(Side::Home) => Some(StrengthCategory::ShortHanded),
        Some(Side::Away) if away > home => Some(StrengthCategory::Advantage),
        Some(Side::Away) => Some(StrengthCategory::ShortHanded),
        None => None,
    };
    if code.is_one_on_one() {
        category = if period == SHOOTOUT_PERIOD && !game_type.is_playoff() {
            Some(StrengthCategory::ShootoutShot)
        } else {
            Some(StrengthCategory::PenaltyShot)
        };
    }

    // Empty net means the defending team's goalie bit is off
    let is_shot_on_empty_net_rel = is_shot.then(|| match side {
        Some(Side::Home) if code.away_goalie == 0 => 1,
        Some(Side::Away) if code.home_goalie == 0 => 1,
        _ => 0,
    });

    Situation {
        strength: format!("{}v{}", away, home),
        strength_rel,
        strength_cat_rel: category,
        is_shot_on_empty_net_rel,
        code,
    }
}

/// Decode every event's situation code. Absent codes read as "0000"; a
/// malformed code is logged and read the same way.
pub fn add_situations(events: Vec<Event>, meta: &GameMeta) -> Vec<Event> {
    events
        .into_iter()
        .map(|mut event| {
            let code = match event.play.situation_code.as_deref() {
                Some(raw) => SituationCode::parse(raw).unwrap_or_else(|e| {
                    log::warn!("Game {}: {}; using 0000", meta.game_id, e);
                    SituationCode::default()
                }),
                None => SituationCode::default(),
            };
            event.situation = decode(
                code,
                event.side(meta),
                event.play.period,
                meta.game_type,
                event.event.is_shot(),
            );
            event
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> SituationCode {
        SituationCode::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_code() {
        let c = code("1451");
        assert_eq!(c.away_goalie, 1);
        assert_eq!(c.away_skaters, 4);
        assert_eq!(c.home_skaters, 5);
        assert_eq!(c.home_goalie, 1);
        assert!(SituationCode::parse("15a1").is_err());
        assert!(SituationCode::parse("151").is_err());
    }

    #[test]
    fn test_zero_code_is_even() {
        let s = decode(SituationCode::default(), None, 1, GameType::REGULAR, false);
        assert_eq!(s.strength, "0v0");
        assert_eq!(s.strength_cat_rel, Some(StrengthCategory::Even));
        assert_eq!(s.strength_rel, None);
        assert_eq!(s.is_shot_on_empty_net_rel, None);
    }

    #[test]
    fn test_power_play_relative_strength() {
        let home_pp = decode(code("1451"), Some(Side::Home), 2, GameType::REGULAR, true);
        assert_eq!(home_pp.strength, "4v5");
        assert_eq!(home_pp.strength_rel.as_deref(), Some("5v4"));
        assert_eq!(home_pp.strength_cat_rel, Some(StrengthCategory::Advantage));

        let away_pk = decode(code("1451"), Some(Side::Away), 2, GameType::REGULAR, true);
        assert_eq!(away_pk.strength_rel.as_deref(), Some("4v5"));
        assert_eq!(away_pk.strength_cat_rel, Some(StrengthCategory::ShortHanded));
    }

    #[test]
    fn test_penalty_shot_and_shootout() {
        let s = decode(code("1010"), Some(Side::Home), 2, GameType::REGULAR, true);
        assert_eq!(s.strength_cat_rel, Some(StrengthCategory::PenaltyShot));

        let s = decode(code("1010"), Some(Side::Home), 5, GameType::REGULAR, true);
        assert_eq!(s.strength_cat_rel, Some(StrengthCategory::ShootoutShot));

        let s = decode(code("0101"), Some(Side::Away), 5, GameType::PLAYOFF, true);
        assert_eq!(s.strength_cat_rel, Some(StrengthCategory::PenaltyShot));
    }

    #[test]
    fn test_empty_net() {
        // away goalie pulled, home shoots
        let s = decode(code("0651"), Some(Side::Home), 3, GameType::REGULAR, true);
        assert_eq!(s.is_shot_on_empty_net_rel, Some(1));

        // away shoots at a home net that is still guarded
        let s = decode(code("0651"), Some(Side::Away), 3, GameType::REGULAR, true);
        assert_eq!(s.is_shot_on_empty_net_rel, Some(0));

        // not a shot
        let s = decode(code("0651"), Some(Side::Home), 3, GameType::REGULAR, false);
        assert_eq!(s.is_shot_on_empty_net_rel, None);
    }
}
