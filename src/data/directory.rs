//! Per-game participant lookups
//!
//! Built once from the roster table and shared read-only by every stage
//! that needs to turn an id or a sweater number into a player name.

use std::collections::HashMap;

use super::source::{GameMeta, RosterSpot};
use crate::{PlayerId, TeamId};

/// Lookup tables for one game's participants
#[derive(Debug, Clone, Default)]
pub struct Directory {
    teams: HashMap<TeamId, String>,
    names: HashMap<PlayerId, String>,
    player_teams: HashMap<PlayerId, TeamId>,
    by_number: HashMap<(u32, String), String>,
}

impl Directory {
    /// Build lookups from the roster and the two team references
    pub fn build(meta: &GameMeta, roster: &[RosterSpot]) -> Self {
        let teams: HashMap<TeamId, String> = [
            (meta.home_team.id, meta.home_team.abbrev.clone()),
            (meta.away_team.id, meta.away_team.abbrev.clone()),
        ]
        .into_iter()
        .collect();

        let mut directory = Directory {
            teams,
            ..Default::default()
        };

        for spot in roster {
            // "FIRST LAST", upper-cased
            let name = format!("{} {}", spot.first_name.default, spot.last_name.default)
                .trim()
                .to_uppercase();
            directory.player_teams.insert(spot.player_id, spot.team_id);
            let team = directory.teams.get(&spot.team_id).cloned();
            if let (Some(number), Some(team)) = (spot.sweater_number, team) {
                directory.by_number.insert((number, team), name.clone());
            }
            directory.names.insert(spot.player_id, name);
        }

        log::debug!(
            "Directory built: {} participants, {} teams",
            directory.names.len(),
            directory.teams.len()
        );
        directory
    }

    /// Team abbreviation for a team id
    pub fn team_abbrev(&self, team: TeamId) -> Option<&str> {
        self.teams.get(&team).map(String::as_str)
    }

    pub fn player_name(&self, player: PlayerId) -> Option<&str> {
        self.names.get(&player).map(String::as_str)
    }

    pub fn player_team(&self, player: PlayerId) -> Option<TeamId> {
        self.player_teams.get(&player).copied()
    }

    /// Player name for a sweater number on a team, as written in the report
    pub fn name_by_number(&self, number: u32, team: &str) -> Option<&str> {
        self.by_number
            .get(&(number, team.to_string()))
            .map(String::as_str)
    }
}
