//! Event attribution
//!
//! Picks the credited players out of the event-type-specific detail fields
//! and assigns the owning team.

use super::{Actors, Event};
use crate::data::directory::Directory;
use crate::data::source::Play;
use crate::{EventType, PlayerId};

/// Build the event table with actors and owning team resolved
pub fn attribute(plays: Vec<Play>, directory: &Directory) -> Vec<Event> {
    plays
        .into_iter()
        .map(|play| {
            let actors = resolve_actors(&play, directory);
            let event_team = event_team(&play, directory);
            Event {
                actors,
                event_team,
                ..Event::new(play)
            }
        })
        .collect()
}

/// Primary, secondary and tertiary actor ids for a play.
///
/// `failed-shot-attempt` is kept distinct from `missed-shot` here; the two
/// only merge when the report is joined.
pub fn actor_ids(play: &Play) -> [Option<PlayerId>; 3] {
    let d = &play.details;
    match play.event {
        EventType::Goal => [d.scoring_player_id, d.assist1_player_id, d.assist2_player_id],
        EventType::ShotOnGoal | EventType::MissedShot | EventType::FailedShotAttempt => {
            [d.shooting_player_id, None, None]
        }
        EventType::BlockedShot => [d.shooting_player_id, d.blocking_player_id, None],
        EventType::Hit => [d.hitting_player_id, d.hittee_player_id, None],
        EventType::Faceoff => [d.winning_player_id, d.losing_player_id, None],
        EventType::Giveaway | EventType::Takeaway => [d.player_id, None, None],
        EventType::Penalty => [
            d.served_by_player_id.or(d.committed_by_player_id),
            d.drawn_by_player_id,
            None,
        ],
        _ => [None, None, None],
    }
}

fn resolve_actors(play: &Play, directory: &Directory) -> Actors {
    let [primary_id, secondary_id, tertiary_id] = actor_ids(play);
    let name = |id: Option<PlayerId>| {
        id.and_then(|id| directory.player_name(id))
            .map(str::to_string)
    };
    Actors {
        primary: name(primary_id),
        secondary: name(secondary_id),
        tertiary: name(tertiary_id),
        primary_id,
        secondary_id,
        tertiary_id,
    }
}

/// Owning team abbreviation. The feed credits blocked shots to the blocker's
/// team; they belong to the shooter's.
fn event_team(play: &Play, directory: &Directory) -> Option<String> {
    let owner = if play.event == EventType::BlockedShot {
        play.details
            .shooting_player_id
            .and_then(|shooter| directory.player_team(shooter))
    } else {
        play.details.event_owner_team_id
    };
    owner
        .and_then(|team| directory.team_abbrev(team))
        .map(str::to_string)
}
