//! Per-game diagnostics
//!
//! Owned by one pipeline run and handed to the stages that recover locally,
//! so skipped rows and join losses are counted instead of vanishing.

use serde::Serialize;

use crate::GameId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunLog {
    pub game_id: GameId,
    /// Report rows dropped before the join (malformed cells)
    pub report_rows_skipped: usize,
    /// Report rows whose description named no resolvable player
    pub actors_unresolved: usize,
    /// Feed events with no matching report row
    pub unmatched_events: usize,
    /// Report rows with no matching feed event
    pub unmatched_report_rows: usize,
    /// Joined rows collapsed by the duplicate filter
    pub duplicates_dropped: usize,
}

impl RunLog {
    pub fn new(game_id: GameId) -> Self {
        RunLog {
            game_id,
            ..Default::default()
        }
    }

    pub fn skip_report_row(&mut self, reason: &str) {
        self.report_rows_skipped += 1;
        log::warn!("Game {}: skipping report row ({})", self.game_id, reason);
    }

    pub fn unresolved_actor(&mut self, code: &str, description: &str) {
        self.actors_unresolved += 1;
        log::debug!(
            "Game {}: no player resolved for {} {:?}",
            self.game_id,
            code,
            description
        );
    }

    pub fn record_join(&mut self, unmatched_events: usize, unmatched_report_rows: usize, duplicates: usize) {
        self.unmatched_events += unmatched_events;
        self.unmatched_report_rows += unmatched_report_rows;
        self.duplicates_dropped += duplicates;
        if unmatched_events > 0 || unmatched_report_rows > 0 {
            log::warn!(
                "Game {}: join dropped {} feed events and {} report rows",
                self.game_id,
                unmatched_events,
                unmatched_report_rows
            );
        }
    }

    /// One-line summary for the end of a run
    pub fn summary(&self) -> String {
        format!(
            "game {}: {} report rows skipped, {} unresolved actors, {} feed / {} report rows unmatched, {} duplicates",
            self.game_id,
            self.report_rows_skipped,
            self.actors_unresolved,
            self.unmatched_events,
            self.unmatched_report_rows,
            self.duplicates_dropped
        )
    }
}
