//! Outcome counters accumulated across a run.

use std::fmt;

use platform_grid_core::{Event, SpawnCause, SpawnOutcome};

/// Running totals of every lifecycle event and spawn outcome.
///
/// Counters persist across resets so a whole run can be summarized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Cells materialized for any cause.
    pub cells_spawned: u64,
    /// Early warnings fired.
    pub early_warnings: u64,
    /// Cells whose countdown reached zero.
    pub cells_expired: u64,
    /// Cells removed from the active set.
    pub cells_removed: u64,
    /// Spawns scheduled by the spawn scheduler.
    pub spawns_scheduled: u64,
    /// Spawn requests suppressed because the origin was already pending.
    pub duplicates_suppressed: u64,
    /// Scheduled spawns dropped at the active ceiling.
    pub admission_rejected: u64,
    /// Scheduled spawns dropped because every neighbor was occupied.
    pub no_free_slot: u64,
    /// Pending spawns cancelled by a reset.
    pub spawns_cancelled: u64,
    /// Corrective spawns placed after an expiry dropped below the floor.
    pub corrective_spawns: u64,
    /// Corrective spawns skipped because no adjacent slot was free.
    pub corrective_skipped: u64,
    /// Placements the world refused.
    pub placements_rejected: u64,
    /// Session resets.
    pub resets: u64,
}

impl SessionStats {
    pub(crate) fn record_event(&mut self, event: &Event) {
        match event {
            Event::CellSpawned { cause, .. } => {
                self.cells_spawned += 1;
                if *cause == SpawnCause::Corrective {
                    self.corrective_spawns += 1;
                }
            }
            Event::EarlyWarning { .. } => self.early_warnings += 1,
            Event::CellExpired { .. } => self.cells_expired += 1,
            Event::CellRemoved { .. } => self.cells_removed += 1,
            Event::PlacementRejected { .. } => self.placements_rejected += 1,
            Event::SessionReset => self.resets += 1,
            Event::SessionStarted { .. }
            | Event::TimeAdvanced { .. }
            | Event::PlayerPlaced { .. } => {}
        }
    }

    pub(crate) fn record_outcome(&mut self, outcome: &SpawnOutcome) {
        match outcome {
            SpawnOutcome::Scheduled { .. } => self.spawns_scheduled += 1,
            SpawnOutcome::DuplicateSuppressed { .. } => self.duplicates_suppressed += 1,
            SpawnOutcome::AdmissionRejected { .. } => self.admission_rejected += 1,
            SpawnOutcome::NoFreeSlot { .. } => self.no_free_slot += 1,
            SpawnOutcome::Cancelled { .. } => self.spawns_cancelled += 1,
            SpawnOutcome::Materialized { .. } => {}
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cells spawned:          {}", self.cells_spawned)?;
        writeln!(f, "  corrective:           {}", self.corrective_spawns)?;
        writeln!(f, "early warnings:         {}", self.early_warnings)?;
        writeln!(f, "cells expired:          {}", self.cells_expired)?;
        writeln!(f, "spawns scheduled:       {}", self.spawns_scheduled)?;
        writeln!(f, "duplicates suppressed:  {}", self.duplicates_suppressed)?;
        writeln!(f, "admission drops:        {}", self.admission_rejected)?;
        writeln!(f, "no-slot drops:          {}", self.no_free_slot)?;
        writeln!(f, "cancelled by reset:     {}", self.spawns_cancelled)?;
        writeln!(f, "corrective skipped:     {}", self.corrective_skipped)?;
        writeln!(f, "placements rejected:    {}", self.placements_rejected)?;
        write!(f, "resets:                 {}", self.resets)
    }
}

#[cfg(test)]
mod tests {
    use platform_grid_core::{CellId, GridCoord};
    use std::time::Duration;

    use super::*;

    #[test]
    fn corrective_spawns_count_twice() {
        let mut stats = SessionStats::default();
        stats.record_event(&Event::CellSpawned {
            cell: CellId::new(1),
            coord: GridCoord::ORIGIN,
            lifetime: Duration::from_secs(1),
            cause: SpawnCause::Corrective,
        });
        assert_eq!(stats.cells_spawned, 1);
        assert_eq!(stats.corrective_spawns, 1);
    }

    #[test]
    fn materialized_outcomes_are_counted_through_events() {
        let mut stats = SessionStats::default();
        stats.record_outcome(&SpawnOutcome::Materialized {
            origin: GridCoord::ORIGIN,
            coord: GridCoord::new(0, 1),
        });
        assert_eq!(stats, SessionStats::default());
    }
}
