#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduler that turns early warnings into delayed neighbor placements.
//!
//! Every early warning asks for one spawn keyed by the warning cell's
//! coordinate. A key that is already pending suppresses the request. Once the
//! configured interval elapses the scheduler re-validates admission against the
//! current occupancy and either emits a placement command or drops the spawn.
//! A session reset cancels everything still pending.

use std::time::Duration;

use platform_grid_core::{
    Command, Direction, Event, GridCoord, NeighborOrder, OccupancyView, PendingSpawnSnapshot,
    SpawnCause, SpawnOutcome, ValidatedConfig,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

const SHUFFLE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Configuration parameters required to construct the spawn scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    neighbor_order: NeighborOrder,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided delay, candidate order and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, neighbor_order: NeighborOrder, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            neighbor_order,
            rng_seed,
        }
    }
}

impl From<&ValidatedConfig> for Config {
    fn from(config: &ValidatedConfig) -> Self {
        Self::new(
            config.spawn_interval(),
            config.neighbor_order(),
            config.seed() ^ SHUFFLE_SEED_SALT,
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    origin: GridCoord,
    remaining: Duration,
}

impl PendingSpawn {
    fn is_due(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Pure system that schedules, deduplicates and materializes neighbor spawns.
#[derive(Debug)]
pub struct SpawnScheduler {
    spawn_interval: Duration,
    neighbor_order: NeighborOrder,
    rng: ChaCha8Rng,
    pending: Vec<PendingSpawn>,
}

impl SpawnScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            neighbor_order: config.neighbor_order,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            pending: Vec::new(),
        }
    }

    /// Consumes world events and the occupancy view to emit placement commands.
    ///
    /// Time advances pending delays before any warning in the same batch is
    /// scheduled, so a fresh spawn always waits the full interval. Spawns that
    /// come due fire in the order they were requested.
    pub fn handle(
        &mut self,
        events: &[Event],
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
        outcomes: &mut Vec<SpawnOutcome>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(*dt),
                Event::EarlyWarning { coord, .. } => {
                    let _ = self.request_spawn(*coord, outcomes);
                }
                Event::SessionReset => self.cancel_all(outcomes),
                _ => {}
            }
        }

        self.fire_due(occupancy, out, outcomes);
    }

    /// Records a pending spawn keyed by `origin` unless one already exists.
    ///
    /// Returns `true` when a new spawn was scheduled.
    pub fn request_spawn(&mut self, origin: GridCoord, outcomes: &mut Vec<SpawnOutcome>) -> bool {
        if self.is_pending(origin) {
            debug!(?origin, "duplicate spawn request suppressed");
            outcomes.push(SpawnOutcome::DuplicateSuppressed { origin });
            return false;
        }

        self.pending.push(PendingSpawn {
            origin,
            remaining: self.spawn_interval,
        });
        debug!(
            ?origin,
            delay_secs = self.spawn_interval.as_secs_f32(),
            "spawn scheduled"
        );
        outcomes.push(SpawnOutcome::Scheduled {
            origin,
            delay: self.spawn_interval,
        });
        true
    }

    /// Discards every pending spawn so none can fire afterwards.
    pub fn cancel_all(&mut self, outcomes: &mut Vec<SpawnOutcome>) {
        if self.pending.is_empty() {
            return;
        }
        info!(cancelled = self.pending.len(), "pending spawns cancelled");
        outcomes.extend(
            self.pending
                .drain(..)
                .map(|spawn| SpawnOutcome::Cancelled {
                    origin: spawn.origin,
                }),
        );
    }

    /// Reports whether a spawn keyed by `origin` is pending.
    #[must_use]
    pub fn is_pending(&self, origin: GridCoord) -> bool {
        self.pending.iter().any(|spawn| spawn.origin == origin)
    }

    /// Captures the pending spawns in request order.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingSpawnSnapshot> {
        self.pending
            .iter()
            .map(|spawn| PendingSpawnSnapshot {
                origin: spawn.origin,
                remaining: spawn.remaining,
            })
            .collect()
    }

    fn advance(&mut self, dt: Duration) {
        for spawn in &mut self.pending {
            spawn.remaining = spawn.remaining.saturating_sub(dt);
        }
        trace!(pending = self.pending.len(), "pending spawns advanced");
    }

    fn fire_due(
        &mut self,
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
        outcomes: &mut Vec<SpawnOutcome>,
    ) {
        if !self.pending.iter().any(PendingSpawn::is_due) {
            return;
        }

        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(PendingSpawn::is_due);
        self.pending = waiting;

        // Coordinates handed out earlier in this batch are not yet in the view.
        let mut claimed = Vec::new();
        for spawn in due {
            let outcome = self.try_materialize(spawn.origin, occupancy, &claimed);
            if let SpawnOutcome::Materialized { origin, coord } = outcome {
                claimed.push(coord);
                out.push(Command::PlaceCell {
                    coord,
                    cause: SpawnCause::Scheduled { origin },
                });
            }
            outcomes.push(outcome);
        }
    }

    fn try_materialize(
        &mut self,
        origin: GridCoord,
        occupancy: OccupancyView<'_>,
        claimed: &[GridCoord],
    ) -> SpawnOutcome {
        let active = occupancy.active_count() + claimed.len();
        if active >= occupancy.capacity() {
            info!(
                ?origin,
                active,
                capacity = occupancy.capacity(),
                "scheduled spawn dropped; active ceiling reached"
            );
            return SpawnOutcome::AdmissionRejected { origin };
        }

        let order = self.candidate_order();
        match occupancy.first_free_neighbor(origin, &order, claimed) {
            Some(coord) => {
                debug!(?origin, ?coord, "scheduled spawn materialized");
                SpawnOutcome::Materialized { origin, coord }
            }
            None => {
                debug!(?origin, "scheduled spawn dropped; no free adjacent slot");
                SpawnOutcome::NoFreeSlot { origin }
            }
        }
    }

    fn candidate_order(&mut self) -> [Direction; 4] {
        let mut order = Direction::PRIORITY;
        if self.neighbor_order == NeighborOrder::Shuffled {
            order.shuffle(&mut self.rng);
        }
        order
    }
}
