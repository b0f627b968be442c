#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator for Platform Grid.
//!
//! The orchestrator owns the world and the spawn scheduler and is the only
//! entry point collaborators use. Each call turns into one world command; the
//! resulting events are drained in batches, routed to the scheduler and to the
//! floor recovery logic, and every follow-up command is applied before the
//! call returns. Callers receive every event in the order it happened.

mod stats;

use glam::Vec2;
use platform_grid_core::{
    CellId, Command, ConfigError, Direction, Event, GridConfig, GridCoord, InputError, OccupancyView,
    SimulationError, SpawnCause, ValidatedConfig,
};
use platform_grid_system_spawning::{Config as SpawningConfig, SpawnScheduler};
use platform_grid_world::{self as world, query, SessionStatus, World};
use tracing::{debug, trace};

pub use stats::SessionStats;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SessionPlan {
    origin: Vec2,
    initial_fill_count: usize,
}

/// Owns a Platform Grid session and drives every system in response to
/// collaborator calls.
#[derive(Debug)]
pub struct Orchestrator {
    world: World,
    spawning: SpawnScheduler,
    plan: Option<SessionPlan>,
    stats: SessionStats,
}

impl Orchestrator {
    /// Creates an idle orchestrator bound to a validated configuration.
    #[must_use]
    pub fn new(config: ValidatedConfig) -> Self {
        Self {
            spawning: SpawnScheduler::new(SpawningConfig::from(&config)),
            world: World::new(config),
            plan: None,
            stats: SessionStats::default(),
        }
    }

    /// Validates a raw configuration and creates an idle orchestrator.
    pub fn from_config(config: GridConfig) -> Result<Self, SimulationError> {
        Ok(Self::new(config.validate()?))
    }

    /// Starts a session: one cell under `align(origin)`, the player above it,
    /// then `initial_fill_count - 1` adjacent cells clamped to the ceiling.
    ///
    /// The origin and fill count are remembered for [`Orchestrator::reset`].
    pub fn initialize(
        &mut self,
        origin: Vec2,
        initial_fill_count: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        if self.is_running() {
            return Err(SimulationError::AlreadyRunning);
        }
        let origin = InputError::position(origin)?;
        if initial_fill_count == 0 {
            return Err(ConfigError::EmptyInitialFill.into());
        }

        let plan = SessionPlan {
            origin,
            initial_fill_count,
        };
        self.plan = Some(plan);
        self.start(plan, out);
        Ok(())
    }

    /// Starts a session using the configured initial fill count.
    pub fn initialize_default(
        &mut self,
        origin: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let fill = query::config(&self.world).initial_fill_count();
        self.initialize(origin, fill, out)
    }

    /// Advances every countdown and pending spawn by `dt` seconds.
    ///
    /// A negative or non-finite step is rejected and leaves the session
    /// untouched.
    pub fn advance(&mut self, dt: f32, out: &mut Vec<Event>) -> Result<(), SimulationError> {
        let dt = InputError::time_step(dt)?;
        self.ensure_running()?;
        self.run(Command::Tick { dt }, out);
        Ok(())
    }

    /// Records the player's continuous position.
    pub fn report_player_position(
        &mut self,
        position: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let position = InputError::position(position)?;
        self.ensure_running()?;
        self.run(Command::MovePlayer { position }, out);
        Ok(())
    }

    /// Tears the session down, cancels every pending spawn and starts again
    /// from the remembered origin and fill count before returning.
    pub fn reset(&mut self, out: &mut Vec<Event>) -> Result<(), SimulationError> {
        let plan = self.plan.ok_or(SimulationError::NotRunning)?;
        self.run(Command::Reset, out);
        self.start(plan, out);
        Ok(())
    }

    /// Authoritative world state, read through [`platform_grid_world::query`].
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Spawn scheduler holding the pending spawns.
    #[must_use]
    pub const fn scheduler(&self) -> &SpawnScheduler {
        &self.spawning
    }

    /// Outcome counters accumulated since construction.
    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Reports whether a session is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        query::status(&self.world) == SessionStatus::Running
    }

    fn ensure_running(&self) -> Result<(), SimulationError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(SimulationError::NotRunning)
        }
    }

    fn start(&mut self, plan: SessionPlan, out: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Initialize {
                origin: plan.origin,
            },
            &mut events,
        );

        let target = plan
            .initial_fill_count
            .min(query::config(&self.world).max_active_cells());
        let mut anchor = query::origin(&self.world);
        while query::active_count(&self.world) < target {
            let Some(from) = anchor else {
                break;
            };
            let Some(coord) = query::occupancy_view(&self.world).first_free_neighbor(
                from,
                &Direction::PRIORITY,
                &[],
            ) else {
                debug!(?from, "initial fill stopped; no free adjacent slot");
                break;
            };
            world::apply(
                &mut self.world,
                Command::PlaceCell {
                    coord,
                    cause: SpawnCause::Fill,
                },
                &mut events,
            );
            anchor = Some(coord);
        }

        self.pump(events, out);
    }

    fn run(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events, out);
    }

    /// Drains events batch by batch until no system has anything left to say.
    fn pump(&mut self, mut events: Vec<Event>, out: &mut Vec<Event>) {
        while !events.is_empty() {
            let mut next = Vec::new();
            for event in &events {
                self.stats.record_event(event);
                if let Event::CellExpired { cell, coord } = *event {
                    self.on_expired(cell, coord, &mut next);
                }
            }

            let mut commands = Vec::new();
            let mut outcomes = Vec::new();
            self.spawning.handle(
                &events,
                query::occupancy_view(&self.world),
                &mut commands,
                &mut outcomes,
            );
            for outcome in &outcomes {
                self.stats.record_outcome(outcome);
            }
            for command in commands {
                world::apply(&mut self.world, command, &mut next);
            }

            out.append(&mut events);
            events = next;
        }
    }

    fn on_expired(
        &mut self,
        cell: CellId,
        coord: GridCoord,
        out_events: &mut Vec<Event>,
    ) {
        let holder = query::cell_at(&self.world, coord).map(|snapshot| snapshot.id);
        if holder != Some(cell) {
            trace!(?coord, "expiry ignored; cell already removed");
            return;
        }
        world::apply(&mut self.world, Command::RemoveCell { coord }, out_events);
        self.restore_floor(out_events);
    }

    fn restore_floor(&mut self, out_events: &mut Vec<Event>) {
        let Some(plan) = self.plan else {
            return;
        };
        let floor = plan
            .initial_fill_count
            .min(query::config(&self.world).max_active_cells());
        let active = query::active_count(&self.world);
        if active >= floor {
            return;
        }

        let player = query::player_placement(&self.world).map(|placement| placement.coord());
        let origin = query::origin(&self.world);
        match corrective_target(query::occupancy_view(&self.world), player, origin) {
            Some(coord) => {
                debug!(?coord, active, floor, "corrective spawn");
                world::apply(
                    &mut self.world,
                    Command::PlaceCell {
                        coord,
                        cause: SpawnCause::Corrective,
                    },
                    out_events,
                );
            }
            None => {
                debug!(?player, ?origin, "corrective spawn skipped; no free adjacent slot");
                self.stats.corrective_skipped += 1;
            }
        }
    }
}

/// First free neighbor of the player's coordinate, falling back to the origin.
fn corrective_target(
    occupancy: OccupancyView<'_>,
    player: Option<GridCoord>,
    origin: Option<GridCoord>,
) -> Option<GridCoord> {
    [player, origin]
        .into_iter()
        .flatten()
        .find_map(|anchor| occupancy.first_free_neighbor(anchor, &Direction::PRIORITY, &[]))
}
