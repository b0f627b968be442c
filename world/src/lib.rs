#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Platform Grid.
//!
//! The world owns the active set, the grid index and the player placement.
//! Every mutation arrives as a [`Command`] through [`apply`]; every observable
//! change leaves as an [`Event`].

mod cell;
mod grid;

use platform_grid_core::{
    CellId, Command, Event, GridCoord, PlacementError, PlayerPlacement, SpawnCause,
    ValidatedConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use cell::Cell;
pub use grid::GridIndex;

/// Whether a session is currently in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No session; only [`Command::Initialize`] has an effect.
    Uninitialized,
    /// A session is running.
    Running,
}

/// Represents the authoritative Platform Grid world state.
#[derive(Debug)]
pub struct World {
    config: ValidatedConfig,
    status: SessionStatus,
    grid: GridIndex,
    cells: Vec<Cell>,
    next_cell_id: u32,
    origin: Option<GridCoord>,
    player: Option<PlayerPlacement>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an uninitialized world bound to a validated configuration.
    #[must_use]
    pub fn new(config: ValidatedConfig) -> Self {
        Self {
            grid: GridIndex::new(config.geometry()),
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            config,
            status: SessionStatus::Uninitialized,
            cells: Vec::new(),
            next_cell_id: 0,
            origin: None,
            player: None,
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.grid.clear();
        self.origin = None;
        self.player = None;
    }

    fn allocate_cell_id(&mut self) -> CellId {
        let id = CellId::new(self.next_cell_id);
        self.next_cell_id = self.next_cell_id.wrapping_add(1);
        id
    }

    fn place_cell(&mut self, coord: GridCoord, cause: SpawnCause, out_events: &mut Vec<Event>) {
        let rejection = if self.status != SessionStatus::Running {
            Some(PlacementError::NotRunning)
        } else if self.cells.len() >= self.config.max_active_cells() {
            Some(PlacementError::AtCapacity)
        } else if self.grid.is_occupied(coord) {
            Some(PlacementError::Occupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            info!(?coord, ?cause, %reason, "cell placement rejected");
            out_events.push(Event::PlacementRejected {
                coord,
                cause,
                reason,
            });
            return;
        }

        let id = self.allocate_cell_id();
        let cell = Cell::create(id, coord, &self.config.lifetimes(), &mut self.rng);
        let lifetime = cell.lifetime();
        let claimed = self.grid.occupy(coord, id);
        debug_assert!(claimed, "occupancy checked above");
        self.cells.push(cell);
        debug!(
            cell = id.get(),
            ?coord,
            ?cause,
            lifetime_secs = lifetime.as_secs_f32(),
            active = self.cells.len(),
            "cell spawned"
        );
        out_events.push(Event::CellSpawned {
            cell: id,
            coord,
            lifetime,
            cause,
        });
    }

    fn remove_cell(&mut self, coord: GridCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.cells.iter().position(|cell| cell.coord() == coord) else {
            trace!(?coord, "removal ignored; no cell at coordinate");
            return;
        };
        let cell = self.cells.remove(index);
        let _ = self.grid.vacate(coord);
        debug!(cell = cell.id().get(), ?coord, active = self.cells.len(), "cell removed");
        out_events.push(Event::CellRemoved {
            cell: cell.id(),
            coord,
        });
    }

    fn place_player(&mut self, coord: GridCoord, out_events: &mut Vec<Event>) {
        if self.player.map(|placement| placement.coord()) == Some(coord) {
            return;
        }
        let placement = PlayerPlacement::above(
            self.grid.geometry(),
            coord,
            self.config.player_elevation(),
        );
        self.player = Some(placement);
        out_events.push(Event::PlayerPlaced { placement });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Initialize { origin } => {
            world.clear();
            world.status = SessionStatus::Running;
            let coord = world.grid.align(origin);
            world.origin = Some(coord);
            info!(?coord, "session started");
            out_events.push(Event::SessionStarted { origin: coord });
            world.place_cell(coord, SpawnCause::Initial, out_events);
            world.place_player(coord, out_events);
        }
        Command::Tick { dt } => {
            if world.status != SessionStatus::Running {
                return;
            }
            out_events.push(Event::TimeAdvanced { dt });
            for cell in &mut world.cells {
                cell.tick(dt, out_events);
            }
        }
        Command::PlaceCell { coord, cause } => world.place_cell(coord, cause, out_events),
        Command::RemoveCell { coord } => world.remove_cell(coord, out_events),
        Command::MovePlayer { position } => {
            if world.status != SessionStatus::Running {
                return;
            }
            let coord = world.grid.align(position);
            world.place_player(coord, out_events);
        }
        Command::Reset => {
            let destroyed = world.cells.len();
            world.clear();
            world.status = SessionStatus::Uninitialized;
            info!(destroyed, "session reset");
            out_events.push(Event::SessionReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use platform_grid_core::{
        CellSnapshot, CellView, GridCoord, OccupancyView, PlayerPlacement, ValidatedConfig,
    };

    use super::{GridIndex, SessionStatus, World};

    /// Reports whether a session is running.
    #[must_use]
    pub fn status(world: &World) -> SessionStatus {
        world.status
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &ValidatedConfig {
        &world.config
    }

    /// Grid index holding the current occupancy.
    #[must_use]
    pub fn grid(world: &World) -> &GridIndex {
        &world.grid
    }

    /// Captures every live cell in creation order.
    #[must_use]
    pub fn cell_view(world: &World) -> CellView {
        CellView::from_snapshots(world.cells.iter().map(|cell| cell.snapshot()).collect())
    }

    /// Snapshot of the cell occupying `coord`, if any.
    #[must_use]
    pub fn cell_at(world: &World, coord: GridCoord) -> Option<CellSnapshot> {
        world
            .cells
            .iter()
            .find(|cell| cell.coord() == coord)
            .map(|cell| cell.snapshot())
    }

    /// Number of live cells.
    #[must_use]
    pub fn active_count(world: &World) -> usize {
        world.cells.len()
    }

    /// Provides a read-only view of occupancy together with the active ceiling.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view(world.config.max_active_cells())
    }

    /// Aligned coordinate the current session started from.
    #[must_use]
    pub fn origin(world: &World) -> Option<GridCoord> {
        world.origin
    }

    /// Most recent player placement.
    #[must_use]
    pub fn player_placement(world: &World) -> Option<PlayerPlacement> {
        world.player
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use platform_grid_core::GridConfig;

    use super::*;

    fn world_with(config: GridConfig) -> World {
        World::new(config.validate().expect("valid config"))
    }

    fn initialized(config: GridConfig) -> (World, Vec<Event>) {
        let mut world = world_with(config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Initialize {
                origin: Vec2::new(0.3, -0.4),
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn initialize_places_single_cell_under_aligned_origin() {
        let (world, events) = initialized(GridConfig::default());

        assert_eq!(query::status(&world), SessionStatus::Running);
        assert_eq!(query::active_count(&world), 1);
        assert!(query::grid(&world).is_occupied(GridCoord::ORIGIN));
        assert_eq!(
            query::player_placement(&world).map(|placement| placement.coord()),
            Some(GridCoord::ORIGIN)
        );
        assert!(matches!(
            events.as_slice(),
            [
                Event::SessionStarted { .. },
                Event::CellSpawned {
                    cause: SpawnCause::Initial,
                    ..
                },
                Event::PlayerPlaced { .. },
            ]
        ));
    }

    #[test]
    fn placement_beyond_ceiling_is_rejected() {
        let (mut world, _) = initialized(GridConfig {
            max_active_cells: 1,
            ..GridConfig::default()
        });
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceCell {
                coord: GridCoord::new(0, 1),
                cause: SpawnCause::Corrective,
            },
            &mut events,
        );

        assert_eq!(query::active_count(&world), 1);
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                coord: GridCoord::new(0, 1),
                cause: SpawnCause::Corrective,
                reason: PlacementError::AtCapacity,
            }]
        );
    }

    #[test]
    fn placement_on_occupied_coordinate_is_rejected() {
        let (mut world, _) = initialized(GridConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceCell {
                coord: GridCoord::ORIGIN,
                cause: SpawnCause::Fill,
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::Occupied,
                ..
            }]
        ));
    }

    #[test]
    fn removal_is_idempotent() {
        let (mut world, _) = initialized(GridConfig::default());
        let mut events = Vec::new();
        apply(&mut world, Command::RemoveCell { coord: GridCoord::ORIGIN }, &mut events);
        apply(&mut world, Command::RemoveCell { coord: GridCoord::ORIGIN }, &mut events);

        assert_eq!(events.len(), 1, "second removal must be a no-op");
        assert!(query::grid(&world).is_empty());
        assert_eq!(query::active_count(&world), 0);
    }

    #[test]
    fn tick_reports_time_before_lifecycle_events() {
        let (mut world, _) = initialized(GridConfig {
            min_lifetime: 1.0,
            max_lifetime: 1.5,
            ..GridConfig::default()
        });
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [
                Event::TimeAdvanced { .. },
                Event::EarlyWarning { .. },
                Event::CellExpired { .. },
            ]
        ));
    }

    #[test]
    fn player_moves_emit_only_on_new_coordinate() {
        let (mut world, _) = initialized(GridConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                position: Vec2::new(0.5, 0.5),
            },
            &mut events,
        );
        assert!(events.is_empty(), "still over the origin cell");

        apply(
            &mut world,
            Command::MovePlayer {
                position: Vec2::new(0.2, 2.1),
            },
            &mut events,
        );
        assert_eq!(events.len(), 1);
        let placement = query::player_placement(&world).expect("player placed");
        assert_eq!(placement.coord(), GridCoord::new(0, 1));
        assert_eq!(placement.position().y, 1.0);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut world, _) = initialized(GridConfig::default());
        let mut events = Vec::new();
        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(query::status(&world), SessionStatus::Uninitialized);
        assert!(query::cell_view(&world).is_empty());
        assert!(query::grid(&world).is_empty());
        assert_eq!(query::player_placement(&world), None);
        assert_eq!(query::origin(&world), None);
    }

    #[test]
    fn commands_before_initialize_have_no_effect() {
        let mut world = world_with(GridConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceCell {
                coord: GridCoord::ORIGIN,
                cause: SpawnCause::Fill,
            },
            &mut events,
        );
        assert_eq!(query::active_count(&world), 0);
        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::NotRunning,
                ..
            }]
        ));
    }
}
