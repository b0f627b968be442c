#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Platform Grid engine.
//!
//! This crate defines the message surface that connects the orchestrator, the
//! authoritative world, and pure systems. The orchestrator submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

mod config;

use std::{collections::HashMap, time::Duration};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, GridConfig, LifetimeRange, NeighborOrder, ValidatedConfig};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a session with the first cell under the aligned origin.
    Initialize {
        /// Continuous world position that anchors the session.
        origin: Vec2,
    },
    /// Advances every cell countdown by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a new cell at the provided coordinate.
    PlaceCell {
        /// Coordinate the new cell should occupy.
        coord: GridCoord,
        /// Path through which the placement was requested.
        cause: SpawnCause,
    },
    /// Removes the cell occupying the provided coordinate, if any.
    RemoveCell {
        /// Coordinate of the cell to remove.
        coord: GridCoord,
    },
    /// Reports the player's current continuous position.
    MovePlayer {
        /// Position on the ground plane.
        position: Vec2,
    },
    /// Destroys every cell and returns the world to its uninitialized state.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a session started at the provided origin.
    SessionStarted {
        /// Aligned coordinate of the first cell.
        origin: GridCoord,
    },
    /// Announces that every cell was destroyed by a reset.
    SessionReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a cell was created.
    CellSpawned {
        /// Identifier assigned to the new cell.
        cell: CellId,
        /// Coordinate the cell occupies.
        coord: GridCoord,
        /// Total lifetime drawn for the cell.
        lifetime: Duration,
        /// Path through which the placement was requested.
        cause: SpawnCause,
    },
    /// A cell's remaining lifetime fell to sixty percent of its total.
    EarlyWarning {
        /// Identifier of the warning cell.
        cell: CellId,
        /// Coordinate of the warning cell.
        coord: GridCoord,
    },
    /// A cell's countdown reached zero.
    CellExpired {
        /// Identifier of the expired cell.
        cell: CellId,
        /// Coordinate of the expired cell.
        coord: GridCoord,
    },
    /// Confirms that a cell left the active set and released its coordinate.
    CellRemoved {
        /// Identifier of the removed cell.
        cell: CellId,
        /// Coordinate released by the removal.
        coord: GridCoord,
    },
    /// Reports that a placement request was refused.
    PlacementRejected {
        /// Coordinate provided in the placement request.
        coord: GridCoord,
        /// Path through which the placement was requested.
        cause: SpawnCause,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the player was placed on a new coordinate.
    PlayerPlaced {
        /// Aligned coordinate and elevated world position of the player.
        placement: PlayerPlacement,
    },
}

/// Path through which a cell placement was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnCause {
    /// First cell of a session, placed under the origin.
    Initial,
    /// Immediate placement made while filling a fresh session.
    Fill,
    /// Delayed placement scheduled by a neighbor's early warning.
    Scheduled {
        /// Coordinate of the cell whose warning scheduled the spawn.
        origin: GridCoord,
    },
    /// Immediate placement restoring the active floor after an expiry.
    Corrective,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// No session is running.
    #[error("no session is running")]
    NotRunning,
    /// The active set already holds the maximum number of cells.
    #[error("active cell ceiling reached")]
    AtCapacity,
    /// A live cell already occupies the requested coordinate.
    #[error("coordinate already occupied")]
    Occupied,
}

/// Resolution of a single spawn request handled by the spawn scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnOutcome {
    /// A new pending spawn was recorded for the origin.
    Scheduled {
        /// Coordinate the spawn is keyed by.
        origin: GridCoord,
        /// Delay until the spawn fires.
        delay: Duration,
    },
    /// A pending spawn already existed for the origin, so the request was ignored.
    DuplicateSuppressed {
        /// Coordinate the spawn is keyed by.
        origin: GridCoord,
    },
    /// The spawn fired and requested a cell at a free neighbor.
    Materialized {
        /// Coordinate the spawn was keyed by.
        origin: GridCoord,
        /// Neighbor coordinate chosen for the new cell.
        coord: GridCoord,
    },
    /// The spawn fired while the active set was full and was dropped.
    AdmissionRejected {
        /// Coordinate the spawn was keyed by.
        origin: GridCoord,
    },
    /// The spawn fired but every neighbor of the origin was occupied.
    NoFreeSlot {
        /// Coordinate the spawn was keyed by.
        origin: GridCoord,
    },
    /// The spawn was discarded by a reset before it fired.
    Cancelled {
        /// Coordinate the spawn was keyed by.
        origin: GridCoord,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: i32,
    row: i32,
}

impl GridCoord {
    /// Coordinate at the grid origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the coordinate.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the coordinate.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Coordinate one step away in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (column, row) = direction.offset();
        Self::new(
            self.column.saturating_add(column),
            self.row.saturating_add(row),
        )
    }
}

/// Cardinal directions used for adjacency search, relative to the canonical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing row indices.
    Forward,
    /// Toward increasing column indices.
    Right,
    /// Toward decreasing column indices.
    Left,
    /// Toward decreasing row indices.
    Back,
}

impl Direction {
    /// Fixed priority in which neighbor candidates are tried.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Forward,
        Direction::Right,
        Direction::Left,
        Direction::Back,
    ];

    /// Column and row offset of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Forward => (0, 1),
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::Back => (0, -1),
        }
    }
}

/// Maps continuous ground-plane positions onto the discrete grid.
///
/// The ground plane is expressed as `Vec2 { x, y }` where `x` runs along
/// columns and `y` along rows. Cell centers sit at integer multiples of the
/// spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    spacing: f32,
}

impl GridGeometry {
    /// Creates a geometry with the provided spacing between coordinates.
    pub fn new(spacing: f32) -> Result<Self, ConfigError> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(ConfigError::NonPositiveGridSpacing(spacing));
        }
        Ok(Self { spacing })
    }

    /// Distance between adjacent coordinates in world units.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Snaps a continuous position to the nearest grid coordinate.
    ///
    /// Aligning the world position of a coordinate yields that coordinate, so
    /// alignment is idempotent.
    #[must_use]
    pub fn align(&self, point: Vec2) -> GridCoord {
        GridCoord::new(
            snap(point.x / self.spacing),
            snap(point.y / self.spacing),
        )
    }

    /// Ground-plane position of the center of a coordinate.
    #[must_use]
    pub fn world_position(&self, coord: GridCoord) -> Vec2 {
        Vec2::new(
            coord.column() as f32 * self.spacing,
            coord.row() as f32 * self.spacing,
        )
    }
}

// Float to int casts saturate and map NaN to zero.
fn snap(scaled: f32) -> i32 {
    scaled.round() as i32
}

/// Unique identifier assigned to a cell. Identifiers grow in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stage of a cell's countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellPhase {
    /// Counting down; no early warning fired yet.
    Live,
    /// The early warning fired; the cell is still standing.
    Expiring,
    /// The countdown reached zero. Terminal.
    Destroyed,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Identifier assigned to the cell.
    pub id: CellId,
    /// Coordinate the cell occupies.
    pub coord: GridCoord,
    /// Total lifetime drawn at creation.
    pub lifetime: Duration,
    /// Lifetime left before the cell expires.
    pub remaining: Duration,
    /// Stage of the countdown.
    pub phase: CellPhase,
}

/// Read-only snapshot describing every live cell.
#[derive(Clone, Debug, Default)]
pub struct CellView {
    snapshots: Vec<CellSnapshot>,
}

impl CellView {
    /// Creates a new cell view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CellSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellSnapshot> {
        self.snapshots
    }
}

/// Read-only view of grid occupancy together with the active-cell ceiling.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    occupants: &'a HashMap<GridCoord, CellId>,
    capacity: usize,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided occupant map.
    #[must_use]
    pub fn new(occupants: &'a HashMap<GridCoord, CellId>, capacity: usize) -> Self {
        Self {
            occupants,
            capacity,
        }
    }

    /// Returns the cell occupying the provided coordinate, if any.
    #[must_use]
    pub fn occupant(&self, coord: GridCoord) -> Option<CellId> {
        self.occupants.get(&coord).copied()
    }

    /// Reports whether the coordinate is free for a new cell.
    #[must_use]
    pub fn is_free(&self, coord: GridCoord) -> bool {
        !self.occupants.contains_key(&coord)
    }

    /// Number of live cells.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.occupants.len()
    }

    /// Maximum number of simultaneously live cells.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the first neighbor of `origin`, in the provided order, that is free
    /// and not listed in `claimed`.
    #[must_use]
    pub fn first_free_neighbor(
        &self,
        origin: GridCoord,
        order: &[Direction],
        claimed: &[GridCoord],
    ) -> Option<GridCoord> {
        order
            .iter()
            .map(|direction| origin.neighbor(*direction))
            .find(|candidate| self.is_free(*candidate) && !claimed.contains(candidate))
    }
}

/// A pending spawn as seen from outside the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSpawnSnapshot {
    /// Coordinate the spawn is keyed by.
    pub origin: GridCoord,
    /// Delay left before the spawn fires.
    pub remaining: Duration,
}

/// Where the player stands after a placement event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPlacement {
    coord: GridCoord,
    position: Vec3,
}

impl PlayerPlacement {
    /// Places the player above `coord`, raised by `elevation`.
    #[must_use]
    pub fn above(geometry: &GridGeometry, coord: GridCoord, elevation: f32) -> Self {
        let ground = geometry.world_position(coord);
        Self {
            coord,
            position: Vec3::new(ground.x, elevation, ground.y),
        }
    }

    /// Aligned coordinate the player stands on.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// World position with `y` holding the elevation.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }
}

/// Rejected external input.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum InputError {
    /// The time step was negative or not a finite number of seconds.
    #[error("time step must be a finite, non-negative number of seconds, got {dt}")]
    InvalidTimeStep {
        /// Offending time step in seconds.
        dt: f32,
    },
    /// A reported position contained a non-finite component.
    #[error("position must be finite, got ({x}, {y})")]
    NonFinitePosition {
        /// Offending column-axis component.
        x: f32,
        /// Offending row-axis component.
        y: f32,
    },
}

impl InputError {
    /// Converts seconds into a time step, rejecting negative and non-finite values.
    pub fn time_step(dt: f32) -> Result<Duration, Self> {
        Duration::try_from_secs_f32(dt).map_err(|_| Self::InvalidTimeStep { dt })
    }

    /// Accepts a position only when both components are finite.
    pub fn position(position: Vec2) -> Result<Vec2, Self> {
        if position.is_finite() {
            Ok(position)
        } else {
            Err(Self::NonFinitePosition {
                x: position.x,
                y: position.y,
            })
        }
    }
}

/// Failures surfaced by the engine's public entry points.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SimulationError {
    /// The configuration was refused; no session may start.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// The input was refused; state is unchanged.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// The operation requires a running session.
    #[error("no session is running")]
    NotRunning,
    /// A session is already running; reset it instead.
    #[error("a session is already running")]
    AlreadyRunning,
}
