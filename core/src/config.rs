//! Startup parameters and the validation that guards entry into a session.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GridGeometry;

/// Strategy used to order neighbor candidates during adjacency search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborOrder {
    /// Candidates are tried forward, right, left, then back.
    #[default]
    Fixed,
    /// Candidates are shuffled on every search for positional variety.
    Shuffled,
}

/// Raw numeric parameters supplied by the configuration collaborator.
///
/// Values are expressed in seconds and world units. The struct is plain data;
/// call [`GridConfig::validate`] to obtain the [`ValidatedConfig`] accepted by
/// the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Inclusive lower bound of the lifetime drawn for each cell.
    pub min_lifetime: f32,
    /// Exclusive upper bound of the lifetime drawn for each cell.
    pub max_lifetime: f32,
    /// Delay between an early warning and the neighbor spawn it schedules.
    pub spawn_interval: f32,
    /// Ceiling on simultaneously live cells.
    pub max_active_cells: usize,
    /// Number of cells placed at session start; also the recovery floor.
    pub initial_fill_count: usize,
    /// Distance between adjacent grid coordinates in world units.
    pub grid_spacing: f32,
    /// Player walking speed in world units per second.
    pub movement_speed: f32,
    /// Height above a cell at which the player is placed.
    pub player_elevation: f32,
    /// Ordering applied to neighbor candidates by the spawn scheduler.
    pub neighbor_order: NeighborOrder,
    /// Seed for every random draw made during a run.
    pub seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_lifetime: 4.0,
            max_lifetime: 8.0,
            spawn_interval: 1.0,
            max_active_cells: 2,
            initial_fill_count: 1,
            grid_spacing: 2.0,
            movement_speed: 3.0,
            player_elevation: 1.0,
            neighbor_order: NeighborOrder::Fixed,
            seed: 0x5eed_c311_f00d_2024,
        }
    }
}

impl GridConfig {
    /// Checks every parameter, producing the immutable configuration used by a session.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let lifetimes = LifetimeRange::new(self.min_lifetime, self.max_lifetime)?;
        let spawn_interval = positive_duration(self.spawn_interval)
            .ok_or(ConfigError::NonPositiveSpawnInterval(self.spawn_interval))?;
        if self.max_active_cells == 0 {
            return Err(ConfigError::NoActiveCapacity);
        }
        if self.initial_fill_count == 0 {
            return Err(ConfigError::EmptyInitialFill);
        }
        let geometry = GridGeometry::new(self.grid_spacing)?;
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(ConfigError::InvalidMovementSpeed(self.movement_speed));
        }
        if !self.player_elevation.is_finite() || self.player_elevation < 0.0 {
            return Err(ConfigError::InvalidElevation(self.player_elevation));
        }

        Ok(ValidatedConfig {
            lifetimes,
            spawn_interval,
            max_active_cells: self.max_active_cells,
            initial_fill_count: self.initial_fill_count,
            geometry,
            movement_speed: self.movement_speed,
            player_elevation: self.player_elevation,
            neighbor_order: self.neighbor_order,
            seed: self.seed,
        })
    }
}

/// Configuration that passed validation. Immutable for the duration of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedConfig {
    lifetimes: LifetimeRange,
    spawn_interval: Duration,
    max_active_cells: usize,
    initial_fill_count: usize,
    geometry: GridGeometry,
    movement_speed: f32,
    player_elevation: f32,
    neighbor_order: NeighborOrder,
    seed: u64,
}

impl ValidatedConfig {
    /// Range from which every cell lifetime is drawn.
    #[must_use]
    pub const fn lifetimes(&self) -> LifetimeRange {
        self.lifetimes
    }

    /// Delay applied to every scheduled spawn.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Maximum number of simultaneously live cells.
    #[must_use]
    pub const fn max_active_cells(&self) -> usize {
        self.max_active_cells
    }

    /// Cells placed at session start and the floor restored after expiry.
    #[must_use]
    pub const fn initial_fill_count(&self) -> usize {
        self.initial_fill_count
    }

    /// Grid geometry derived from the configured spacing.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Player walking speed in world units per second.
    #[must_use]
    pub const fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Height above a cell at which the player is placed.
    #[must_use]
    pub const fn player_elevation(&self) -> f32 {
        self.player_elevation
    }

    /// Ordering applied to neighbor candidates by the spawn scheduler.
    #[must_use]
    pub const fn neighbor_order(&self) -> NeighborOrder {
        self.neighbor_order
    }

    /// Seed for every random draw made during a run.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Half-open `[min, max)` range of cell lifetimes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifetimeRange {
    min: Duration,
    max: Duration,
}

impl LifetimeRange {
    /// Builds a range from seconds, rejecting empty or non-positive ranges.
    pub fn new(min_secs: f32, max_secs: f32) -> Result<Self, ConfigError> {
        let min = positive_duration(min_secs).ok_or(ConfigError::NonPositiveLifetime(min_secs))?;
        let max = Duration::try_from_secs_f32(max_secs)
            .map_err(|_| ConfigError::LifetimeOutOfRange(max_secs))?;
        if max <= min {
            return Err(ConfigError::EmptyLifetimeRange {
                min: min_secs,
                max: max_secs,
            });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Draws a lifetime uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        rng.gen_range(self.min..self.max)
    }
}

fn positive_duration(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs)
        .ok()
        .filter(|duration| !duration.is_zero())
}

/// Reasons a configuration is refused before a session may start.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The minimum lifetime was zero, negative or not a number.
    #[error("minimum lifetime must be a positive number of seconds, got {0}")]
    NonPositiveLifetime(f32),
    /// A lifetime bound cannot be represented as a duration.
    #[error("lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(f32),
    /// The maximum lifetime did not exceed the minimum.
    #[error("maximum lifetime {max} must exceed minimum lifetime {min}")]
    EmptyLifetimeRange {
        /// Requested lower bound in seconds.
        min: f32,
        /// Requested upper bound in seconds.
        max: f32,
    },
    /// The spawn interval was zero, negative or not a number.
    #[error("spawn interval must be a positive number of seconds, got {0}")]
    NonPositiveSpawnInterval(f32),
    /// The active-cell ceiling was zero.
    #[error("at least one active cell must be allowed")]
    NoActiveCapacity,
    /// The initial fill count was zero.
    #[error("initial fill count must be at least one")]
    EmptyInitialFill,
    /// The grid spacing was zero, negative or not a number.
    #[error("grid spacing must be a positive number, got {0}")]
    NonPositiveGridSpacing(f32),
    /// The movement speed was negative or not a number.
    #[error("movement speed must be finite and non-negative, got {0}")]
    InvalidMovementSpeed(f32),
    /// The player elevation was negative or not a number.
    #[error("player elevation must be finite and non-negative, got {0}")]
    InvalidElevation(f32),
}
