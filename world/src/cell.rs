//! Per-cell countdown state machine.

use std::time::Duration;

use platform_grid_core::{
    CellId, CellPhase, CellSnapshot, ConfigError, Event, GridCoord, LifetimeRange,
};
use rand::Rng;

/// Remaining lifetime, as a fraction of the total, at which the early warning fires.
const EARLY_WARNING_NUMERATOR: u128 = 3;
const EARLY_WARNING_DENOMINATOR: u128 = 5;

/// A single live platform counting down toward expiry.
///
/// Cells never touch shared structures. [`Cell::tick`] only reports lifecycle
/// events; the world decides what they mean.
#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    coord: GridCoord,
    lifetime: Duration,
    remaining: Duration,
    warned: bool,
    phase: CellPhase,
}

impl Cell {
    /// Creates a cell at `coord` with a lifetime drawn uniformly from `lifetimes`.
    pub fn create<R: Rng + ?Sized>(
        id: CellId,
        coord: GridCoord,
        lifetimes: &LifetimeRange,
        rng: &mut R,
    ) -> Self {
        Self::live(id, coord, lifetimes.sample(rng))
    }

    /// Creates a cell with an explicit lifetime, rejecting a zero lifetime.
    pub fn with_lifetime(
        id: CellId,
        coord: GridCoord,
        lifetime: Duration,
    ) -> Result<Self, ConfigError> {
        if lifetime.is_zero() {
            return Err(ConfigError::NonPositiveLifetime(0.0));
        }
        Ok(Self::live(id, coord, lifetime))
    }

    fn live(id: CellId, coord: GridCoord, lifetime: Duration) -> Self {
        Self {
            id,
            coord,
            lifetime,
            remaining: lifetime,
            warned: false,
            phase: CellPhase::Live,
        }
    }

    /// Identifier assigned at creation.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Coordinate the cell occupies.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Total lifetime drawn at creation.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Lifetime left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Current stage of the countdown.
    #[must_use]
    pub const fn phase(&self) -> CellPhase {
        self.phase
    }

    /// Reports whether the early warning already fired.
    #[must_use]
    pub const fn has_warned(&self) -> bool {
        self.warned
    }

    /// Advances the countdown, pushing [`Event::EarlyWarning`] and
    /// [`Event::CellExpired`] at most once each over the cell's life.
    ///
    /// A step that crosses both thresholds reports the warning first. Ticking a
    /// destroyed cell does nothing.
    pub fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase == CellPhase::Destroyed {
            return;
        }

        self.remaining = self.remaining.saturating_sub(dt);

        if !self.warned && self.past_warning_threshold() {
            self.warned = true;
            self.phase = CellPhase::Expiring;
            out_events.push(Event::EarlyWarning {
                cell: self.id,
                coord: self.coord,
            });
        }

        if self.remaining.is_zero() {
            self.phase = CellPhase::Destroyed;
            out_events.push(Event::CellExpired {
                cell: self.id,
                coord: self.coord,
            });
        }
    }

    /// Captures the cell for presentation.
    #[must_use]
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            id: self.id,
            coord: self.coord,
            lifetime: self.lifetime,
            remaining: self.remaining,
            phase: self.phase,
        }
    }

    fn past_warning_threshold(&self) -> bool {
        self.remaining.as_nanos() * EARLY_WARNING_DENOMINATOR
            <= self.lifetime.as_nanos() * EARLY_WARNING_NUMERATOR
    }
}
