//! Occupancy index keyed by exact grid coordinates.

use std::collections::HashMap;

use glam::Vec2;
use platform_grid_core::{CellId, GridCoord, GridGeometry, OccupancyView};

/// Maps grid coordinates to the live cell holding them.
///
/// Occupancy is exact coordinate membership; there are no distance thresholds.
#[derive(Debug)]
pub struct GridIndex {
    geometry: GridGeometry,
    occupants: HashMap<GridCoord, CellId>,
}

impl GridIndex {
    /// Creates an empty index over the provided geometry.
    #[must_use]
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            occupants: HashMap::new(),
        }
    }

    /// Snaps a continuous position to the nearest grid coordinate.
    #[must_use]
    pub fn align(&self, point: Vec2) -> GridCoord {
        self.geometry.align(point)
    }

    /// Reports whether a live cell holds the coordinate.
    #[must_use]
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.occupants.contains_key(&coord)
    }

    /// Number of occupied coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Reports whether no coordinate is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Geometry used for alignment.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub(crate) fn view(&self, capacity: usize) -> OccupancyView<'_> {
        OccupancyView::new(&self.occupants, capacity)
    }

    /// Claims `coord` for `cell`. Returns `false` and leaves the index untouched
    /// when the coordinate is already held.
    pub(crate) fn occupy(&mut self, coord: GridCoord, cell: CellId) -> bool {
        if self.is_occupied(coord) {
            return false;
        }
        let _ = self.occupants.insert(coord, cell);
        true
    }

    pub(crate) fn vacate(&mut self, coord: GridCoord) -> Option<CellId> {
        self.occupants.remove(&coord)
    }

    pub(crate) fn clear(&mut self) {
        self.occupants.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> GridIndex {
        GridIndex::new(GridGeometry::new(1.0).expect("valid spacing"))
    }

    #[test]
    fn occupy_refuses_taken_coordinate() {
        let mut grid = index();
        assert!(grid.occupy(GridCoord::new(2, 3), CellId::new(0)));
        assert!(!grid.occupy(GridCoord::new(2, 3), CellId::new(1)));
        assert_eq!(grid.view(4).occupant(GridCoord::new(2, 3)), Some(CellId::new(0)));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn vacate_releases_coordinate() {
        let mut grid = index();
        assert!(grid.occupy(GridCoord::ORIGIN, CellId::new(4)));
        assert_eq!(grid.vacate(GridCoord::ORIGIN), Some(CellId::new(4)));
        assert!(!grid.is_occupied(GridCoord::ORIGIN));
        assert_eq!(grid.vacate(GridCoord::ORIGIN), None);
    }

    #[test]
    fn occupancy_uses_exact_coordinates() {
        let mut grid = index();
        let coord = grid.align(Vec2::new(0.49, 0.49));
        assert!(grid.occupy(coord, CellId::new(0)));
        assert!(grid.is_occupied(grid.align(Vec2::new(-0.4, 0.2))));
        assert!(!grid.is_occupied(grid.align(Vec2::new(0.51, 0.0))));
    }
}
