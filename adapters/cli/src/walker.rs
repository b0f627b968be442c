//! Scripted stand-in for a human player.

use glam::Vec2;
use platform_grid_core::GridGeometry;
use platform_grid_world::{query, World};

/// Walks the player toward the most recently spawned cell at a fixed speed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Walker {
    position: Vec2,
    speed: f32,
}

impl Walker {
    pub(crate) const fn new(position: Vec2, speed: f32) -> Self {
        Self { position, speed }
    }

    /// Moves at most `speed * dt` toward `target`, stopping on arrival.
    pub(crate) fn step(&mut self, target: Option<Vec2>, dt: f32) -> Vec2 {
        if let Some(target) = target {
            let offset = target - self.position;
            let reach = self.speed * dt;
            self.position = if offset.length() <= reach {
                target
            } else {
                self.position + offset.normalize_or_zero() * reach
            };
        }
        self.position
    }
}

/// World position of the newest live cell.
pub(crate) fn newest_cell(world: &World, geometry: &GridGeometry) -> Option<Vec2> {
    query::cell_view(world)
        .iter()
        .max_by_key(|cell| cell.id)
        .map(|cell| geometry.world_position(cell.coord))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walker_caps_distance_per_step() {
        let mut walker = Walker::new(Vec2::ZERO, 2.0);
        let position = walker.step(Some(Vec2::new(10.0, 0.0)), 0.5);
        assert_eq!(position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn walker_stops_on_target() {
        let mut walker = Walker::new(Vec2::ZERO, 5.0);
        let target = Vec2::new(0.0, 2.0);
        assert_eq!(walker.step(Some(target), 1.0), target);
        assert_eq!(walker.step(Some(target), 1.0), target);
    }

    #[test]
    fn walker_waits_without_target() {
        let mut walker = Walker::new(Vec2::new(3.0, 4.0), 5.0);
        assert_eq!(walker.step(None, 1.0), Vec2::new(3.0, 4.0));
    }
}
