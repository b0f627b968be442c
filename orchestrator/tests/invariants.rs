use std::collections::HashSet;

use glam::Vec2;
use platform_grid_core::{GridConfig, NeighborOrder};
use platform_grid_orchestrator::Orchestrator;
use platform_grid_world::query;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Advance(f32),
    Move(f32, f32),
    Reset,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => (0.0f32..1.5).prop_map(Step::Advance),
        3 => (-12.0f32..12.0, -12.0f32..12.0).prop_map(|(x, y)| Step::Move(x, y)),
        1 => Just(Step::Reset),
    ]
}

fn config() -> impl Strategy<Value = (GridConfig, usize)> {
    (
        0.2f32..3.0,
        0.05f32..3.0,
        0.1f32..3.0,
        1usize..=4,
        1usize..=5,
        any::<bool>(),
        any::<u64>(),
    )
        .prop_map(|(min, span, interval, capacity, fill, shuffled, seed)| {
            let config = GridConfig {
                min_lifetime: min,
                max_lifetime: min + span,
                spawn_interval: interval,
                max_active_cells: capacity,
                initial_fill_count: fill,
                neighbor_order: if shuffled {
                    NeighborOrder::Shuffled
                } else {
                    NeighborOrder::Fixed
                },
                seed,
                ..GridConfig::default()
            };
            (config, fill)
        })
}

fn check_invariants(orchestrator: &Orchestrator) -> Result<(), TestCaseError> {
    let world = orchestrator.world();
    let capacity = query::config(world).max_active_cells();
    let cells = query::cell_view(world);

    prop_assert!(orchestrator.is_running());
    prop_assert!(cells.len() <= capacity);
    prop_assert_eq!(query::grid(world).len(), cells.len());

    let coords: HashSet<_> = cells.iter().map(|cell| cell.coord).collect();
    prop_assert_eq!(coords.len(), cells.len());
    for coord in &coords {
        prop_assert!(query::grid(world).is_occupied(*coord));
    }

    let pending = orchestrator.scheduler().pending();
    let origins: HashSet<_> = pending.iter().map(|spawn| spawn.origin).collect();
    prop_assert_eq!(origins.len(), pending.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn global_invariants_hold_over_random_sessions(
        (config, fill) in config(),
        steps in prop::collection::vec(step(), 1..80),
    ) {
        let mut orchestrator = Orchestrator::from_config(config).expect("valid config");
        let mut events = Vec::new();
        orchestrator.initialize(Vec2::ZERO, fill, &mut events).expect("session starts");
        check_invariants(&orchestrator)?;

        for step in steps {
            events.clear();
            match step {
                Step::Advance(dt) => orchestrator.advance(dt, &mut events).expect("valid step"),
                Step::Move(x, y) => orchestrator
                    .report_player_position(Vec2::new(x, y), &mut events)
                    .expect("finite position"),
                Step::Reset => orchestrator.reset(&mut events).expect("reset succeeds"),
            }
            check_invariants(&orchestrator)?;
        }
    }

    #[test]
    fn reset_always_restarts_with_clamped_fill(
        (config, fill) in config(),
        warmup in prop::collection::vec(0.0f32..1.0, 0..20),
    ) {
        let capacity = config.max_active_cells;
        let mut orchestrator = Orchestrator::from_config(config).expect("valid config");
        let mut events = Vec::new();
        orchestrator.initialize(Vec2::ZERO, fill, &mut events).expect("session starts");
        for dt in warmup {
            orchestrator.advance(dt, &mut events).expect("valid step");
        }

        orchestrator.reset(&mut events).expect("reset succeeds");

        prop_assert!(orchestrator.scheduler().pending().is_empty());
        prop_assert_eq!(query::active_count(orchestrator.world()), fill.min(capacity));
    }
}
