use cell_lab_core::{
    CellCoord, CellShading, CellValue, Command, Event, GridSize, Ruleset, StepConfig, Topology,
    WildcardSet,
};
use cell_lab_world::{self as world, query, World};

fn configured_world(edge: u32) -> World {
    let mut instance = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut instance,
        Command::ConfigureGrid {
            size: GridSize::new(edge),
        },
        &mut events,
    );
    instance
}

fn write_cells(instance: &mut World, cells: &[(u32, u32)]) {
    let mut events = Vec::new();
    for &(column, row) in cells {
        world::apply(
            instance,
            Command::WriteCell {
                cell: CellCoord::new(column, row),
                value: CellValue::LIVE,
            },
            &mut events,
        );
    }
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::CellWritten { .. })));
}

fn step_times(instance: &mut World, config: StepConfig, count: usize) {
    let mut events = Vec::new();
    for _ in 0..count {
        world::apply(instance, Command::Step { config }, &mut events);
    }
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::GenerationAdvanced { .. })));
}

fn live_cells(instance: &World) -> Vec<(u32, u32)> {
    let view = query::grid_view(instance);
    let edge = view.size().get();
    let mut cells = Vec::new();
    for row in 0..edge {
        for column in 0..edge {
            if view.is_live(CellCoord::new(column, row)) {
                cells.push((column, row));
            }
        }
    }
    cells
}

#[test]
fn glider_translates_diagonally_every_four_steps() {
    let mut instance = configured_world(12);
    let origin = (3, 3);
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    let placed: Vec<(u32, u32)> = glider
        .iter()
        .map(|&(column, row)| (origin.0 + column, origin.1 + row))
        .collect();
    write_cells(&mut instance, &placed);

    step_times(&mut instance, StepConfig::default(), 4);

    let expected: Vec<(u32, u32)> = placed
        .iter()
        .map(|&(column, row)| (column + 1, row + 1))
        .collect();
    assert_eq!(live_cells(&instance), expected);
    assert_eq!(query::generation(&instance).get(), 4);
}

#[test]
fn lone_cell_dies_within_one_step_and_the_grid_stays_dead() {
    let mut instance = configured_world(7);
    write_cells(&mut instance, &[(3, 3)]);

    step_times(&mut instance, StepConfig::default(), 1);
    assert_eq!(query::population(&instance), 0);

    step_times(&mut instance, StepConfig::default(), 3);
    assert_eq!(query::population(&instance), 0);
}

#[test]
fn wildcard_off_kills_a_cell_the_basic_rule_keeps_alive() {
    let blinker = [(2, 1), (2, 2), (2, 3)];

    let mut plain = configured_world(5);
    write_cells(&mut plain, &blinker);
    step_times(&mut plain, StepConfig::default(), 1);
    assert!(query::cell(&plain, CellCoord::new(2, 2))
        .expect("cell in bounds")
        .is_alive());

    let mut overridden = configured_world(5);
    write_cells(&mut overridden, &blinker);
    let config = StepConfig {
        rules: Ruleset {
            wildcards_off: WildcardSet::EMPTY.with(2),
            ..Ruleset::classic()
        },
        ..StepConfig::default()
    };
    step_times(&mut overridden, config, 1);

    // The center survived on exactly two neighbors above; the wildcard
    // overrides that outcome.
    assert!(query::cell(&overridden, CellCoord::new(2, 2))
        .expect("cell in bounds")
        .is_dead());
}

#[test]
fn graded_shading_rederives_values_from_neighbor_counts() {
    let mut instance = configured_world(5);
    write_cells(&mut instance, &[(2, 1), (2, 2), (2, 3)]);

    let config = StepConfig {
        shading: CellShading::Graded,
        ..StepConfig::default()
    };
    step_times(&mut instance, config, 1);

    // The survivor held two neighbors, the births held three.
    assert_eq!(
        query::cell(&instance, CellCoord::new(2, 2)),
        Some(CellValue::graded(2))
    );
    assert_eq!(
        query::cell(&instance, CellCoord::new(1, 2)),
        Some(CellValue::graded(3))
    );
    assert_eq!(
        query::cell(&instance, CellCoord::new(3, 2)),
        Some(CellValue::graded(3))
    );
}

#[test]
fn wrapped_topology_feeds_births_across_the_seam() {
    // A full row on a 3x3 torus gives every dead cell three wrapped
    // neighbors, so one step fills the grid; bounded stepping only
    // oscillates.
    let row = [(0, 1), (1, 1), (2, 1)];

    let mut wrapped = configured_world(3);
    write_cells(&mut wrapped, &row);
    let config = StepConfig {
        topology: Topology::Wrapped,
        ..StepConfig::default()
    };
    step_times(&mut wrapped, config, 1);
    assert_eq!(query::population(&wrapped), 9);

    let mut bounded = configured_world(3);
    write_cells(&mut bounded, &row);
    step_times(&mut bounded, StepConfig::default(), 1);
    assert_eq!(query::population(&bounded), 3);
    assert_eq!(live_cells(&bounded), vec![(1, 0), (1, 1), (1, 2)]);
}
