#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Cell Lab.
//!
//! The world owns two same-size generation buffers, the tag naming the live
//! one, the generation counter, and the pattern buffer. Hosts mutate it
//! exclusively through [`apply`] and observe it through the [`query`]
//! module; the stepping rules themselves live in `cell-lab-system-rules`.

use cell_lab_core::{
    CellCoord, CellShading, CellValue, Command, ConfigError, EditError, Event, Generation,
    GridSize, GridView, StepConfig, Topology, MIN_GRID_SIZE,
};
use cell_lab_system_rules as rules;

const DEFAULT_GRID_SIZE: GridSize = GridSize::new(360);
const PATTERN_EDGE_DIVISOR: u32 = 3;

/// Names one of the two generation buffers.
///
/// The live buffer holds the current generation; the other one is the write
/// target of the next step. The tag flips after every completed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    /// The first physical buffer.
    A,
    /// The second physical buffer.
    B,
}

impl BufferSlot {
    /// The slot this one alternates with.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Dense row-major storage for one square cell grid.
#[derive(Clone, Debug)]
struct CellGrid {
    size: GridSize,
    cells: Vec<CellValue>,
}

impl CellGrid {
    fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellValue::DEAD; size.cell_count()],
        }
    }

    fn size(&self) -> GridSize {
        self.size
    }

    fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    fn value(&self, cell: CellCoord) -> Option<CellValue> {
        self.size
            .index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    fn write(&mut self, cell: CellCoord, value: CellValue) -> Result<(), EditError> {
        let index = self.size.index_of(cell).ok_or(EditError::OutOfBounds)?;
        self.cells[index] = value;
        Ok(())
    }

    fn clear(&mut self) {
        self.cells.fill(CellValue::DEAD);
    }

    fn cells_mut(&mut self) -> &mut [CellValue] {
        &mut self.cells
    }
}

/// Represents the authoritative Cell Lab world state.
#[derive(Debug)]
pub struct World {
    buffers: [CellGrid; 2],
    live: BufferSlot,
    generation: Generation,
    pattern: CellGrid,
}

impl World {
    /// Creates a new world with zeroed default-size grids.
    #[must_use]
    pub fn new() -> Self {
        let pattern_size = GridSize::new(
            (DEFAULT_GRID_SIZE.get() / PATTERN_EDGE_DIVISOR).max(MIN_GRID_SIZE),
        );
        Self {
            buffers: [CellGrid::new(DEFAULT_GRID_SIZE), CellGrid::new(DEFAULT_GRID_SIZE)],
            live: BufferSlot::A,
            generation: Generation::ZERO,
            pattern: CellGrid::new(pattern_size),
        }
    }

    fn live_grid(&self) -> &CellGrid {
        &self.buffers[self.live.index()]
    }

    fn live_grid_mut(&mut self) -> &mut CellGrid {
        &mut self.buffers[self.live.index()]
    }

    /// Splits the buffer pair into the live grid and the step's write
    /// target.
    fn split_live_mut(&mut self) -> (&mut CellGrid, &mut CellGrid) {
        let [first, second] = &mut self.buffers;
        match self.live {
            BufferSlot::A => (first, second),
            BufferSlot::B => (second, first),
        }
    }

    fn reconfigure_grid(&mut self, size: GridSize) {
        self.buffers = [CellGrid::new(size), CellGrid::new(size)];
        self.live = BufferSlot::A;
        self.generation = Generation::ZERO;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state
/// deterministically.
///
/// A rejected command emits exactly one rejection event and leaves every
/// grid and counter untouched.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size } => {
            if size.get() < MIN_GRID_SIZE {
                out_events.push(Event::ConfigurationRejected {
                    size,
                    reason: ConfigError::SizeBelowMinimum,
                });
            } else {
                world.reconfigure_grid(size);
                out_events.push(Event::GridConfigured { size });
            }
        }
        Command::ConfigurePattern { size } => {
            if size.get() < MIN_GRID_SIZE {
                out_events.push(Event::ConfigurationRejected {
                    size,
                    reason: ConfigError::SizeBelowMinimum,
                });
            } else {
                world.pattern = CellGrid::new(size);
                out_events.push(Event::PatternConfigured { size });
            }
        }
        Command::WriteCell { cell, value } => {
            match world.live_grid_mut().write(cell, value) {
                Ok(()) => out_events.push(Event::CellWritten { cell, value }),
                Err(reason) => out_events.push(Event::EditRejected { cell, reason }),
            }
        }
        Command::ToggleCell {
            cell,
            shading,
            topology,
        } => {
            let event = toggle_live_cell(world, cell, shading, topology);
            out_events.push(event);
        }
        Command::Step { config } => match config.rules.validate() {
            Err(reason) => out_events.push(Event::StepRejected { reason }),
            Ok(()) => {
                step(world, &config);
                out_events.push(Event::GenerationAdvanced {
                    generation: world.generation,
                });
            }
        },
        Command::ClearGrid => {
            world.buffers[0].clear();
            world.buffers[1].clear();
            world.generation = Generation::ZERO;
            out_events.push(Event::GridCleared);
        }
        Command::StampPattern { origin } => {
            if placement_fits(origin, world.pattern.size(), world.live_grid().size()) {
                stamp_pattern(world, origin);
                out_events.push(Event::PatternStamped { origin });
            } else {
                out_events.push(Event::PlacementRejected {
                    origin,
                    reason: EditError::OutOfBounds,
                });
            }
        }
        Command::CopyPattern { origin } => {
            if placement_fits(origin, world.pattern.size(), world.live_grid().size()) {
                copy_pattern(world, origin);
                out_events.push(Event::PatternCopied { origin });
            } else {
                out_events.push(Event::PlacementRejected {
                    origin,
                    reason: EditError::OutOfBounds,
                });
            }
        }
        Command::ClearPattern => {
            world.pattern.clear();
            out_events.push(Event::PatternCleared);
        }
        Command::WritePatternCell { cell, value } => match world.pattern.write(cell, value) {
            Ok(()) => out_events.push(Event::PatternCellWritten { cell, value }),
            Err(reason) => out_events.push(Event::EditRejected { cell, reason }),
        },
        Command::TogglePatternCell {
            cell,
            shading,
            topology,
        } => {
            let event = toggle_pattern_cell(world, cell, shading, topology);
            out_events.push(event);
        }
    }
}

/// Runs one generation: derive the next grid from the live one, clear the
/// old live grid so it becomes the following step's write target, flip the
/// tag, and count the completed step.
fn step(world: &mut World, config: &StepConfig) {
    let (live, shadow) = world.split_live_mut();
    rules::advance(live.view(), shadow.cells_mut(), config);
    live.clear();
    world.live = world.live.other();
    world.generation = world.generation.next();
}

fn toggle_live_cell(
    world: &mut World,
    cell: CellCoord,
    shading: CellShading,
    topology: Topology,
) -> Event {
    let Some(current) = world.live_grid().value(cell) else {
        return Event::EditRejected {
            cell,
            reason: EditError::OutOfBounds,
        };
    };

    let value = if current.is_alive() {
        CellValue::DEAD
    } else {
        toggled_live_value(world.live_grid().view(), cell, shading, topology)
    };

    match world.live_grid_mut().write(cell, value) {
        Ok(()) => Event::CellToggled { cell, value },
        Err(reason) => Event::EditRejected { cell, reason },
    }
}

fn toggle_pattern_cell(
    world: &mut World,
    cell: CellCoord,
    shading: CellShading,
    topology: Topology,
) -> Event {
    let Some(current) = world.pattern.value(cell) else {
        return Event::EditRejected {
            cell,
            reason: EditError::OutOfBounds,
        };
    };

    let value = if current.is_alive() {
        CellValue::DEAD
    } else {
        toggled_live_value(world.pattern.view(), cell, shading, topology)
    };

    match world.pattern.write(cell, value) {
        Ok(()) => Event::PatternCellToggled { cell, value },
        Err(reason) => Event::EditRejected { cell, reason },
    }
}

/// Value a manually toggled cell receives: one under monochrome shading,
/// neighbor count plus one under graded shading. The count is taken
/// against the same grid the cell lives in.
fn toggled_live_value(
    view: GridView<'_>,
    cell: CellCoord,
    shading: CellShading,
    topology: Topology,
) -> CellValue {
    match shading {
        CellShading::Monochrome => CellValue::LIVE,
        CellShading::Graded => {
            let count = rules::live_neighbors(view, cell, topology);
            CellValue::graded(count.saturating_add(1))
        }
    }
}

/// Reports whether a pattern-sized footprint anchored at `origin` stays
/// inside the grid. The whole footprint must fit; nothing wraps or clips.
fn placement_fits(origin: CellCoord, pattern: GridSize, grid: GridSize) -> bool {
    let far_column = u64::from(origin.column()) + u64::from(pattern.get());
    let far_row = u64::from(origin.row()) + u64::from(pattern.get());
    far_column <= u64::from(grid.get()) && far_row <= u64::from(grid.get())
}

fn stamp_pattern(world: &mut World, origin: CellCoord) {
    let edge = world.pattern.size().get();
    let live = world.live.index();
    for row in 0..edge {
        for column in 0..edge {
            let source = CellCoord::new(column, row);
            let destination = CellCoord::new(origin.column() + column, origin.row() + row);
            if let (Some(from), Some(to)) = (
                world.pattern.size().index_of(source),
                world.buffers[live].size().index_of(destination),
            ) {
                world.buffers[live].cells[to] = world.pattern.cells[from];
            }
        }
    }
}

fn copy_pattern(world: &mut World, origin: CellCoord) {
    let edge = world.pattern.size().get();
    let live = world.live.index();
    for row in 0..edge {
        for column in 0..edge {
            let source = CellCoord::new(origin.column() + column, origin.row() + row);
            let destination = CellCoord::new(column, row);
            if let (Some(from), Some(to)) = (
                world.buffers[live].size().index_of(source),
                world.pattern.size().index_of(destination),
            ) {
                world.pattern.cells[to] = world.buffers[live].cells[from];
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{BufferSlot, World};
    use cell_lab_core::{CellCoord, CellValue, Generation, GridSize, GridView};

    /// Read-only view of the live generation grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.live_grid().view()
    }

    /// Read-only view of the pattern buffer.
    #[must_use]
    pub fn pattern_view(world: &World) -> GridView<'_> {
        world.pattern.view()
    }

    /// Value stored at a live-grid coordinate, if it is in bounds.
    #[must_use]
    pub fn cell(world: &World, coord: CellCoord) -> Option<CellValue> {
        world.live_grid().value(coord)
    }

    /// Value stored at a pattern-buffer coordinate, if it is in bounds.
    #[must_use]
    pub fn pattern_cell(world: &World, coord: CellCoord) -> Option<CellValue> {
        world.pattern.value(coord)
    }

    /// Number of steps completed since creation, clear, or reconfigure.
    #[must_use]
    pub fn generation(world: &World) -> Generation {
        world.generation
    }

    /// Edge length of the generation grids.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.live_grid().size()
    }

    /// Edge length of the pattern buffer.
    #[must_use]
    pub fn pattern_size(world: &World) -> GridSize {
        world.pattern.size()
    }

    /// Tag of the buffer currently holding the live generation.
    #[must_use]
    pub fn live_buffer(world: &World) -> BufferSlot {
        world.live
    }

    /// Number of live cells in the current generation.
    #[must_use]
    pub fn population(world: &World) -> usize {
        world.live_grid().view().live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, BufferSlot, World};
    use cell_lab_core::{
        CellCoord, CellShading, CellValue, Command, ConfigError, EditError, Event, GridSize,
        Ruleset, StepConfig, Topology,
    };

    fn configured_world(edge: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                size: GridSize::new(edge),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::GridConfigured {
                size: GridSize::new(edge)
            }]
        );
        world
    }

    fn write(world: &mut World, column: u32, row: u32, value: CellValue) {
        let mut events = Vec::new();
        apply(
            world,
            Command::WriteCell {
                cell: CellCoord::new(column, row),
                value,
            },
            &mut events,
        );
        assert!(matches!(events.as_slice(), [Event::CellWritten { .. }]));
    }

    fn step_with(world: &mut World, config: StepConfig) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Step { config }, &mut events);
        events
    }

    fn grid_cells(world: &World) -> Vec<CellValue> {
        query::grid_view(world).iter().collect()
    }

    #[test]
    fn new_world_starts_dead_at_generation_zero() {
        let world = World::new();
        assert_eq!(query::generation(&world).get(), 0);
        assert_eq!(query::population(&world), 0);
        assert_eq!(query::live_buffer(&world), BufferSlot::A);
        assert_eq!(
            query::pattern_size(&world).get(),
            query::grid_size(&world).get() / 3
        );
    }

    #[test]
    fn configure_grid_rejects_sizes_below_minimum() {
        let mut world = configured_world(8);
        write(&mut world, 1, 1, CellValue::LIVE);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                size: GridSize::new(2),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ConfigurationRejected {
                size: GridSize::new(2),
                reason: ConfigError::SizeBelowMinimum,
            }]
        );
        assert_eq!(query::grid_size(&world).get(), 8);
        assert_eq!(query::population(&world), 1);
    }

    #[test]
    fn configure_grid_discards_contents_and_resets_generation() {
        let mut world = configured_world(6);
        write(&mut world, 2, 2, CellValue::LIVE);
        let _ = step_with(&mut world, StepConfig::default());

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                size: GridSize::new(9),
            },
            &mut events,
        );

        assert_eq!(query::grid_size(&world).get(), 9);
        assert_eq!(query::generation(&world).get(), 0);
        assert_eq!(query::population(&world), 0);
        assert_eq!(query::live_buffer(&world), BufferSlot::A);
    }

    #[test]
    fn write_rejects_out_of_bounds_coordinates() {
        let mut world = configured_world(4);
        let before = grid_cells(&world);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::WriteCell {
                cell: CellCoord::new(4, 0),
                value: CellValue::LIVE,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::EditRejected {
                cell: CellCoord::new(4, 0),
                reason: EditError::OutOfBounds,
            }]
        );
        assert_eq!(grid_cells(&world), before);
    }

    #[test]
    fn toggle_flips_between_dead_and_alive() {
        let mut world = configured_world(5);
        let cell = CellCoord::new(2, 2);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ToggleCell {
                cell,
                shading: CellShading::Monochrome,
                topology: Topology::Bounded,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CellToggled {
                cell,
                value: CellValue::LIVE
            }]
        );

        events.clear();
        apply(
            &mut world,
            Command::ToggleCell {
                cell,
                shading: CellShading::Monochrome,
                topology: Topology::Bounded,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CellToggled {
                cell,
                value: CellValue::DEAD
            }]
        );
    }

    #[test]
    fn graded_toggle_stores_neighbor_count_plus_one() {
        let mut world = configured_world(5);
        write(&mut world, 1, 1, CellValue::LIVE);
        write(&mut world, 3, 1, CellValue::LIVE);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ToggleCell {
                cell: CellCoord::new(2, 1),
                shading: CellShading::Graded,
                topology: Topology::Bounded,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CellToggled {
                cell: CellCoord::new(2, 1),
                value: CellValue::graded(3),
            }]
        );
    }

    #[test]
    fn step_advances_generation_and_swaps_buffers() {
        let mut world = configured_world(5);
        // Vertical blinker through the center column.
        write(&mut world, 2, 1, CellValue::LIVE);
        write(&mut world, 2, 2, CellValue::LIVE);
        write(&mut world, 2, 3, CellValue::LIVE);

        let events = step_with(&mut world, StepConfig::default());

        assert!(matches!(
            events.as_slice(),
            [Event::GenerationAdvanced { generation }] if generation.get() == 1
        ));
        assert_eq!(query::live_buffer(&world), BufferSlot::B);
        assert_eq!(query::population(&world), 3);
        for column in 1..=3 {
            assert!(query::cell(&world, CellCoord::new(column, 2))
                .expect("cell in bounds")
                .is_alive());
        }
    }

    #[test]
    fn generation_increments_once_per_step() {
        let mut world = configured_world(6);
        for expected in 1..=5 {
            let _ = step_with(&mut world, StepConfig::default());
            assert_eq!(query::generation(&world).get(), expected);
        }
    }

    #[test]
    fn step_rejects_invalid_rules_and_leaves_state_untouched() {
        let mut world = configured_world(5);
        write(&mut world, 2, 2, CellValue::LIVE);
        let before = grid_cells(&world);

        let config = StepConfig {
            rules: Ruleset {
                min_on_max_off: 0,
                ..Ruleset::classic()
            },
            ..StepConfig::default()
        };
        let events = step_with(&mut world, config);

        assert_eq!(
            events,
            vec![Event::StepRejected {
                reason: ConfigError::ThresholdOutOfRange
            }]
        );
        assert_eq!(query::generation(&world).get(), 0);
        assert_eq!(query::live_buffer(&world), BufferSlot::A);
        assert_eq!(grid_cells(&world), before);
    }

    #[test]
    fn clear_zeroes_both_buffers_and_resets_generation() {
        let mut world = configured_world(5);
        write(&mut world, 2, 2, CellValue::LIVE);
        write(&mut world, 2, 3, CellValue::LIVE);
        let _ = step_with(&mut world, StepConfig::default());

        let mut events = Vec::new();
        apply(&mut world, Command::ClearGrid, &mut events);

        assert_eq!(events, vec![Event::GridCleared]);
        assert_eq!(query::generation(&world).get(), 0);
        assert_eq!(query::population(&world), 0);

        // The shadow buffer was zeroed too: stepping twice stays dead.
        let _ = step_with(&mut world, StepConfig::default());
        let _ = step_with(&mut world, StepConfig::default());
        assert_eq!(query::population(&world), 0);
    }

    #[test]
    fn stamp_then_copy_round_trips_the_pattern() {
        let mut world = configured_world(12);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePattern {
                size: GridSize::new(3),
            },
            &mut events,
        );
        for cell in [CellCoord::new(0, 0), CellCoord::new(1, 1), CellCoord::new(2, 2)] {
            apply(
                &mut world,
                Command::WritePatternCell {
                    cell,
                    value: CellValue::LIVE,
                },
                &mut events,
            );
        }
        let before: Vec<CellValue> = query::pattern_view(&world).iter().collect();

        let origin = CellCoord::new(4, 5);
        events.clear();
        apply(&mut world, Command::StampPattern { origin }, &mut events);
        assert_eq!(events, vec![Event::PatternStamped { origin }]);
        assert!(query::cell(&world, CellCoord::new(5, 6))
            .expect("cell in bounds")
            .is_alive());

        events.clear();
        apply(&mut world, Command::ClearPattern, &mut events);
        apply(&mut world, Command::CopyPattern { origin }, &mut events);
        assert_eq!(
            events,
            vec![Event::PatternCleared, Event::PatternCopied { origin }]
        );

        let after: Vec<CellValue> = query::pattern_view(&world).iter().collect();
        assert_eq!(after, before);
    }

    #[test]
    fn stamp_rejects_footprints_past_the_far_edge() {
        let mut world = configured_world(8);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePattern {
                size: GridSize::new(4),
            },
            &mut events,
        );
        let before = grid_cells(&world);

        events.clear();
        apply(
            &mut world,
            Command::StampPattern {
                origin: CellCoord::new(5, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                origin: CellCoord::new(5, 0),
                reason: EditError::OutOfBounds,
            }]
        );
        assert_eq!(grid_cells(&world), before);

        // The last origin that still fits is accepted.
        events.clear();
        apply(
            &mut world,
            Command::StampPattern {
                origin: CellCoord::new(4, 4),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PatternStamped {
                origin: CellCoord::new(4, 4)
            }]
        );
    }

    #[test]
    fn copy_rejects_footprints_past_the_far_edge() {
        let mut world = configured_world(6);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePattern {
                size: GridSize::new(3),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::CopyPattern {
                origin: CellCoord::new(0, 4),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                origin: CellCoord::new(0, 4),
                reason: EditError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn pattern_toggle_counts_neighbors_inside_the_pattern_buffer() {
        let mut world = configured_world(9);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePattern {
                size: GridSize::new(3),
            },
            &mut events,
        );
        // Live cells on the main grid must not leak into the count.
        write(&mut world, 0, 0, CellValue::LIVE);
        write(&mut world, 1, 0, CellValue::LIVE);
        apply(
            &mut world,
            Command::WritePatternCell {
                cell: CellCoord::new(0, 1),
                value: CellValue::LIVE,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::TogglePatternCell {
                cell: CellCoord::new(1, 1),
                shading: CellShading::Graded,
                topology: Topology::Bounded,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PatternCellToggled {
                cell: CellCoord::new(1, 1),
                value: CellValue::graded(2),
            }]
        );
    }

    #[test]
    fn deterministic_for_identical_command_sequences() {
        let commands = |world: &mut World| {
            let mut events = Vec::new();
            apply(
                world,
                Command::ConfigureGrid {
                    size: GridSize::new(10),
                },
                &mut events,
            );
            for column in 3..6 {
                apply(
                    world,
                    Command::WriteCell {
                        cell: CellCoord::new(column, 4),
                        value: CellValue::LIVE,
                    },
                    &mut events,
                );
            }
            for _ in 0..7 {
                apply(
                    world,
                    Command::Step {
                        config: StepConfig::default(),
                    },
                    &mut events,
                );
            }
            events
        };

        let mut first = World::new();
        let mut second = World::new();
        let first_events = commands(&mut first);
        let second_events = commands(&mut second);

        assert_eq!(first_events, second_events);
        assert_eq!(grid_cells(&first), grid_cells(&second));
        assert_eq!(query::generation(&first), query::generation(&second));
    }
}
