#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure generation-stepping rules for Cell Lab grids.
//!
//! Everything here is a function of its arguments: neighbor counting over a
//! read-only [`GridView`], the per-cell transition, and the full-grid pass
//! that derives the next generation. The world owns the buffers and calls
//! [`advance`] while executing a step command.

use cell_lab_core::{CellCoord, CellShading, CellValue, GridView, Ruleset, StepConfig, Topology};

/// Moore neighborhood offsets as `(column delta, row delta)` pairs.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counts the live cells among the up-to-eight Moore neighbors of `cell`.
///
/// Under [`Topology::Bounded`] offsets that leave the grid are omitted, so
/// corners see three candidates, edge cells five, and interior cells eight.
/// Under [`Topology::Wrapped`] indices wrap to the opposite side and every
/// cell sees exactly eight candidates. Any non-zero value counts as one
/// live neighbor; magnitude never weights the count.
#[must_use]
pub fn live_neighbors(view: GridView<'_>, cell: CellCoord, topology: Topology) -> u8 {
    let edge = i64::from(view.size().get());
    let column = i64::from(cell.column());
    let row = i64::from(cell.row());

    let mut count = 0;
    for (column_delta, row_delta) in NEIGHBOR_OFFSETS {
        let neighbor_column = column + column_delta;
        let neighbor_row = row + row_delta;

        let neighbor = match topology {
            Topology::Bounded => {
                if neighbor_column < 0
                    || neighbor_row < 0
                    || neighbor_column >= edge
                    || neighbor_row >= edge
                {
                    continue;
                }
                CellCoord::new(neighbor_column as u32, neighbor_row as u32)
            }
            Topology::Wrapped => CellCoord::new(
                neighbor_column.rem_euclid(edge) as u32,
                neighbor_row.rem_euclid(edge) as u32,
            ),
        };

        if view.is_live(neighbor) {
            count += 1;
        }
    }
    count
}

/// Derives the next value of a single cell from its current value and live
/// neighbor count.
///
/// Rules apply in a fixed order and later rules override earlier ones:
/// the basic threshold rule (skipped entirely in wildcards-only mode),
/// then wildcard-on births, then wildcard-off deaths. A wildcard-off match
/// kills the cell even when the basic rule just kept it alive.
#[must_use]
pub fn next_value(
    current: CellValue,
    neighbors: u8,
    rules: &Ruleset,
    shading: CellShading,
) -> CellValue {
    let mut next = if rules.wildcards_only {
        CellValue::DEAD
    } else {
        basic_next(current, neighbors, rules, shading)
    };

    if current.is_dead() && neighbors > 0 && rules.wildcards_on.contains(neighbors) {
        next = live_value(neighbors, shading);
    }
    if current.is_alive() && neighbors > 0 && rules.wildcards_off.contains(neighbors) {
        next = CellValue::DEAD;
    }
    next
}

/// Basic threshold rule. Survival happens only at exactly the two
/// thresholds; a live cell whose count falls strictly between them dies.
fn basic_next(current: CellValue, neighbors: u8, rules: &Ruleset, shading: CellShading) -> CellValue {
    if current.is_dead() {
        if neighbors == rules.max_on_min_off {
            live_value(neighbors, shading)
        } else {
            CellValue::DEAD
        }
    } else if neighbors == rules.min_on_max_off || neighbors == rules.max_on_min_off {
        live_value(neighbors, shading)
    } else {
        CellValue::DEAD
    }
}

fn live_value(neighbors: u8, shading: CellShading) -> CellValue {
    match shading {
        CellShading::Monochrome => CellValue::LIVE,
        CellShading::Graded => CellValue::graded(neighbors),
    }
}

/// Computes one full generation from `current` into `next`.
///
/// Every destination cell is overwritten; the source view is only read, so
/// the pass observes the pre-step state exclusively. `next` must hold
/// exactly one cell per source cell.
pub fn advance(current: GridView<'_>, next: &mut [CellValue], config: &StepConfig) {
    debug_assert_eq!(current.size().cell_count(), next.len());

    let edge = current.size().get();
    let mut index = 0;
    for row in 0..edge {
        for column in 0..edge {
            let cell = CellCoord::new(column, row);
            let neighbors = live_neighbors(current, cell, config.topology);
            let value = current.value(cell).unwrap_or(CellValue::DEAD);
            next[index] = next_value(value, neighbors, &config.rules, config.shading);
            index += 1;
        }
    }
}
