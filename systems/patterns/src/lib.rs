#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in pattern stencils and the command batches that load them.
//!
//! A stencil is a named set of live cells relative to the pattern buffer's
//! upper-left corner. Loading one produces a command batch the world
//! executes like any other host input: clear the pattern buffer, then
//! write the stencil's cells.

use cell_lab_core::{CellCoord, CellValue, Command};

/// A named arrangement of live cells, addressed as `(column, row)` offsets
/// from the pattern buffer's upper-left corner.
#[derive(Debug)]
pub struct Stencil {
    /// Human-readable stencil name used for lookup.
    pub name: &'static str,
    /// Live cells of the stencil.
    pub cells: &'static [(u32, u32)],
}

impl Stencil {
    /// Smallest pattern-buffer edge that holds every cell of the stencil.
    #[must_use]
    pub fn required_edge(&self) -> u32 {
        self.cells
            .iter()
            .map(|&(column, row)| column.max(row).saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Commands that load the stencil into the pattern buffer.
    #[must_use]
    pub fn load_commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.cells.len() + 1);
        commands.push(Command::ClearPattern);
        for &(column, row) in self.cells {
            commands.push(Command::WritePatternCell {
                cell: CellCoord::new(column, row),
                value: CellValue::LIVE,
            });
        }
        commands
    }
}

/// Stencils available to every host.
pub const STENCILS: &[Stencil] = &[
    Stencil {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Stencil {
        name: "blinker",
        cells: &[(0, 1), (1, 1), (2, 1)],
    },
    Stencil {
        name: "toad",
        cells: &[(1, 1), (2, 1), (3, 1), (0, 2), (1, 2), (2, 2)],
    },
    Stencil {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Stencil {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

/// Finds a stencil by name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static Stencil> {
    STENCILS
        .iter()
        .find(|stencil| stencil.name.eq_ignore_ascii_case(name))
}
