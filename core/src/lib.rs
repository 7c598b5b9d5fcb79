#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cell Lab engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems are pure functions over immutable views such as
//! [`GridView`] and never touch world state directly.

use serde::{Deserialize, Serialize};

/// Smallest grid edge the neighbor rules support.
///
/// Below three cells per side there is no interior ring and the bounded
/// neighbor enumeration degenerates.
pub const MIN_GRID_SIZE: u32 = 3;

/// Largest number of live neighbors a cell can observe in a Moore
/// neighborhood.
pub const MAX_NEIGHBORS: u8 = 8;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Reallocates both generation buffers at the provided edge length,
    /// discarding prior contents and resetting the generation counter.
    ConfigureGrid {
        /// Number of cells along each edge of the square grid.
        size: GridSize,
    },
    /// Reallocates the pattern buffer at the provided edge length,
    /// discarding its prior contents.
    ConfigurePattern {
        /// Number of cells along each edge of the square pattern buffer.
        size: GridSize,
    },
    /// Writes a single cell of the live grid.
    WriteCell {
        /// Coordinate of the cell to overwrite.
        cell: CellCoord,
        /// Value stored into the cell.
        value: CellValue,
    },
    /// Flips a live-grid cell between dead and alive, deriving the live
    /// value from the shading mode.
    ToggleCell {
        /// Coordinate of the cell to flip.
        cell: CellCoord,
        /// Shading that determines the value a newly live cell receives.
        shading: CellShading,
        /// Topology used when a graded value needs a neighbor count.
        topology: Topology,
    },
    /// Advances the simulation by one generation under the provided
    /// configuration.
    Step {
        /// Rules, topology and shading applied to this step.
        config: StepConfig,
    },
    /// Zeros both generation buffers and resets the generation counter.
    ClearGrid,
    /// Copies the whole pattern buffer into the live grid at an origin.
    StampPattern {
        /// Upper-left live-grid cell receiving the pattern's (0, 0) cell.
        origin: CellCoord,
    },
    /// Captures a pattern-sized region of the live grid into the pattern
    /// buffer.
    CopyPattern {
        /// Upper-left live-grid cell of the captured region.
        origin: CellCoord,
    },
    /// Zeros the pattern buffer.
    ClearPattern,
    /// Writes a single cell of the pattern buffer.
    WritePatternCell {
        /// Coordinate of the pattern cell to overwrite.
        cell: CellCoord,
        /// Value stored into the pattern cell.
        value: CellValue,
    },
    /// Flips a pattern-buffer cell between dead and alive.
    TogglePatternCell {
        /// Coordinate of the pattern cell to flip.
        cell: CellCoord,
        /// Shading that determines the value a newly live cell receives.
        shading: CellShading,
        /// Topology used when a graded value needs a neighbor count.
        topology: Topology,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the generation buffers were reallocated.
    GridConfigured {
        /// Edge length of the freshly allocated grid.
        size: GridSize,
    },
    /// Confirms that the pattern buffer was reallocated.
    PatternConfigured {
        /// Edge length of the freshly allocated pattern buffer.
        size: GridSize,
    },
    /// Confirms that a live-grid cell was overwritten.
    CellWritten {
        /// Coordinate of the updated cell.
        cell: CellCoord,
        /// Value now stored in the cell.
        value: CellValue,
    },
    /// Confirms that a live-grid cell was flipped.
    CellToggled {
        /// Coordinate of the flipped cell.
        cell: CellCoord,
        /// Value the cell holds after the flip.
        value: CellValue,
    },
    /// Announces that a step completed and the live buffer swapped.
    GenerationAdvanced {
        /// Generation counter after the step.
        generation: Generation,
    },
    /// Confirms that both generation buffers were zeroed.
    GridCleared,
    /// Confirms that the pattern buffer was stamped into the live grid.
    PatternStamped {
        /// Upper-left live-grid cell that received the pattern.
        origin: CellCoord,
    },
    /// Confirms that a live-grid region was captured into the pattern
    /// buffer.
    PatternCopied {
        /// Upper-left live-grid cell of the captured region.
        origin: CellCoord,
    },
    /// Confirms that the pattern buffer was zeroed.
    PatternCleared,
    /// Confirms that a pattern-buffer cell was overwritten.
    PatternCellWritten {
        /// Coordinate of the updated pattern cell.
        cell: CellCoord,
        /// Value now stored in the pattern cell.
        value: CellValue,
    },
    /// Confirms that a pattern-buffer cell was flipped.
    PatternCellToggled {
        /// Coordinate of the flipped pattern cell.
        cell: CellCoord,
        /// Value the pattern cell holds after the flip.
        value: CellValue,
    },
    /// Reports that a cell edit was rejected.
    EditRejected {
        /// Coordinate provided in the rejected edit.
        cell: CellCoord,
        /// Specific reason the edit failed.
        reason: EditError,
    },
    /// Reports that a stamp or copy request was rejected.
    PlacementRejected {
        /// Origin provided in the rejected request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: EditError,
    },
    /// Reports that a step request was rejected.
    StepRejected {
        /// Specific reason the step configuration failed validation.
        reason: ConfigError,
    },
    /// Reports that a grid or pattern reconfiguration was rejected.
    ConfigurationRejected {
        /// Edge length provided in the rejected request.
        size: GridSize,
        /// Specific reason the configuration failed.
        reason: ConfigError,
    },
}

/// Reasons the world may reject a cell edit or pattern placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditError {
    /// The coordinate or pattern footprint falls outside the grid bounds.
    OutOfBounds,
}

/// Reasons a ruleset or grid configuration fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigError {
    /// A rule threshold fell outside the supported `1..=8` neighbor range.
    ThresholdOutOfRange,
    /// The survival window is inverted: the lower threshold exceeds the
    /// upper one while the basic rule is active.
    ThresholdsInverted,
    /// The requested edge length is below [`MIN_GRID_SIZE`].
    SizeBelowMinimum,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Edge length of a square grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new edge-length wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying edge length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells contained in a grid of this size.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        (self.0 as usize) * (self.0 as usize)
    }

    /// Reports whether the coordinate lies inside a grid of this size.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.0 && cell.row() < self.0
    }

    /// Row-major storage index of the coordinate, if it is in bounds.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.0).ok()?;
        Some(row * width + column)
    }
}

/// Contents of a single grid cell.
///
/// Zero is dead. A non-zero value is alive; under monochrome shading live
/// cells always hold one, under graded shading they hold the neighbor count
/// that produced them, so every value lies in `0..=8`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellValue(u8);

impl CellValue {
    /// The dead cell value.
    pub const DEAD: Self = Self(0);

    /// The plain live cell value used by monochrome shading.
    pub const LIVE: Self = Self(1);

    /// Wraps a raw value, refusing anything above [`MAX_NEIGHBORS`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= MAX_NEIGHBORS {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Derives a graded live value from a neighbor count, clamped to
    /// `1..=8`.
    #[must_use]
    pub const fn graded(neighbors: u8) -> Self {
        if neighbors == 0 {
            Self(1)
        } else if neighbors > MAX_NEIGHBORS {
            Self(MAX_NEIGHBORS)
        } else {
            Self(neighbors)
        }
    }

    /// Retrieves the raw stored value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the cell is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.0 != 0
    }

    /// Reports whether the cell is dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.0 == 0
    }
}

/// Number of completed steps since the world was created, cleared, or
/// reconfigured.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// The counter value before any step has completed.
    pub const ZERO: Self = Self(0);

    /// Retrieves the number of completed steps.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The counter value after one further completed step.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Edge behavior used when enumerating a cell's neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Offsets that leave the grid are omitted; corners see three
    /// candidates, edges five, interior cells eight.
    #[default]
    Bounded,
    /// Toroidal wrap-around; every cell sees exactly eight candidates
    /// borrowed from the opposite side where necessary.
    Wrapped,
}

/// Value a cell receives when it becomes or remains alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellShading {
    /// Live cells always store one.
    #[default]
    Monochrome,
    /// Live cells store the neighbor count that produced them, re-derived
    /// every generation.
    Graded,
}

/// Set of neighbor counts that trigger a wildcard rule.
///
/// Counts are keyed `1..=8`; a count of zero never matches, so an empty
/// neighborhood cannot fire a wildcard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardSet(u8);

impl WildcardSet {
    /// The set matching no neighbor count.
    pub const EMPTY: Self = Self(0);

    /// Returns a copy of the set with the provided count included.
    ///
    /// Counts outside `1..=8` leave the set unchanged.
    #[must_use]
    pub const fn with(self, count: u8) -> Self {
        if count >= 1 && count <= MAX_NEIGHBORS {
            Self(self.0 | 1 << (count - 1))
        } else {
            self
        }
    }

    /// Returns a copy of the set with the provided count removed.
    #[must_use]
    pub const fn without(self, count: u8) -> Self {
        if count >= 1 && count <= MAX_NEIGHBORS {
            Self(self.0 & !(1 << (count - 1)))
        } else {
            self
        }
    }

    /// Reports whether the provided count triggers the wildcard.
    #[must_use]
    pub const fn contains(&self, count: u8) -> bool {
        count >= 1 && count <= MAX_NEIGHBORS && self.0 & 1 << (count - 1) != 0
    }

    /// Reports whether the set matches no count at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Complete rule configuration for one generation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ruleset {
    /// Neighbor count below which a live cell dies; a live cell with
    /// exactly this many neighbors survives.
    pub min_on_max_off: u8,
    /// Neighbor count above which a live cell dies; a dead cell with
    /// exactly this many neighbors is born.
    pub max_on_min_off: u8,
    /// Disables the basic threshold rule entirely, leaving only wildcards.
    pub wildcards_only: bool,
    /// Neighbor counts at which a dead cell is born regardless of the
    /// basic rule.
    pub wildcards_on: WildcardSet,
    /// Neighbor counts at which a live cell dies regardless of the basic
    /// rule, overriding every earlier outcome.
    pub wildcards_off: WildcardSet,
}

impl Ruleset {
    /// Classic Conway rules: survive on two or three neighbors, birth on
    /// exactly three, no wildcards.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            min_on_max_off: 2,
            max_on_min_off: 3,
            wildcards_only: false,
            wildcards_on: WildcardSet::EMPTY,
            wildcards_off: WildcardSet::EMPTY,
        }
    }

    /// Checks the configuration against the supported threshold range and
    /// ordering.
    ///
    /// Threshold range is enforced even in wildcards-only mode; ordering is
    /// only required while the basic rule is active.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |threshold: u8| threshold >= 1 && threshold <= MAX_NEIGHBORS;
        if !in_range(self.min_on_max_off) || !in_range(self.max_on_min_off) {
            return Err(ConfigError::ThresholdOutOfRange);
        }
        if !self.wildcards_only && self.min_on_max_off > self.max_on_min_off {
            return Err(ConfigError::ThresholdsInverted);
        }
        Ok(())
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::classic()
    }
}

/// Everything a single generation step needs to know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepConfig {
    /// Threshold and wildcard rules evaluated per cell.
    pub rules: Ruleset,
    /// Edge behavior used while counting neighbors.
    pub topology: Topology,
    /// Value derivation for cells that become or remain alive.
    pub shading: CellShading,
}

/// Read-only view into a dense square cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellValue],
    size: GridSize,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellValue], size: GridSize) -> Self {
        debug_assert_eq!(cells.len(), size.cell_count());
        Self { cells, size }
    }

    /// Edge length of the viewed grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the value stored at the coordinate, if it is in bounds.
    #[must_use]
    pub fn value(&self, cell: CellCoord) -> Option<CellValue> {
        self.size
            .index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the coordinate holds a live cell; out-of-bounds
    /// coordinates read as dead.
    #[must_use]
    pub fn is_live(&self, cell: CellCoord) -> bool {
        self.value(cell).is_some_and(|value| value.is_alive())
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellValue> + 'a {
        self.cells.iter().copied()
    }

    /// Number of live cells in the viewed grid.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|value| value.is_alive()).count()
    }
}
