#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Cell Lab world.
//!
//! The binary owns everything the engine treats as host concerns: argument
//! parsing, seeding the grid, pacing the generations, text output, and the
//! transfer-string format for moving grids between invocations.

mod grid_transfer;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use cell_lab_core::{
    CellCoord, CellShading, CellValue, Command, Event, GridSize, Ruleset, StepConfig, Topology,
    WildcardSet, MIN_GRID_SIZE,
};
use cell_lab_system_patterns as patterns;
use cell_lab_world::{self as world, query, World};

use crate::grid_transfer::GridSnapshot;

/// Runs generations of a generalized Game of Life grid.
#[derive(Debug, Parser)]
#[command(name = "cell-lab")]
struct Args {
    /// Edge length of the square grid.
    #[arg(long, default_value_t = 24)]
    size: u32,

    /// Number of generations to run.
    #[arg(long, default_value_t = 10)]
    generations: u64,

    /// Neighbor count at which a live cell barely survives; below it the
    /// cell dies.
    #[arg(long, default_value_t = 2)]
    min_on: u8,

    /// Neighbor count at which a dead cell is born; above it a live cell
    /// dies.
    #[arg(long, default_value_t = 3)]
    max_on: u8,

    /// Disable the threshold rule and evaluate wildcards only.
    #[arg(long)]
    wildcards_only: bool,

    /// Neighbor count at which a dead cell is born regardless of the
    /// thresholds. May be repeated.
    #[arg(long = "wildcard-on", value_name = "COUNT")]
    wildcard_on: Vec<u8>,

    /// Neighbor count at which a live cell dies regardless of the
    /// thresholds. May be repeated.
    #[arg(long = "wildcard-off", value_name = "COUNT")]
    wildcard_off: Vec<u8>,

    /// Wrap neighbor counting around the grid edges.
    #[arg(long)]
    wrap: bool,

    /// Store neighbor counts in live cells instead of a flat one.
    #[arg(long)]
    graded: bool,

    /// Stencil stamped into the center of the grid before stepping.
    #[arg(long, conflicts_with_all = ["random", "load"])]
    stencil: Option<String>,

    /// Fill the grid randomly with the given live-cell density in 0..=1.
    #[arg(long, value_name = "DENSITY", conflicts_with = "load")]
    random: Option<f64>,

    /// Seed for the random fill.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Restore a grid from a transfer string emitted by --emit.
    #[arg(long, value_name = "SNAPSHOT")]
    load: Option<String>,

    /// Print a transfer string of the final grid.
    #[arg(long)]
    emit: bool,

    /// Print the final grid as text.
    #[arg(long)]
    show: bool,
}

/// Entry point for the Cell Lab command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let config = step_config(&args)?;
    config
        .rules
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid rule configuration: {reason:?}"))?;

    let mut instance = World::new();
    let mut events = Vec::new();

    apply_checked(
        &mut instance,
        Command::ConfigureGrid {
            size: GridSize::new(args.size),
        },
        &mut events,
    )
    .with_context(|| format!("grid size {} is not usable", args.size))?;

    seed_world(&mut instance, &args, &mut events)?;

    for _ in 0..args.generations {
        apply_checked(&mut instance, Command::Step { config }, &mut events)
            .context("step failed")?;
    }

    println!(
        "generation {} population {}",
        query::generation(&instance).get(),
        query::population(&instance)
    );

    if args.show {
        print_grid(&instance);
    }

    if args.emit {
        let snapshot = capture_snapshot(&instance);
        println!("{}", snapshot.encode());
    }

    Ok(())
}

fn step_config(args: &Args) -> Result<StepConfig> {
    let rules = Ruleset {
        min_on_max_off: args.min_on,
        max_on_min_off: args.max_on,
        wildcards_only: args.wildcards_only,
        wildcards_on: wildcard_set(&args.wildcard_on)?,
        wildcards_off: wildcard_set(&args.wildcard_off)?,
    };
    let topology = if args.wrap {
        Topology::Wrapped
    } else {
        Topology::Bounded
    };
    let shading = if args.graded {
        CellShading::Graded
    } else {
        CellShading::Monochrome
    };
    Ok(StepConfig {
        rules,
        topology,
        shading,
    })
}

fn wildcard_set(counts: &[u8]) -> Result<WildcardSet> {
    let mut set = WildcardSet::EMPTY;
    for &count in counts {
        if !(1..=8).contains(&count) {
            bail!("wildcard count {count} is outside 1..=8");
        }
        set = set.with(count);
    }
    Ok(set)
}

fn seed_world(instance: &mut World, args: &Args, events: &mut Vec<Event>) -> Result<()> {
    if let Some(snapshot) = &args.load {
        let snapshot = GridSnapshot::decode(snapshot).context("could not read --load snapshot")?;
        restore_snapshot(instance, &snapshot, events)
            .context("snapshot does not fit a usable grid")?;
    } else if let Some(name) = &args.stencil {
        let stencil = patterns::find(name)
            .with_context(|| format!("unknown stencil '{name}'"))?;
        load_and_stamp(instance, stencil, events)
            .with_context(|| format!("stencil '{name}' does not fit a {0}x{0} grid", args.size))?;
    } else if let Some(density) = args.random {
        if !(0.0..=1.0).contains(&density) {
            bail!("--random density {density} is outside 0..=1");
        }
        random_fill(instance, density, args.seed, events)?;
    }
    Ok(())
}

fn restore_snapshot(
    instance: &mut World,
    snapshot: &GridSnapshot,
    events: &mut Vec<Event>,
) -> Result<()> {
    apply_checked(
        instance,
        Command::ConfigureGrid {
            size: GridSize::new(snapshot.size),
        },
        events,
    )?;
    for (index, &raw) in snapshot.cells.iter().enumerate() {
        if raw == 0 {
            continue;
        }
        let value = CellValue::new(raw).context("snapshot value out of range")?;
        let column = (index as u32) % snapshot.size;
        let row = (index as u32) / snapshot.size;
        apply_checked(
            instance,
            Command::WriteCell {
                cell: CellCoord::new(column, row),
                value,
            },
            events,
        )?;
    }
    Ok(())
}

fn load_and_stamp(
    instance: &mut World,
    stencil: &patterns::Stencil,
    events: &mut Vec<Event>,
) -> Result<()> {
    let edge = stencil.required_edge().max(MIN_GRID_SIZE);
    apply_checked(
        instance,
        Command::ConfigurePattern {
            size: GridSize::new(edge),
        },
        events,
    )?;
    for command in stencil.load_commands() {
        apply_checked(instance, command, events)?;
    }

    let grid_edge = query::grid_size(instance).get();
    if edge > grid_edge {
        bail!("stencil needs a {edge}x{edge} area");
    }
    let offset = (grid_edge - edge) / 2;
    apply_checked(
        instance,
        Command::StampPattern {
            origin: CellCoord::new(offset, offset),
        },
        events,
    )
}

fn random_fill(
    instance: &mut World,
    density: f64,
    seed: u64,
    events: &mut Vec<Event>,
) -> Result<()> {
    let edge = query::grid_size(instance).get();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for row in 0..edge {
        for column in 0..edge {
            if rng.gen_bool(density) {
                apply_checked(
                    instance,
                    Command::WriteCell {
                        cell: CellCoord::new(column, row),
                        value: CellValue::LIVE,
                    },
                    events,
                )?;
            }
        }
    }
    Ok(())
}

/// Applies one command and fails if the world rejected it.
fn apply_checked(instance: &mut World, command: Command, events: &mut Vec<Event>) -> Result<()> {
    let watermark = events.len();
    world::apply(instance, command, events);
    for event in &events[watermark..] {
        match event {
            Event::EditRejected { cell, reason } => {
                bail!("edit at {},{} rejected: {reason:?}", cell.column(), cell.row())
            }
            Event::PlacementRejected { origin, reason } => bail!(
                "placement at {},{} rejected: {reason:?}",
                origin.column(),
                origin.row()
            ),
            Event::StepRejected { reason } => bail!("step rejected: {reason:?}"),
            Event::ConfigurationRejected { size, reason } => {
                bail!("size {} rejected: {reason:?}", size.get())
            }
            _ => {}
        }
    }
    Ok(())
}

fn capture_snapshot(instance: &World) -> GridSnapshot {
    let view = query::grid_view(instance);
    GridSnapshot {
        size: view.size().get(),
        cells: view.iter().map(|value| value.get()).collect(),
    }
}

fn print_grid(instance: &World) {
    let view = query::grid_view(instance);
    let edge = view.size().get();
    for row in 0..edge {
        let mut line = String::with_capacity(edge as usize);
        for column in 0..edge {
            let value = view
                .value(CellCoord::new(column, row))
                .unwrap_or(CellValue::DEAD);
            let glyph = match value.get() {
                0 => '.',
                1 => '#',
                digit => char::from(b'0' + digit),
            };
            line.push(glyph);
        }
        println!("{line}");
    }
}
