// SPDX-License-Identifier: AGPL-3.0-only

//! `systolic` — command-line driver for the systolic array simulator.
//!
//! ```text
//! USAGE:
//!   systolic run      [shape] [--cycles C] [--output trace.json]   Run and export a trace
//!   systolic schedule [shape]                                      Control signals per cycle
//!   systolic result   [shape]                                      Final output memory
//!
//! shape: --width N --stream L | --config sim.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use systolic_sim::{Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "systolic", about = "Output-stationary systolic array simulator", version)]
struct Cli {
    /// Log every cycle (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Simulate and optionally write the per-cycle trace as JSON.
    Run {
        #[command(flatten)]
        shape: ShapeArgs,
        /// Cycles to simulate (default: 3·width + stream).
        #[arg(long)]
        cycles: Option<usize>,
        /// Write the trace to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the control signals for every cycle of the full schedule.
    Schedule {
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Run the full schedule and print the output memory.
    Result {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

#[derive(Args)]
struct ShapeArgs {
    /// Array width N (X is N×L, W is L×N).
    #[arg(short, long, default_value_t = 2)]
    width: usize,
    /// Stream length L (the reduction length).
    #[arg(short, long, default_value_t = 2)]
    stream: usize,
    /// Load the full config from a JSON file instead.
    #[arg(short, long, conflicts_with_all = ["width", "stream"])]
    config: Option<PathBuf>,
}

impl ShapeArgs {
    fn load(&self) -> Result<SimulationConfig> {
        match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(SimulationConfig::square(self.width, self.stream)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Cmd::Run {
            shape,
            cycles,
            output,
        } => cmd_run(&shape, cycles, output.as_deref())?,
        Cmd::Schedule { shape } => cmd_schedule(&shape)?,
        Cmd::Result { shape } => cmd_result(&shape)?,
    }

    Ok(())
}

fn cmd_run(shape: &ShapeArgs, cycles: Option<usize>, output: Option<&std::path::Path>) -> Result<()> {
    let config = shape.load()?;
    let mut sim = Simulation::new(config)?;
    let trace = sim.run(cycles)?;

    println!(
        "Simulated {} cycles on a {}x{} array",
        trace.len(),
        sim.schedule().array_width,
        sim.schedule().array_width
    );
    for snap in trace
        .snapshots
        .iter()
        .filter(|s| s.signals.y_mem_write_enable)
    {
        println!(
            "  cycle {:3}: drained row {} into {}",
            snap.cycle,
            snap.signals.y_mem_write_addr,
            sim.config().y_name
        );
    }

    if let Some(path) = output {
        trace
            .save(path)
            .with_context(|| format!("writing trace {}", path.display()))?;
        println!("Trace written to {}", path.display());
    }
    Ok(())
}

fn cmd_schedule(shape: &ShapeArgs) -> Result<()> {
    let config = shape.load()?;
    let sim = Simulation::new(config)?;
    let schedule = sim.schedule();

    println!(
        "N={} L={}  drain {}..{}  total {} cycles",
        schedule.array_width,
        schedule.stream_length,
        schedule.drain_start(),
        schedule.drain_end(),
        schedule.total_cycles()
    );
    println!("cycle  rdX  addr  rdW  addr  wrY  addr  evict");
    for cycle in 0..schedule.total_cycles() {
        let s = schedule.signals_at(cycle);
        println!(
            "{cycle:5}  {:3}  {:4}  {:3}  {:4}  {:3}  {:4}  {:5}",
            flag(s.x_mem_read_enable),
            s.x_mem_read_addr,
            flag(s.w_mem_read_enable),
            s.w_mem_read_addr,
            flag(s.y_mem_write_enable),
            s.y_mem_write_addr,
            flag(s.moves_output_down)
        );
    }
    Ok(())
}

fn cmd_result(shape: &ShapeArgs) -> Result<()> {
    let config = shape.load()?;
    let mut sim = Simulation::new(config)?;
    sim.simulate(None)?;

    let name = &sim.config().y_name;
    for (i, row) in sim.output_memory().render().iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            println!("{name}[{i}][{j}] = {cell}");
        }
    }
    Ok(())
}

const fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "."
    }
}
