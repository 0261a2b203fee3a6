// SPDX-License-Identifier: AGPL-3.0-only

//! Cycle-accurate symbolic simulator for an output-stationary systolic array.
//!
//! Instead of multiplying numbers, the engine threads symbolic tokens
//! (`X_{i,j}`, `W_{i,j}`, `Σ_{k=0}^{n} X_{i,k}·W_{k,j}`) through a model of
//! the hardware, so every cycle can be checked against the dataflow
//! schedule. Every PE fold is validated; a wiring or skew mistake surfaces
//! as an error instead of a wrong number.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`value`] | Symbolic tokens: zero, matrix element, partial sum |
//! | [`memory`] | Row-addressable memories for X, W and Y |
//! | [`delay`] | Triangular skew network |
//! | [`pe`] | `ProcessingElement` trait and the output-stationary PE |
//! | [`array`] | N×N PE grid with wavefront propagation and eviction |
//! | [`controller`] | Cycle counter and derived control signals |
//! | [`simulation`] | Top-level orchestrator |
//! | [`snapshot`] / [`trace`] | Per-cycle rendered state and JSON export |
//!
//! # Quick start
//!
//! ```
//! use systolic_sim::{Simulation, SimulationConfig};
//!
//! # fn main() -> systolic_sim::Result<()> {
//! let mut sim = Simulation::new(SimulationConfig::square(2, 2))?;
//! let snapshots = sim.simulate(None)?; // 3·2 + 2 = 8 cycles
//! assert_eq!(snapshots.len(), 8);
//!
//! let y = sim.output_memory().get(1, 0).unwrap();
//! assert_eq!(y.to_string(), "Σ_{k=0}^{1} X_{1,k}·W_{k,0}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod array;
mod config;
pub mod controller;
pub mod delay;
mod error;
pub mod memory;
pub mod pe;
pub mod simulation;
pub mod snapshot;
pub mod trace;
pub mod value;

pub use array::SystolicArray;
pub use config::{MatrixShape, SimulationConfig};
pub use controller::{ControlSignals, Controller, Schedule};
pub use delay::DelayTriangle;
pub use error::{Result, SimError};
pub use memory::RowMemory;
pub use pe::{Dataflow, OutputStationaryPe, PeRegisters, ProcessingElement};
pub use simulation::Simulation;
pub use snapshot::{PeSnapshot, Snapshot};
pub use trace::Trace;
pub use value::{MatrixElement, PartialSum, Value};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        ControlSignals, ProcessingElement, Result, SimError, Simulation, SimulationConfig,
        Snapshot, Trace, Value,
    };
}
