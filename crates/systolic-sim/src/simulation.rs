// SPDX-License-Identifier: AGPL-3.0-only

//! Top-level orchestrator.
//!
//! Wires the memories, skew triangles, array and controller into one clock.
//! A cycle runs strictly in this order:
//!
//! 1. controller signals for this cycle, then advance the counter
//! 2. read one row from each input memory (zeros if not enabled)
//! 3. take each triangle's skewed output, then clock the triangle
//! 4. read the array output (pre-update accumulators)
//! 5. write that output into Y memory if enabled
//! 6. clock the array with the skewed operands and the evict flag
//!
//! Step 4 must precede step 6 so the array reports last cycle's values.

use crate::array::SystolicArray;
use crate::config::SimulationConfig;
use crate::controller::{ControlSignals, Controller, Schedule};
use crate::delay::DelayTriangle;
use crate::error::{Result, SimError};
use crate::memory::RowMemory;
use crate::pe::ProcessingElement;
use crate::snapshot::{PeSnapshot, Snapshot};
use crate::trace::Trace;
use crate::value::Value;
use tracing::{debug, info, warn};

/// One fully wired simulation of `Y = X·W`.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    x_mem: RowMemory,
    w_mem: RowMemory,
    y_mem: RowMemory,
    x_delay: DelayTriangle,
    w_delay: DelayTriangle,
    array: SystolicArray,
    controller: Controller,
}

impl Simulation {
    /// Build a simulation, validating the dimension contract first.
    ///
    /// X memory holds X transposed so that each row read streams one column
    /// of X (one element per array row); W memory holds W as-is.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`] if the inner dimensions of X
    /// and W differ, the array is not square, the array does not match the
    /// outer dimensions of X and W, or any dimension is zero.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        validate(&config)?;

        let n = config.array.rows;
        let l = config.x.cols;
        let schedule = Schedule::new(n, l);

        info!(
            "Building {n}x{n} output-stationary array for {} {} · {} {} ({} cycles)",
            config.x_name,
            config.x,
            config.w_name,
            config.w,
            schedule.total_cycles()
        );

        Ok(Self {
            x_mem: RowMemory::symbolic(l, n, &config.x_name, true),
            w_mem: RowMemory::symbolic(l, n, &config.w_name, false),
            y_mem: RowMemory::filled(n, n, &Value::Zero),
            x_delay: DelayTriangle::new(n - 1),
            w_delay: DelayTriangle::new(n - 1),
            array: SystolicArray::new(n),
            controller: Controller::new(schedule),
            config,
        })
    }

    /// Config this simulation was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Timing parameters.
    pub const fn schedule(&self) -> &Schedule {
        self.controller.schedule()
    }

    /// The controller (cycle counter).
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The PE grid.
    pub const fn array(&self) -> &SystolicArray {
        &self.array
    }

    /// X memory (X transposed).
    pub const fn x_memory(&self) -> &RowMemory {
        &self.x_mem
    }

    /// W memory.
    pub const fn w_memory(&self) -> &RowMemory {
        &self.w_mem
    }

    /// Output memory; row `i` holds row `i` of Y once drained.
    pub const fn output_memory(&self) -> &RowMemory {
        &self.y_mem
    }

    /// Current state paired with the signals the next cycle will use.
    pub fn snapshot(&self) -> Snapshot {
        self.capture(self.controller.signals())
    }

    /// Simulate one cycle and return the state observed at its start.
    ///
    /// # Errors
    ///
    /// Propagates any memory, triangle or PE error; the simulation must be
    /// discarded afterwards.
    pub fn step(&mut self) -> Result<Snapshot> {
        let signals = self.controller.signals();
        let snapshot = self.capture(signals);
        debug!(cycle = self.controller.cycle(), ?signals, "cycle");
        self.controller.advance();

        let n = self.array.width();
        let x_row = read_if(&self.x_mem, signals.x_mem_read_enable, signals.x_mem_read_addr, n)?;
        let w_row = read_if(&self.w_mem, signals.w_mem_read_enable, signals.w_mem_read_addr, n)?;

        let x_skewed = self.x_delay.produce_output(&x_row)?;
        self.x_delay.update(&x_row)?;
        let w_skewed = self.w_delay.produce_output(&w_row)?;
        self.w_delay.update(&w_row)?;

        let output = self.array.produce_output(signals.moves_output_down);
        if signals.y_mem_write_enable {
            self.y_mem.write_row(signals.y_mem_write_addr, 0, &output)?;
        }

        self.array
            .update(&x_skewed, &w_skewed, signals.moves_output_down)?;

        Ok(snapshot)
    }

    /// Run `cycles` cycles, or the full `3N + L` schedule if `None`.
    ///
    /// # Errors
    ///
    /// Fails on the first error; no partial trace is returned.
    pub fn simulate(&mut self, cycles: Option<usize>) -> Result<Vec<Snapshot>> {
        let full = self.schedule().total_cycles();
        let cycles = cycles.unwrap_or(full);
        if cycles < full {
            warn!("Running {cycles} of {full} cycles; output drain will be incomplete");
        }

        let snapshots = (0..cycles)
            .map(|_| self.step())
            .collect::<Result<Vec<_>>>()?;

        info!("Simulated {} cycles", snapshots.len());
        Ok(snapshots)
    }

    /// Like [`Simulation::simulate`], bundled with the config as a [`Trace`].
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::simulate`].
    pub fn run(&mut self, cycles: Option<usize>) -> Result<Trace> {
        let snapshots = self.simulate(cycles)?;
        Ok(Trace {
            config: self.config.clone(),
            snapshots,
        })
    }

    fn capture(&self, signals: ControlSignals) -> Snapshot {
        Snapshot {
            cycle: self.controller.cycle(),
            signals,
            x_memory: self.x_mem.render(),
            w_memory: self.w_mem.render(),
            y_memory: self.y_mem.render(),
            x_delay: self.x_delay.render(),
            w_delay: self.w_delay.render(),
            pes: self
                .array
                .rows()
                .map(|row| row.iter().map(|pe| PeSnapshot::from(pe.registers())).collect())
                .collect(),
        }
    }
}

fn validate(config: &SimulationConfig) -> Result<()> {
    let SimulationConfig { x, w, array, .. } = config;
    if x.cols != w.rows {
        return Err(SimError::dimension_mismatch(format!(
            "inner dimensions differ: X is {x}, W is {w}"
        )));
    }
    if !array.is_square() {
        return Err(SimError::dimension_mismatch(format!(
            "array must be square, got {array}"
        )));
    }
    if x.rows != array.rows || w.cols != array.cols {
        return Err(SimError::dimension_mismatch(format!(
            "array {array} must match the {}x{} output of X {x} · W {w}",
            x.rows, w.cols
        )));
    }
    if array.rows == 0 || x.cols == 0 {
        return Err(SimError::dimension_mismatch(format!(
            "empty operands: array {array}, reduction length {}",
            x.cols
        )));
    }
    Ok(())
}

fn read_if(mem: &RowMemory, enable: bool, addr: usize, width: usize) -> Result<Vec<Value>> {
    if enable {
        mem.read_row(addr, 0, width)
    } else {
        Ok(vec![Value::Zero; width])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixShape;

    fn config(x: (usize, usize), w: (usize, usize), array: (usize, usize)) -> SimulationConfig {
        SimulationConfig {
            x: MatrixShape::new(x.0, x.1),
            w: MatrixShape::new(w.0, w.1),
            array: MatrixShape::new(array.0, array.1),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn dimension_contract() {
        let cases = [
            config((2, 3), (2, 2), (2, 2)), // inner mismatch
            config((2, 2), (2, 2), (2, 3)), // non-square array
            config((3, 2), (2, 3), (2, 2)), // needs tiling
            config((2, 2), (2, 3), (2, 2)), // W too wide
            config((0, 0), (0, 0), (0, 0)), // empty
            config((2, 0), (0, 2), (2, 2)), // empty reduction
        ];
        for cfg in cases {
            assert!(
                matches!(Simulation::new(cfg.clone()), Err(SimError::DimensionMismatch { .. })),
                "{cfg:?} should be rejected"
            );
        }
        assert!(Simulation::new(config((3, 5), (5, 3), (3, 3))).is_ok());
    }

    #[test]
    fn memories_laid_out_for_streaming() {
        let sim = Simulation::new(SimulationConfig::square(2, 3)).unwrap();
        // X memory row k is column k of X
        assert_eq!(
            sim.x_memory().read_row(2, 0, 2).unwrap(),
            vec![Value::element("X", 0, 2), Value::element("X", 1, 2)]
        );
        assert_eq!(
            sim.w_memory().read_row(2, 0, 2).unwrap(),
            vec![Value::element("W", 2, 0), Value::element("W", 2, 1)]
        );
        assert!(sim.output_memory().cells().iter().all(Value::is_zero));
    }

    #[test]
    fn step_advances_counter_and_reports_pre_state() {
        let mut sim = Simulation::new(SimulationConfig::square(2, 2)).unwrap();
        let s0 = sim.step().unwrap();
        assert_eq!(s0.cycle, 0);
        assert_eq!(sim.controller().cycle(), 1);
        // PE(0,0) latched X_{0,0} during cycle 0 but snapshot 0 predates it
        assert_eq!(s0.pe(0, 0).unwrap().x, "0");
        assert_eq!(sim.snapshot().pe(0, 0).unwrap().x, "X_{0,0}");
        assert_eq!(sim.snapshot().cycle, 1);
    }

    #[test]
    fn custom_names_flow_into_results() {
        let mut sim =
            Simulation::new(SimulationConfig::square(2, 2).with_names("A", "B", "C")).unwrap();
        sim.simulate(None).unwrap();
        assert_eq!(
            sim.output_memory().get(1, 0),
            Some(&Value::partial_sum("A", "B", 1, 0, 2))
        );
    }

    #[test]
    fn short_run_leaves_outputs_unwritten() {
        let mut sim = Simulation::new(SimulationConfig::square(2, 2)).unwrap();
        let snaps = sim.simulate(Some(5)).unwrap();
        assert_eq!(snaps.len(), 5);
        assert!(sim.output_memory().cells().iter().all(Value::is_zero));
    }
}
