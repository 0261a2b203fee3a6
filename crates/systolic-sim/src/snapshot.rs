// SPDX-License-Identifier: AGPL-3.0-only

//! Per-cycle state snapshots.
//!
//! Snapshots hold rendered strings only, so they can be handed to
//! renderers and exporters without exposing engine state.

use crate::controller::ControlSignals;
use crate::pe::PeRegisters;
use serde::{Deserialize, Serialize};

/// Rendered registers of one PE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeSnapshot {
    /// X register.
    pub x: String,
    /// W register.
    pub w: String,
    /// Accumulator.
    pub acc: String,
}

impl From<&PeRegisters> for PeSnapshot {
    fn from(regs: &PeRegisters) -> Self {
        Self {
            x: regs.x.to_string(),
            w: regs.w.to_string(),
            acc: regs.acc.to_string(),
        }
    }
}

/// State observed at the start of one cycle, before it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Controller cycle count.
    pub cycle: usize,
    /// Control signals driving this cycle.
    pub signals: ControlSignals,
    /// X memory, one entry per row.
    pub x_memory: Vec<Vec<String>>,
    /// W memory, one entry per row.
    pub w_memory: Vec<Vec<String>>,
    /// Output memory, one entry per row.
    pub y_memory: Vec<Vec<String>>,
    /// X skew triangle; row `i` has `i + 1` slots.
    pub x_delay: Vec<Vec<String>>,
    /// W skew triangle; row `i` has `i + 1` slots.
    pub w_delay: Vec<Vec<String>>,
    /// PE grid, row-major.
    pub pes: Vec<Vec<PeSnapshot>>,
}

impl Snapshot {
    /// Rendered PE at `(row, col)`, if in range.
    pub fn pe(&self, row: usize, col: usize) -> Option<&PeSnapshot> {
        self.pes.get(row)?.get(col)
    }
}
