// SPDX-License-Identifier: AGPL-3.0-only

//! N×N output-stationary systolic array.
//!
//! Each cycle X operands move one PE to the right and W operands one PE
//! down. When eviction is signalled the operands stand still and the
//! accumulators shift down one row instead, so the bottom row leaves the
//! array and row 0 is cleared.

use crate::error::{Result, SimError};
use crate::pe::{OutputStationaryPe, ProcessingElement};
use crate::value::Value;
use tracing::trace;

/// Square grid of output-stationary PEs, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystolicArray {
    width: usize,
    pes: Vec<OutputStationaryPe>,
}

impl SystolicArray {
    /// `width × width` array with every register zero.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            pes: vec![OutputStationaryPe::new(); width * width],
        }
    }

    /// Rows (and columns) of PEs.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// PE at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below `width`.
    pub fn pe(&self, row: usize, col: usize) -> &OutputStationaryPe {
        assert!(row < self.width && col < self.width, "PE ({row}, {col}) outside {0}x{0} array", self.width);
        &self.pes[row * self.width + col]
    }

    /// Iterate over PE rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[OutputStationaryPe]> {
        // chunks() rejects a zero chunk size
        self.pes.chunks(self.width.max(1))
    }

    /// Array output for this cycle, read before the update.
    ///
    /// While evicting this is the bottom row's accumulators; otherwise a
    /// don't-care vector of zeros.
    pub fn produce_output(&self, evict: bool) -> Vec<Value> {
        if evict && self.width > 0 {
            let base = (self.width - 1) * self.width;
            self.pes[base..]
                .iter()
                .map(|pe| pe.registers().acc.clone())
                .collect()
        } else {
            vec![Value::Zero; self.width]
        }
    }

    /// Clock the whole array.
    ///
    /// `x_in[i]` enters row `i` from the left, `w_in[j]` enters column `j`
    /// from the top.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if an input vector is not
    /// `width` long, or any PE fold error.
    pub fn update(&mut self, x_in: &[Value], w_in: &[Value], evict: bool) -> Result<()> {
        let n = self.width;
        for input in [x_in, w_in] {
            if input.len() != n {
                return Err(SimError::length_mismatch(n, input.len()));
            }
        }

        if evict {
            trace!("evicting accumulators one row down");
            for row in (1..n).rev() {
                for col in 0..n {
                    let acc = self.pes[(row - 1) * n + col].take_acc();
                    self.pes[row * n + col].set_acc(acc);
                }
            }
            // row 0 was emptied by take_acc()
            return Ok(());
        }

        // Bottom-right to top-left: a PE's left and upper neighbours are
        // visited after it, so they still hold last cycle's operands.
        for row in (0..n).rev() {
            for col in (0..n).rev() {
                let x = if col == 0 {
                    x_in[row].clone()
                } else {
                    self.pes[row * n + col - 1].registers().x.clone()
                };
                let w = if row == 0 {
                    w_in[col].clone()
                } else {
                    self.pes[(row - 1) * n + col].registers().w.clone()
                };
                self.pes[row * n + col].update(x, w)?;
            }
        }
        Ok(())
    }
}
