// SPDX-License-Identifier: AGPL-3.0-only

//! Row-addressable memory.
//!
//! A fixed `rows × cols` store of [`Value`]s laid out row-major
//! (`addr = row * cols + col`). Reads and writes move a window of
//! consecutive columns within one row.

use crate::error::{Result, SimError};
use crate::value::Value;
use tracing::trace;

/// Fixed-size row-addressable memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMemory {
    rows: usize,
    cols: usize,
    cells: Vec<Value>,
}

impl RowMemory {
    /// Memory with every cell set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: &Value) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill.clone(); rows * cols],
        }
    }

    /// Memory holding the symbolic matrix `name`.
    ///
    /// Cell `(r, c)` holds `name[r][c]`, or `name[c][r]` when `transposed`
    /// is set, so a transposed memory streams columns of the matrix one
    /// row-read at a time.
    pub fn symbolic(rows: usize, cols: usize, name: &str, transposed: bool) -> Self {
        let name: std::sync::Arc<str> = name.into();
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| {
                let (i, j) = if transposed { (c, r) } else { (r, c) };
                Value::element(name.clone(), i, j)
            })
            .collect();
        Self { rows, cols, cells }
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    /// Cell at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Read `count` cells of `row` starting at `col_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if the row or column window falls
    /// outside the memory.
    pub fn read_row(&self, row: usize, col_offset: usize, count: usize) -> Result<Vec<Value>> {
        let range = self.window(row, col_offset, count)?;
        Ok(self.cells[range].to_vec())
    }

    /// Write `values` into `row` starting at `col_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if the row or column window falls
    /// outside the memory.
    pub fn write_row(&mut self, row: usize, col_offset: usize, values: &[Value]) -> Result<()> {
        let range = self.window(row, col_offset, values.len())?;
        trace!("write row {row} cols {col_offset}..{}", col_offset + values.len());
        self.cells[range].clone_from_slice(values);
        Ok(())
    }

    /// Cells rendered as strings, one `Vec` per row.
    pub fn render(&self) -> Vec<Vec<String>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }

    fn window(&self, row: usize, col_offset: usize, count: usize) -> Result<std::ops::Range<usize>> {
        let col_end = col_offset.saturating_add(count);
        if row >= self.rows || col_end > self.cols {
            return Err(SimError::OutOfBounds {
                row,
                col_offset,
                col_end,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let base = row * self.cols;
        Ok(base + col_offset..base + col_end)
    }
}
