// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation configuration.
//!
//! Shapes are only recorded here; the dimension contract is checked when a
//! [`Simulation`](crate::Simulation) is built from the config.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Rows × columns of a matrix or PE grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixShape {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub cols: usize,
}

impl MatrixShape {
    /// Shape with the given rows and columns.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Square shape.
    pub const fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// True if rows == cols.
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

impl std::fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Everything needed to construct one simulation run of `Y = X·W`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Shape of the left factor X.
    pub x: MatrixShape,
    /// Shape of the right factor W.
    pub w: MatrixShape,
    /// Shape of the PE grid.
    pub array: MatrixShape,
    /// Symbolic name of X.
    pub x_name: String,
    /// Symbolic name of W.
    pub w_name: String,
    /// Name used for the output memory in traces.
    pub y_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::square(2, 2)
    }
}

impl SimulationConfig {
    /// `width × width` array computing an `width × stream_length` by
    /// `stream_length × width` product.
    pub fn square(width: usize, stream_length: usize) -> Self {
        Self {
            x: MatrixShape::new(width, stream_length),
            w: MatrixShape::new(stream_length, width),
            array: MatrixShape::square(width),
            x_name: "X".to_string(),
            w_name: "W".to_string(),
            y_name: "Y".to_string(),
        }
    }

    /// Rename the matrices.
    #[must_use]
    pub fn with_names(
        mut self,
        x_name: impl Into<String>,
        w_name: impl Into<String>,
        y_name: impl Into<String>,
    ) -> Self {
        self.x_name = x_name.into();
        self.w_name = w_name.into();
        self.y_name = y_name.into();
        self
    }

    /// Load a config from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading simulation config from {}", path.display());
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
