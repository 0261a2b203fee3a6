// SPDX-License-Identifier: AGPL-3.0-only

//! Trace export.
//!
//! A [`Trace`] bundles the config of a run with every snapshot it produced
//! and persists it as JSON.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete record of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Config the run was built from.
    pub config: SimulationConfig,
    /// One snapshot per simulated cycle.
    pub snapshots: Vec<Snapshot>,
}

impl Trace {
    /// Number of recorded cycles.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if no cycle was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot of `cycle`, if recorded.
    pub fn cycle(&self, cycle: usize) -> Option<&Snapshot> {
        self.snapshots.get(cycle)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the trace as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Wrote {} cycles to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a trace previously written by [`Trace::save`].
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Simulation;
    use tempfile::TempDir;

    #[test]
    fn save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trace.json");

        let trace = Simulation::new(SimulationConfig::square(2, 2))
            .unwrap()
            .run(None)
            .unwrap();
        trace.save(&path).unwrap();

        let loaded = Trace::load(&path).unwrap();
        assert_eq!(loaded, trace);
        assert_eq!(loaded.len(), 8);
    }

    #[test]
    fn json_uses_field_names() {
        let trace = Simulation::new(SimulationConfig::square(1, 1))
            .unwrap()
            .run(Some(1))
            .unwrap();
        let json = trace.to_json().unwrap();
        assert!(json.contains("\"x_mem_read_enable\": true"));
        assert!(json.contains("\"moves_output_down\": false"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Trace::load(temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::SimError::Io { .. }));
    }
}
