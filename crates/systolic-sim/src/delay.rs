// SPDX-License-Identifier: AGPL-3.0-only

//! Triangular delay network used to skew array inputs.
//!
//! A triangle of depth `D` accepts `D + 1` values per cycle. Lane 0 is a
//! wire; lane `i` (1..=D) passes through a shift chain of depth `i`, so
//! whatever enters lane `i` comes out exactly `i` cycles later:
//!
//! ```text
//! in[0] ───────────────────────────► out[0]
//! in[1] ─► [c0.0] ─────────────────► out[1]
//! in[2] ─► [c1.0] ─► [c1.1] ───────► out[2]
//! in[3] ─► [c2.0] ─► [c2.1] ─► [c2.2] ► out[3]
//! ```
//!
//! Like the array, the triangle is read (`produce_output`) before it is
//! clocked (`update`) within a cycle.

use crate::error::{Result, SimError};
use crate::value::Value;

/// Skew network of shift chains with depths `1..=depth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayTriangle {
    /// `chains[i]` has `i + 1` slots; index 0 is the shallow end.
    chains: Vec<Vec<Value>>,
}

impl DelayTriangle {
    /// Triangle of the given depth, all slots zero.
    pub fn new(depth: usize) -> Self {
        Self {
            chains: (0..depth).map(|i| vec![Value::Zero; i + 1]).collect(),
        }
    }

    /// Depth of the deepest chain.
    pub fn depth(&self) -> usize {
        self.chains.len()
    }

    /// Number of lanes (values per cycle).
    pub fn width(&self) -> usize {
        self.chains.len() + 1
    }

    /// Skewed output for this cycle, taken before the chains shift.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if `input.len() != depth + 1`.
    pub fn produce_output(&self, input: &[Value]) -> Result<Vec<Value>> {
        self.check_len(input)?;
        let mut out = Vec::with_capacity(self.width());
        out.push(input[0].clone());
        out.extend(
            self.chains
                .iter()
                .filter_map(|chain| chain.last().cloned()),
        );
        Ok(out)
    }

    /// Shift every chain one slot deeper and latch `input[1..]` at the
    /// shallow ends.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if `input.len() != depth + 1`.
    pub fn update(&mut self, input: &[Value]) -> Result<()> {
        self.check_len(input)?;
        for (chain, value) in self.chains.iter_mut().zip(&input[1..]) {
            chain.rotate_right(1);
            chain[0] = value.clone();
        }
        Ok(())
    }

    /// Chains rendered as strings; row `i` has `i + 1` entries.
    pub fn render(&self) -> Vec<Vec<String>> {
        self.chains
            .iter()
            .map(|chain| chain.iter().map(ToString::to_string).collect())
            .collect()
    }

    fn check_len(&self, input: &[Value]) -> Result<()> {
        if input.len() == self.width() {
            Ok(())
        } else {
            Err(SimError::length_mismatch(self.width(), input.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane_inputs(t: usize, width: usize) -> Vec<Value> {
        (0..width).map(|lane| Value::element("X", lane, t)).collect()
    }

    #[test]
    fn lane_i_is_delayed_by_i_cycles() {
        let mut tri = DelayTriangle::new(3);
        let mut outputs = Vec::new();
        for t in 0..6 {
            let input = if t < 2 { lane_inputs(t, 4) } else { vec![Value::Zero; 4] };
            outputs.push(tri.produce_output(&input).unwrap());
            tri.update(&input).unwrap();
        }
        for lane in 0..4 {
            for t in 0..6 {
                let expected = if t >= lane && t - lane < 2 {
                    Value::element("X", lane, t - lane)
                } else {
                    Value::Zero
                };
                assert_eq!(outputs[t][lane], expected, "lane {lane} cycle {t}");
            }
        }
    }

    #[test]
    fn depth_zero_is_a_wire() {
        let mut tri = DelayTriangle::new(0);
        let input = vec![Value::element("W", 0, 0)];
        assert_eq!(tri.produce_output(&input).unwrap(), input);
        tri.update(&input).unwrap();
        assert!(tri.render().is_empty());
    }

    #[test]
    fn wrong_width_rejected() {
        let mut tri = DelayTriangle::new(2);
        let short = vec![Value::Zero; 2];
        assert!(matches!(
            tri.produce_output(&short),
            Err(SimError::LengthMismatch { expected: 3, got: 2 })
        ));
        assert!(matches!(
            tri.update(&short),
            Err(SimError::LengthMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn render_is_jagged() {
        let tri = DelayTriangle::new(3);
        let shape: Vec<usize> = tri.render().iter().map(Vec::len).collect();
        assert_eq!(shape, vec![1, 2, 3]);
    }
}
