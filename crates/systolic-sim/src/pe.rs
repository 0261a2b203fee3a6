// SPDX-License-Identifier: AGPL-3.0-only

//! Processing elements.
//!
//! A PE is a Moore machine: [`ProcessingElement::propagate`] exposes the
//! registers as they stand, [`ProcessingElement::update`] clocks in the next
//! operands. Only the output-stationary dataflow exists today; other
//! dataflows would be further implementors of the same trait.

use crate::error::{Result, SimError};
use crate::value::Value;
use std::fmt::Debug;

/// Dataflow implemented by a processing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dataflow {
    /// Outputs stay put, operands flow through.
    #[default]
    OutputStationary,
}

impl std::fmt::Display for Dataflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutputStationary => write!(f, "output-stationary"),
        }
    }
}

/// The three registers of a PE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeRegisters {
    /// Operand arriving from the left neighbour.
    pub x: Value,
    /// Operand arriving from the upper neighbour.
    pub w: Value,
    /// Accumulator.
    pub acc: Value,
}

/// Processing element interface.
pub trait ProcessingElement: Debug {
    /// Dataflow this PE implements.
    fn dataflow(&self) -> Dataflow;

    /// Current register contents, by reference.
    fn registers(&self) -> &PeRegisters;

    /// Outputs for this cycle; reflects state, not this cycle's inputs.
    fn propagate(&self) -> PeRegisters {
        self.registers().clone()
    }

    /// Clock the PE with new operands.
    ///
    /// # Errors
    ///
    /// Returns an error if the operands currently held cannot be folded
    /// into the accumulator.
    fn update(&mut self, x_in: Value, w_in: Value) -> Result<()>;
}

/// Output-stationary PE: each cycle folds its *held* X·W pair into `acc`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputStationaryPe {
    regs: PeRegisters,
}

impl OutputStationaryPe {
    /// PE with all registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// PE preloaded with the given registers.
    pub const fn with_registers(x: Value, w: Value, acc: Value) -> Self {
        Self {
            regs: PeRegisters { x, w, acc },
        }
    }

    /// Take the accumulator, leaving zero behind.
    pub fn take_acc(&mut self) -> Value {
        std::mem::take(&mut self.regs.acc)
    }

    /// Overwrite the accumulator.
    pub fn set_acc(&mut self, acc: Value) {
        self.regs.acc = acc;
    }
}

impl ProcessingElement for OutputStationaryPe {
    fn dataflow(&self) -> Dataflow {
        Dataflow::OutputStationary
    }

    fn registers(&self) -> &PeRegisters {
        &self.regs
    }

    fn update(&mut self, x_in: Value, w_in: Value) -> Result<()> {
        let next_acc = fold(&self.regs.acc, &self.regs.x, &self.regs.w)?;
        self.regs = PeRegisters {
            x: x_in,
            w: w_in,
            acc: next_acc,
        };
        Ok(())
    }
}

/// Next accumulator after folding `x · w` into `acc`.
///
/// Two matrix elements extend the running sum by one term. Their shared
/// reduction index `k` must equal the number of terms already folded, and
/// the sum's identity (left name, `i`, right name, `j`) must match the
/// operands. A zero operand leaves `acc` unchanged.
///
/// # Errors
///
/// [`SimError::InconsistentAccumulation`] on any index or identity
/// mismatch, [`SimError::InvalidOperandPair`] for any other operand mix.
pub fn fold(acc: &Value, x: &Value, w: &Value) -> Result<Value> {
    match (x, w) {
        (Value::Element(xe), Value::Element(we)) => {
            if xe.j != we.i {
                return Err(SimError::inconsistent_accumulation(format!(
                    "reduction index differs: {xe} has column {}, {we} has row {}",
                    xe.j, we.i
                )));
            }
            let k = xe.j;
            match acc {
                Value::Zero if k == 0 => {}
                Value::Zero => {
                    return Err(SimError::inconsistent_accumulation(format!(
                        "fresh accumulator must start at k=0, got {xe}·{we}"
                    )));
                }
                Value::PartialSum(sum) if sum.count == k => {
                    if sum.left != xe.name || sum.i != xe.i || sum.right != we.name || sum.j != we.j {
                        return Err(SimError::inconsistent_accumulation(format!(
                            "{xe}·{we} does not extend {sum}"
                        )));
                    }
                }
                other => {
                    return Err(SimError::inconsistent_accumulation(format!(
                        "{xe}·{we} (k={k}) cannot extend accumulator {other}"
                    )));
                }
            }
            Ok(Value::partial_sum(
                xe.name.clone(),
                we.name.clone(),
                xe.i,
                we.j,
                k + 1,
            ))
        }
        _ if x.is_zero() || w.is_zero() => Ok(acc.clone()),
        _ => Err(SimError::invalid_operand_pair(x, w)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize, j: usize) -> Value {
        Value::element("X", i, j)
    }

    fn w(i: usize, j: usize) -> Value {
        Value::element("W", i, j)
    }

    #[test]
    fn starts_zeroed() {
        let pe = OutputStationaryPe::new();
        assert_eq!(pe.propagate(), PeRegisters::default());
        assert_eq!(pe.dataflow(), Dataflow::OutputStationary);
    }

    #[test]
    fn folds_previous_operands_not_incoming() {
        let mut pe = OutputStationaryPe::new();
        pe.update(x(0, 0), w(0, 1)).unwrap();
        // zeros were held, so nothing folded yet
        assert!(pe.registers().acc.is_zero());
        assert_eq!(pe.registers().x, x(0, 0));

        pe.update(x(0, 1), w(1, 1)).unwrap();
        assert_eq!(pe.registers().acc, Value::partial_sum("X", "W", 0, 1, 1));

        pe.update(Value::Zero, Value::Zero).unwrap();
        assert_eq!(pe.registers().acc, Value::partial_sum("X", "W", 0, 1, 2));

        // idle operands pass the accumulator through
        pe.update(Value::Zero, Value::Zero).unwrap();
        assert_eq!(pe.registers().acc, Value::partial_sum("X", "W", 0, 1, 2));
    }

    #[test]
    fn skipped_reduction_index_is_inconsistent() {
        let mut pe = OutputStationaryPe::new();
        pe.update(x(0, 0), w(0, 0)).unwrap();
        pe.update(x(0, 2), w(2, 0)).unwrap();
        // acc holds one term, held pair is k=2
        let err = pe.update(Value::Zero, Value::Zero).unwrap_err();
        assert!(matches!(err, SimError::InconsistentAccumulation { .. }));
    }

    #[test]
    fn fresh_accumulator_must_start_at_zero() {
        let mut pe = OutputStationaryPe::with_registers(x(0, 1), w(1, 0), Value::Zero);
        assert!(matches!(
            pe.update(Value::Zero, Value::Zero),
            Err(SimError::InconsistentAccumulation { .. })
        ));
    }

    #[test]
    fn mismatched_inner_indices_rejected() {
        assert!(matches!(
            fold(&Value::Zero, &x(0, 0), &w(1, 0)),
            Err(SimError::InconsistentAccumulation { .. })
        ));
    }

    #[test]
    fn identity_mismatch_rejected() {
        let acc = Value::partial_sum("X", "W", 0, 0, 1);
        // right row/k fine, but output column differs
        assert!(matches!(
            fold(&acc, &x(0, 1), &w(1, 1)),
            Err(SimError::InconsistentAccumulation { .. })
        ));
        // wrong matrix name
        assert!(matches!(
            fold(&acc, &Value::element("A", 0, 1), &w(1, 0)),
            Err(SimError::InconsistentAccumulation { .. })
        ));
        assert_eq!(
            fold(&acc, &x(0, 1), &w(1, 0)).unwrap(),
            Value::partial_sum("X", "W", 0, 0, 2)
        );
    }

    #[test]
    fn element_as_accumulator_rejected() {
        assert!(matches!(
            fold(&x(0, 0), &x(0, 0), &w(0, 0)),
            Err(SimError::InconsistentAccumulation { .. })
        ));
    }

    #[test]
    fn partial_sum_operand_is_invalid() {
        let sum = Value::partial_sum("X", "W", 0, 0, 1);
        let err = fold(&Value::Zero, &x(0, 0), &sum).unwrap_err();
        assert!(matches!(err, SimError::InvalidOperandPair { .. }));
        // but a zero on either side still passes through
        assert_eq!(fold(&sum, &Value::Zero, &sum).unwrap(), sum);
    }

    #[test]
    fn acc_take_and_set() {
        let mut pe = OutputStationaryPe::with_registers(
            Value::Zero,
            Value::Zero,
            Value::partial_sum("X", "W", 1, 1, 3),
        );
        assert_eq!(pe.take_acc(), Value::partial_sum("X", "W", 1, 1, 3));
        assert!(pe.registers().acc.is_zero());
        pe.set_acc(Value::partial_sum("X", "W", 0, 1, 3));
        assert_eq!(pe.registers().acc.to_string(), "Σ_{k=0}^{2} X_{0,k}·W_{k,1}");
    }
}
