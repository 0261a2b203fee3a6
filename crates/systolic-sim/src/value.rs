// SPDX-License-Identifier: AGPL-3.0-only

//! Symbolic value model.
//!
//! Values flowing through the array are tokens, never numbers:
//!
//! | Variant | Meaning | Renders as |
//! |---------|---------|------------|
//! | [`Value::Zero`] | placeholder / idle pipeline slot | `0` |
//! | [`Value::Element`] | one cell `M[i][j]` of a named matrix | `X_{0,1}` |
//! | [`Value::PartialSum`] | first `count` terms of `L[i][·]·R[·][j]` | `Σ_{k=0}^{1} X_{0,k}·W_{k,1}` |

use std::fmt;
use std::sync::Arc;

/// Symbolic reference to one cell of a named matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixElement {
    /// Matrix name (`X`, `W`, ...).
    pub name: Arc<str>,
    /// Row index.
    pub i: usize,
    /// Column index.
    pub j: usize,
}

/// Symbolic sum of the first `count` terms of a row-by-column reduction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialSum {
    /// Name of the left factor.
    pub left: Arc<str>,
    /// Name of the right factor.
    pub right: Arc<str>,
    /// Row of the left factor.
    pub i: usize,
    /// Column of the right factor.
    pub j: usize,
    /// Number of terms folded in so far.
    pub count: usize,
}

/// A token held in a register, memory cell or delay slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    /// The constant zero.
    #[default]
    Zero,
    /// A matrix element.
    Element(MatrixElement),
    /// A partially folded dot product.
    PartialSum(PartialSum),
}

impl Value {
    /// Construct a matrix element token.
    pub fn element(name: impl Into<Arc<str>>, i: usize, j: usize) -> Self {
        Self::Element(MatrixElement {
            name: name.into(),
            i,
            j,
        })
    }

    /// Construct a partial sum token.
    pub fn partial_sum(
        left: impl Into<Arc<str>>,
        right: impl Into<Arc<str>>,
        i: usize,
        j: usize,
        count: usize,
    ) -> Self {
        Self::PartialSum(PartialSum {
            left: left.into(),
            right: right.into(),
            i,
            j,
            count,
        })
    }

    /// True only for the zero constant.
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Zero)
    }

    /// The matrix element, if this is one.
    pub const fn as_element(&self) -> Option<&MatrixElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The partial sum, if this is one.
    pub const fn as_partial_sum(&self) -> Option<&PartialSum> {
        match self {
            Self::PartialSum(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MatrixElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{{{},{}}}", self.name, self.i, self.j)
    }
}

impl fmt::Display for PartialSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            // empty sum
            return write!(f, "0");
        }
        write!(
            f,
            "Σ_{{k=0}}^{{{}}} {}_{{{},k}}·{}_{{k,{}}}",
            self.count - 1,
            self.left,
            self.i,
            self.right,
            self.j
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "0"),
            Self::Element(e) => e.fmt(f),
            Self::PartialSum(s) => s.fmt(f),
        }
    }
}
