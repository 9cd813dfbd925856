//! The fixed literal vocabulary over variables x1..x5.
//!
//! K_i: The learner only ever talks about these ten symbols.
//! K_i: Slot order is fixed and drives the chart layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of boolean variables the learner works over.
pub const NUM_VARIABLES: usize = 5;

/// Number of chart slots: each variable and its negation.
pub const NUM_LITERALS: usize = 2 * NUM_VARIABLES;

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Literal {
    X1,
    NotX1,
    X2,
    NotX2,
    X3,
    NotX3,
    X4,
    NotX4,
    X5,
    NotX5,
}

impl Literal {
    /// All literals in canonical slot order.
    pub const ALL: [Literal; NUM_LITERALS] = [
        Literal::X1,
        Literal::NotX1,
        Literal::X2,
        Literal::NotX2,
        Literal::X3,
        Literal::NotX3,
        Literal::X4,
        Literal::NotX4,
        Literal::X5,
        Literal::NotX5,
    ];

    /// Wire identifier, e.g. `x3` or `¬x3`.
    pub fn as_str(self) -> &'static str {
        match self {
            Literal::X1 => "x1",
            Literal::NotX1 => "¬x1",
            Literal::X2 => "x2",
            Literal::NotX2 => "¬x2",
            Literal::X3 => "x3",
            Literal::NotX3 => "¬x3",
            Literal::X4 => "x4",
            Literal::NotX4 => "¬x4",
            Literal::X5 => "x5",
            Literal::NotX5 => "¬x5",
        }
    }

    /// Position in the canonical slot order.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Strict lookup of a wire identifier.
    ///
    /// Only the canonical spelling is accepted; this is what the
    /// reconciler uses on server payloads.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lit| lit.as_str() == s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not one of the ten literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown literal '{0}'")]
pub struct UnknownLiteral(pub String);

impl TryFrom<String> for Literal {
    type Error = UnknownLiteral;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_wire(&s).ok_or(UnknownLiteral(s))
    }
}

impl From<Literal> for String {
    fn from(lit: Literal) -> Self {
        lit.as_str().to_string()
    }
}
