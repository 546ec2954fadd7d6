//! Atomic terms
//!
//! Atomic terms are the simplest terms in the language. They include plain
//! atoms (strings like "bird" or "animal") and operator atoms ("^left"),
//! which name executable operations.

use super::{Op, Term};
use std::fmt;
use smartstring::SmartString;

type Name = SmartString<smartstring::LazyCompact>;

/// Atomic term variants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Atomic {
    /// Regular atomic term with a string identifier
    Atom(Name),

    /// Operator atom, the head of an executable operation
    Operator(Name),
}

impl Atomic {
    /// Create a new atom from a string
    pub fn new_atom(name: &str) -> Self {
        Atomic::Atom(Name::from(name))
    }

    /// Create a new operator atom; a leading `^` is accepted and stripped
    pub fn new_operator(name: &str) -> Self {
        Atomic::Operator(Name::from(name.trim_start_matches('^')))
    }

    /// Get the identifier without any prefix
    pub fn name(&self) -> &str {
        match self {
            Atomic::Atom(n) | Atomic::Operator(n) => n,
        }
    }

    /// Check if this atom names an operation
    pub fn is_operator(&self) -> bool {
        matches!(self, Atomic::Operator(_))
    }

    pub(crate) fn op(&self) -> Op {
        match self {
            Atomic::Atom(_) => Op::Atom,
            Atomic::Operator(_) => Op::Operator,
        }
    }
}

impl fmt::Display for Atomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atomic::Atom(n) => write!(f, "{}", n),
            Atomic::Operator(n) => write!(f, "^{}", n),
        }
    }
}

impl From<Atomic> for Term {
    fn from(a: Atomic) -> Term {
        Term::Atomic(a)
    }
}
