//! Variable terms
//!
//! Variables are special atomic terms that stand for other terms. Three kinds
//! are distinguished:
//! - Dependent variables (#)
//! - Independent variables ($)
//! - Query variables (?)
//!
//! A term containing any variable cannot host a concept of its own; the
//! concept builder refuses such terms.

use std::fmt;
use smartstring::SmartString;

type Name = SmartString<smartstring::LazyCompact>;

/// The kind of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    Dependent,
    Independent,
    Query,
}

impl VarKind {
    /// The prefix character used when printing
    pub fn prefix(&self) -> char {
        match self {
            VarKind::Dependent => '#',
            VarKind::Independent => '$',
            VarKind::Query => '?',
        }
    }
}

/// Variable term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    name: Name,
    kind: VarKind,
}

impl Variable {
    /// Create a new dependent variable
    pub fn new_dep(name: &str) -> Self {
        Variable {
            name: Name::from(name.trim_start_matches('#')),
            kind: VarKind::Dependent,
        }
    }

    /// Create a new independent variable
    pub fn new_indep(name: &str) -> Self {
        Variable {
            name: Name::from(name.trim_start_matches('$')),
            kind: VarKind::Independent,
        }
    }

    /// Create a new query variable
    pub fn new_query(name: &str) -> Self {
        Variable {
            name: Name::from(name.trim_start_matches('?')),
            kind: VarKind::Query,
        }
    }

    /// Get the variable name without the prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the kind of this variable
    pub fn kind(&self) -> VarKind {
        self.kind
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}
