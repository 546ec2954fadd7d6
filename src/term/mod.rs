//! Term representation
//!
//! A term is a symbolic expression the reasoner attends to. Terms can be
//! atomic ("bird"), variables ("?x"), intervals ("+5", positional markers in
//! temporal sequences), or compound ("(bird --> animal)"). Terms are
//! structurally hashable and equality-comparable, which makes them usable as
//! keys of the concept store.

pub mod atom;
pub mod compound;
pub mod var;

use std::fmt;
use indexmap::IndexMap;

pub use atom::Atomic;
pub use compound::Compound;
pub use var::{VarKind, Variable};

/// Operator types for compound terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    // Atomic operators
    Atom,
    Operator,
    Interval,
    Var,

    // Compound operators
    Neg,
    Conjunction,
    Disjunction,
    Intersection,
    Difference,
    Inheritance,
    Similarity,
    Implication,
    Equivalence,
    Product,
    SetExt,
    SetInt,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Atom => write!(f, "Atom"),
            Op::Operator => write!(f, "^"),
            Op::Interval => write!(f, "+"),
            Op::Var => write!(f, "Var"),
            Op::Neg => write!(f, "--"),
            Op::Conjunction => write!(f, "&&"),
            Op::Disjunction => write!(f, "||"),
            Op::Intersection => write!(f, "|"),
            Op::Difference => write!(f, "~"),
            Op::Inheritance => write!(f, "-->"),
            Op::Similarity => write!(f, "<->"),
            Op::Implication => write!(f, "==>"),
            Op::Equivalence => write!(f, "<=>"),
            Op::Product => write!(f, "*"),
            Op::SetExt => write!(f, "{{}}"),
            Op::SetInt => write!(f, "[]"),
        }
    }
}

/// A term: atomic, variable, interval, or compound
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    Atomic(Atomic),
    Variable(Variable),
    Interval(i64),
    Compound(Compound),
}

/// A term-link template: one entry of the canonical decomposition of a
/// compound term into the component terms the cycle pairs beliefs from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermLinkTemplate {
    /// The component term, interval-stripped
    pub component: Term,

    /// Nesting depth below the compound root (1 = immediate subterm)
    pub depth: u8,

    /// Index of the top-level subterm this component descends from
    pub position: usize,
}

/// How deep component links reach into a compound. Two levels mirror the
/// classic link-preparation depth.
const TEMPLATE_DEPTH: u8 = 2;

impl Term {
    /// Get the complexity of the term (number of subterms + 1)
    pub fn complexity(&self) -> usize {
        match self {
            Term::Compound(c) => 1 + c.subterms().iter().map(|t| t.complexity()).sum::<usize>(),
            _ => 1,
        }
    }

    /// Get the operator ID of the term
    pub fn op(&self) -> Op {
        match self {
            Term::Atomic(a) => a.op(),
            Term::Variable(_) => Op::Var,
            Term::Interval(_) => Op::Interval,
            Term::Compound(c) => c.operator(),
        }
    }

    /// Check if the term is atomic (not a compound)
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Term::Compound(_))
    }

    /// Check if the term is compound
    pub fn is_compound(&self) -> bool {
        matches!(self, Term::Compound(_))
    }

    /// Check if the term is an interval. Intervals are positional, not
    /// conceptual: they never host a concept.
    pub fn is_interval(&self) -> bool {
        matches!(self, Term::Interval(_))
    }

    /// Check if the term is an executable operation: an operator atom, or a
    /// compound whose first subterm is one (e.g. `(^left, a, b)`).
    pub fn is_operation(&self) -> bool {
        match self {
            Term::Atomic(a) => a.is_operator(),
            Term::Compound(c) => c.get(0).is_some_and(|t| t.is_operation()),
            _ => false,
        }
    }

    /// Check whether the term contains any variable, at any depth
    pub fn has_vars(&self) -> bool {
        match self {
            Term::Variable(_) => true,
            Term::Compound(c) => c.subterms().iter().any(|t| t.has_vars()),
            _ => false,
        }
    }

    /// Check whether the term contains a dependent or independent variable.
    /// Query variables are excluded: question statements keep their own
    /// concepts so question matching can pair them with beliefs.
    pub fn has_free_vars(&self) -> bool {
        match self {
            Term::Variable(v) => v.kind() != VarKind::Query,
            Term::Compound(c) => c.subterms().iter().any(|t| t.has_free_vars()),
            _ => false,
        }
    }

    /// The operator name of an operation term, if any
    pub fn operation_name(&self) -> Option<&str> {
        match self {
            Term::Atomic(a) if a.is_operator() => Some(a.name()),
            Term::Compound(c) => c.get(0).and_then(|t| t.operation_name()),
            _ => None,
        }
    }

    /// Canonicalize for conceptual use: prune interval components from
    /// compounds, recursively. A compound reduced to a single subterm
    /// unwraps to it; a bare interval stays itself (callers reject it
    /// before conceptualizing).
    pub fn replace_intervals(&self) -> Term {
        match self {
            Term::Compound(c) if c.contains_intervals() => {
                let kept: Vec<Term> = c
                    .subterms()
                    .iter()
                    .filter(|t| !t.is_interval())
                    .map(|t| t.replace_intervals())
                    .collect();
                match kept.len() {
                    1 => kept.into_iter().next().unwrap(),
                    _ => Term::Compound(Compound::new(c.operator(), kept)),
                }
            }
            _ => self.clone(),
        }
    }

    /// Enumerate the term-link templates of this term: the ordered mapping
    /// component-term -> template. Atomic terms have none. Order is the
    /// deterministic depth-first order of the subterm list; intervals and
    /// variables never become components.
    pub fn link_templates(&self) -> IndexMap<Term, TermLinkTemplate> {
        let mut templates = IndexMap::new();
        if let Term::Compound(c) = self {
            for (position, sub) in c.subterms().iter().enumerate() {
                collect_templates(sub, 1, position, &mut templates);
            }
        }
        templates
    }
}

fn collect_templates(
    term: &Term,
    depth: u8,
    position: usize,
    out: &mut IndexMap<Term, TermLinkTemplate>,
) {
    if term.is_interval() || matches!(term, Term::Variable(_)) {
        return;
    }
    let component = term.replace_intervals();
    out.entry(component.clone()).or_insert(TermLinkTemplate {
        component,
        depth,
        position,
    });
    if depth < TEMPLATE_DEPTH {
        if let Term::Compound(c) = term {
            for sub in c.subterms() {
                collect_templates(sub, depth + 1, position, out);
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atomic(a) => write!(f, "{}", a),
            Term::Variable(v) => write!(f, "{}", v),
            Term::Interval(i) => write!(f, "+{}", i),
            Term::Compound(c) => write!(f, "{}", c),
        }
    }
}
