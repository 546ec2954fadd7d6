//! Compound terms
//!
//! Compound terms are constructed from other terms using operators.
//! Examples include conjunctions, implications, and inheritances. Subterms
//! are shared behind an `Arc` so cloning a compound is cheap; terms are used
//! as map keys throughout the control layer.

use super::{Op, Term};
use std::fmt;
use std::sync::Arc;

/// Compound term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compound {
    /// The operator of this compound term
    operator: Op,

    /// The subterms of this compound term
    subterms: Arc<[Term]>,
}

impl Compound {
    /// Create a new compound term
    pub fn new(operator: Op, subterms: Vec<Term>) -> Self {
        Compound {
            operator,
            subterms: subterms.into(),
        }
    }

    /// Get the subterms of this compound
    pub fn subterms(&self) -> &[Term] {
        &self.subterms
    }

    /// Get the operator of this compound
    pub fn operator(&self) -> Op {
        self.operator
    }

    /// Get the number of subterms
    pub fn len(&self) -> usize {
        self.subterms.len()
    }

    /// Check if there are no subterms
    pub fn is_empty(&self) -> bool {
        self.subterms.is_empty()
    }

    /// Get a subterm by index
    pub fn get(&self, index: usize) -> Option<&Term> {
        self.subterms.get(index)
    }

    /// Check whether any subterm (at any depth) is an interval
    pub fn contains_intervals(&self) -> bool {
        self.subterms.iter().any(|t| match t {
            Term::Interval(_) => true,
            Term::Compound(c) => c.contains_intervals(),
            _ => false,
        })
    }
}

fn append_compound_term(c: &Compound, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let op = c.operator();

    match op {
        Op::SetExt | Op::SetInt => {
            let (opener, closer) = if op == Op::SetExt { ('{', '}') } else { ('[', ']') };
            write!(f, "{}", opener)?;
            for (i, subterm) in c.subterms().iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{}", subterm)?;
            }
            write!(f, "{}", closer)?;
        }
        Op::Product => {
            write!(f, "(")?;
            for (i, subterm) in c.subterms().iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{}", subterm)?;
            }
            write!(f, ")")?;
        }
        Op::Neg => {
            write!(f, "(--, {})", c.subterms()[0])?;
        }
        _ => {
            if c.subterms().len() == 2 {
                write!(f, "({} {} {})", c.subterms()[0], op, c.subterms()[1])?;
            } else {
                write!(f, "({}", op)?;
                for subterm in c.subterms() {
                    write!(f, " {}", subterm)?;
                }
                write!(f, ")")?;
            }
        }
    }

    Ok(())
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        append_compound_term(self, f)
    }
}

impl From<Compound> for Term {
    fn from(c: Compound) -> Term {
        Term::Compound(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::atom::Atomic;

    #[test]
    fn test_compound_creation() {
        let bird = Term::Atomic(Atomic::new_atom("bird"));
        let animal = Term::Atomic(Atomic::new_atom("animal"));

        let compound = Compound::new(Op::Inheritance, vec![bird, animal]);
        assert_eq!(compound.len(), 2);
        assert_eq!(compound.operator(), Op::Inheritance);
        assert!(!compound.contains_intervals());
    }

    #[test]
    fn test_compound_display() {
        let bird = Term::Atomic(Atomic::new_atom("bird"));
        let animal = Term::Atomic(Atomic::new_atom("animal"));

        let inheritance = Compound::new(Op::Inheritance, vec![bird.clone(), animal.clone()]);
        assert_eq!(format!("{}", inheritance), "(bird --> animal)");

        let negation = Compound::new(Op::Neg, vec![bird.clone()]);
        assert_eq!(format!("{}", negation), "(--, bird)");

        let product = Compound::new(Op::Product, vec![bird, animal]);
        assert_eq!(format!("{}", product), "(bird, animal)");
    }

    #[test]
    fn test_interval_detection() {
        let step = Term::Atomic(Atomic::new_atom("step"));
        let seq = Compound::new(Op::Conjunction, vec![step.clone(), Term::Interval(5), step]);
        assert!(seq.contains_intervals());
    }

    #[test]
    fn test_nested_display() {
        let bird = Term::Atomic(Atomic::new_atom("bird"));
        let flies = Term::Atomic(Atomic::new_atom("flies"));
        let animal = Term::Atomic(Atomic::new_atom("animal"));

        let conj = Term::Compound(Compound::new(Op::Conjunction, vec![bird, flies]));
        let nested = Compound::new(Op::Inheritance, vec![conj, animal]);
        assert_eq!(format!("{}", nested), "((bird && flies) --> animal)");
    }
}
