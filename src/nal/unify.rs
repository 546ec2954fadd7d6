//! Query-variable unification
//!
//! Question matching needs exactly one capability: deciding whether a
//! question term matches a belief term once query variables are bound
//! consistently. Other variable kinds stay inert here; full unification
//! belongs to the rule tables.

use hashbrown::HashMap;

use crate::term::{Term, VarKind, Variable};

/// Unify a pattern (which may contain query variables) with a concrete
/// term. Returns `true` when the terms match under a consistent binding.
pub fn unify_query(pattern: &Term, term: &Term) -> bool {
    let mut bindings = HashMap::new();
    unify_into(pattern, term, &mut bindings)
}

fn unify_into<'a>(
    pattern: &'a Term,
    term: &'a Term,
    bindings: &mut HashMap<&'a Variable, &'a Term>,
) -> bool {
    match pattern {
        Term::Variable(v) if v.kind() == VarKind::Query => {
            if let Some(bound) = bindings.get(v) {
                return *bound == term;
            }
            bindings.insert(v, term);
            true
        }
        Term::Compound(p) => match term {
            Term::Compound(t) if p.operator() == t.operator() && p.len() == t.len() => p
                .subterms()
                .iter()
                .zip(t.subterms().iter())
                .all(|(ps, ts)| unify_into(ps, ts, bindings)),
            _ => false,
        },
        _ => pattern == term,
    }
}
