//! Concepts
//!
//! A concept is the reasoning unit for one term. It holds the beliefs whose
//! statements share that term (after interval normalization), the term-link
//! templates inherited from the term's structure, and the attention state
//! the cycle reads: a budget, the cycle of the last firing, and the most
//! recent event belief.

use std::fmt;
use indexmap::IndexMap;

use crate::bag::Item;
use crate::control::budget::Budget;
use crate::task::{Occurrence, Task};
use crate::term::{Term, TermLinkTemplate};

/// Result of inserting a belief into a concept
#[derive(Debug)]
pub struct BeliefChange {
    /// Whether the belief entered the list
    pub added: bool,

    /// The belief that fell off the end of the bounded list, if any
    pub removed: Option<Task>,
}

/// The reasoning unit for a term
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// The term that identifies this concept
    term: Term,

    /// Attention budget
    budget: Budget,

    /// Beliefs about this term, sorted strictly descending by rank
    beliefs: Vec<Task>,

    /// Term-link templates inherited from the compound structure
    templates: IndexMap<Term, TermLinkTemplate>,

    /// Cycle of the last firing; the novelty gate reads this
    last_fire_time: i64,

    /// Most recent non-eternal judgment, if any
    event: Option<Task>,
}

impl Concept {
    /// Create a new concept for a term
    pub fn new(term: Term, budget: Budget) -> Self {
        let templates = term.link_templates();
        Concept {
            term,
            budget,
            beliefs: Vec::new(),
            templates,
            last_fire_time: i64::MIN,
            event: None,
        }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn beliefs(&self) -> &[Task] {
        &self.beliefs
    }

    pub fn templates(&self) -> &IndexMap<Term, TermLinkTemplate> {
        &self.templates
    }

    /// The component terms this concept links to, in template order
    pub fn component_terms(&self) -> impl Iterator<Item = &Term> {
        self.templates.keys()
    }

    pub fn last_fire_time(&self) -> i64 {
        self.last_fire_time
    }

    pub fn set_last_fire_time(&mut self, now: i64) {
        self.last_fire_time = now;
    }

    /// The current event belief (most recent non-eternal judgment)
    pub fn event(&self) -> Option<&Task> {
        self.event.as_ref()
    }

    /// Insert a judgment into the belief list, keeping it sorted strictly
    /// descending by rank and bounded by `max`. A belief with the same truth
    /// and the same evidential base as an existing one is rejected.
    pub fn add_belief(&mut self, task: &Task, max: usize, now: i64, duration: i64) -> BeliefChange {
        debug_assert!(task.is_judgment());
        if max == 0 {
            return BeliefChange { added: false, removed: None };
        }

        let duplicate = self.beliefs.iter().any(|b| {
            b.truth() == task.truth()
                && b.stamp().evidential_base() == task.stamp().evidential_base()
        });
        if duplicate {
            return BeliefChange { added: false, removed: None };
        }

        let rank = task.rank(now, duration);
        let position = self
            .beliefs
            .iter()
            .position(|b| b.rank(now, duration) < rank)
            .unwrap_or(self.beliefs.len());

        if position >= max {
            // full list, and every kept belief outranks the newcomer
            return BeliefChange { added: false, removed: None };
        }
        self.beliefs.insert(position, task.clone());

        let removed = if self.beliefs.len() > max {
            self.beliefs.pop()
        } else {
            None
        };

        if !task.is_eternal() && self.newer_event(task) {
            self.event = Some(task.clone());
        }
        BeliefChange { added: true, removed }
    }

    fn newer_event(&self, task: &Task) -> bool {
        match (&self.event, task.stamp().occurrence()) {
            (None, _) => true,
            (Some(current), Occurrence::At(t)) => match current.stamp().occurrence() {
                Occurrence::At(c) => t >= c,
                Occurrence::Eternal => true,
            },
            _ => false,
        }
    }
}

impl Item for Concept {
    type Key = Term;

    fn name(&self) -> Term {
        self.term.clone()
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{} beliefs]",
            self.budget,
            self.term,
            self.beliefs.len()
        )
    }
}

/// Builds concepts for terms, or refuses. Injected into the memory so hosts
/// can vary concept construction.
pub trait ConceptBuilder {
    /// Build a concept for `term`, or `None` if the term cannot host one
    fn new_concept(&self, budget: Budget, term: &Term) -> Option<Concept>;
}

/// Standard builder: refuses intervals and terms with free (dependent or
/// independent) variables. Terms with query variables conceptualize, so
/// question statements can meet beliefs.
#[derive(Debug, Default)]
pub struct DefaultConceptBuilder;

impl ConceptBuilder for DefaultConceptBuilder {
    fn new_concept(&self, budget: Budget, term: &Term) -> Option<Concept> {
        if term.is_interval() || term.has_free_vars() {
            return None;
        }
        Some(Concept::new(term.clone(), budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Sentence, Stamp};
    use crate::term::atom::Atomic;
    use crate::term::{Compound, Op};
    use crate::truth::Truth;

    fn atom(s: &str) -> Term {
        Term::Atomic(Atomic::new_atom(s))
    }

    fn judgment(term: Term, confidence: f32, counter: u64) -> Task {
        Task::new(
            Sentence::judgment(
                term,
                Truth::new(1.0, confidence),
                Stamp::new((1, counter), 0, Occurrence::Eternal),
            ),
            Budget::default(),
        )
    }

    #[test]
    fn test_templates_from_term() {
        let term = Term::Compound(Compound::new(
            Op::Inheritance,
            vec![atom("bird"), atom("animal")],
        ));
        let concept = Concept::new(term, Budget::default());
        let components: Vec<&Term> = concept.component_terms().collect();
        assert_eq!(components, vec![&atom("bird"), &atom("animal")]);
    }

    #[test]
    fn test_beliefs_sorted_descending() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        for (confidence, counter) in [(0.5, 1), (0.9, 2), (0.7, 3)] {
            let change = concept.add_belief(&judgment(atom("bird"), confidence, counter), 7, 0, 5);
            assert!(change.added);
        }
        let ranks: Vec<f32> = concept.beliefs().iter().map(|b| b.rank(0, 5)).collect();
        assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
        assert!((ranks[0] - 0.9).abs() < 0.0001);
    }

    #[test]
    fn test_belief_capacity() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        for counter in 0..10 {
            concept.add_belief(
                &judgment(atom("bird"), 0.1 + 0.05 * counter as f32, counter),
                7,
                0,
                5,
            );
        }
        assert_eq!(concept.beliefs().len(), 7);
    }

    #[test]
    fn test_lowest_falls_off() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        concept.add_belief(&judgment(atom("bird"), 0.2, 1), 2, 0, 5);
        concept.add_belief(&judgment(atom("bird"), 0.9, 2), 2, 0, 5);
        let change = concept.add_belief(&judgment(atom("bird"), 0.5, 3), 2, 0, 5);
        assert!(change.added);
        let removed = change.removed.expect("lowest belief should fall off");
        assert!((removed.truth().unwrap().confidence() - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        let b = judgment(atom("bird"), 0.9, 1);
        assert!(concept.add_belief(&b, 7, 0, 5).added);
        assert!(!concept.add_belief(&b, 7, 0, 5).added);
        assert_eq!(concept.beliefs().len(), 1);
    }

    #[test]
    fn test_event_tracks_latest() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        let early = Task::new(
            Sentence::judgment(
                atom("bird"),
                Truth::new(1.0, 0.9),
                Stamp::new((1, 1), 0, Occurrence::At(3)),
            ),
            Budget::default(),
        );
        let late = Task::new(
            Sentence::judgment(
                atom("bird"),
                Truth::new(0.8, 0.9),
                Stamp::new((1, 2), 0, Occurrence::At(8)),
            ),
            Budget::default(),
        );
        concept.add_belief(&late, 7, 10, 5);
        concept.add_belief(&early, 7, 10, 5);
        let event = concept.event().expect("event belief expected");
        assert_eq!(event.stamp().occurrence(), Occurrence::At(8));
    }

    #[test]
    fn test_eternal_beliefs_are_not_events() {
        let mut concept = Concept::new(atom("bird"), Budget::default());
        concept.add_belief(&judgment(atom("bird"), 0.9, 1), 7, 0, 5);
        assert!(concept.event().is_none());
    }

    #[test]
    fn test_initial_fire_time_is_distant_past() {
        let concept = Concept::new(atom("bird"), Budget::default());
        assert_eq!(concept.last_fire_time(), i64::MIN);
    }

    #[test]
    fn test_builder_refuses_free_vars_and_intervals() {
        let builder = DefaultConceptBuilder;
        assert!(builder
            .new_concept(Budget::default(), &Term::Interval(3))
            .is_none());
        let with_free_var = Term::Compound(Compound::new(
            Op::Inheritance,
            vec![
                Term::Variable(crate::term::Variable::new_indep("x")),
                atom("animal"),
            ],
        ));
        assert!(builder
            .new_concept(Budget::default(), &with_free_var)
            .is_none());

        // query variables are allowed: question statements get concepts
        let with_query = Term::Compound(Compound::new(
            Op::Inheritance,
            vec![
                Term::Variable(crate::term::Variable::new_query("x")),
                atom("animal"),
            ],
        ));
        assert!(builder.new_concept(Budget::default(), &with_query).is_some());
        assert!(builder.new_concept(Budget::default(), &atom("bird")).is_some());
    }
}
