//! Derivation context
//!
//! One scratch-pad per executed premise. It carries everything a rule table
//! may consult (clock, merged stamp, current task / term / concept /
//! belief, the temporal and overlap flags) and collects what the rules
//! produce; the cycle feeds the results back into memory after the rule
//! call returns.

use crate::control::premise::FireBelief;
use crate::task::{Stamp, Task};
use crate::term::Term;

/// Per-premise derivation context handed to the rule tables
pub struct Derivation<'a> {
    now: i64,
    stamp: Stamp,
    premise: &'a FireBelief,
    overlap: bool,
    derived: Vec<Task>,
    answers: Vec<Task>,
}

impl<'a> Derivation<'a> {
    pub(crate) fn new(now: i64, stamp: Stamp, premise: &'a FireBelief, overlap: bool) -> Self {
        Derivation {
            now,
            stamp,
            premise,
            overlap,
            derived: Vec::new(),
            answers: Vec::new(),
        }
    }

    /// The current cycle
    pub fn now(&self) -> i64 {
        self.now
    }

    /// The merged (or retimed) stamp derived conclusions should carry
    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    /// The task side of the premise
    pub fn task(&self) -> &Task {
        &self.premise.task
    }

    /// The task's concept term
    pub fn term(&self) -> &Term {
        &self.premise.task_concept_term
    }

    /// The component term that selected the belief concept
    pub fn subterm(&self) -> &Term {
        &self.premise.subterm
    }

    /// The belief concept's term
    pub fn concept(&self) -> &Term {
        &self.premise.belief_concept
    }

    /// The belief side, absent for virtual premises
    pub fn belief(&self) -> Option<&Task> {
        self.premise.belief.as_ref()
    }

    /// Whether this premise came from temporal-anchor fanout
    pub fn temporal(&self) -> bool {
        self.premise.temporal
    }

    /// Whether task and belief share evidence (circular inference guard)
    pub fn overlap(&self) -> bool {
        self.overlap
    }

    /// Queue a derived task for re-entry into the cycle
    pub fn derive(&mut self, task: Task) {
        self.derived.push(task);
    }

    /// Report a belief as an answer to the current (question) task
    pub fn report_answer(&mut self, belief: Task) {
        self.answers.push(belief);
    }

    pub(crate) fn into_results(self) -> (Vec<Task>, Vec<Task>) {
        (self.derived, self.answers)
    }
}
