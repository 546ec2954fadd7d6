//! Premise records
//!
//! Firing a task pairs it with beliefs drawn from its component concepts;
//! each pairing becomes a [`FireBelief`] record waiting in the bounded
//! premise queue. Every record is its own identity (a per-memory counter),
//! so equal-looking premises still compete separately for execution.

use crate::bag::Item;
use crate::control::budget::Budget;
use crate::task::Task;
use crate::term::Term;

/// Weight of a premise carrying no belief; numerically identical to the
/// expectation of a zero-confidence truth. Hand-tuned, do not adjust
/// without empirical validation.
pub const VIRTUAL_PREMISE_WEIGHT: f32 = 0.5;

/// A pending premise: a task paired with (at most) one belief
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FireBelief {
    /// Queue identity; unique per memory, never reused
    id: u64,

    /// The task side of the premise
    pub task: Task,

    /// The task's concept term (interval-stripped)
    pub task_concept_term: Term,

    /// The component term that led to the belief concept
    pub subterm: Term,

    /// The belief concept's term
    pub belief_concept: Term,

    /// The belief side; `None` makes this a virtual premise, for rules
    /// that fire on the task and subterm alone
    pub belief: Option<Task>,

    /// Whether this premise came from temporal-anchor fanout
    pub temporal: bool,

    budget: Budget,
}

impl FireBelief {
    /// Build a record with its derived budget:
    /// priority is the belief concept's priority weighted by the belief's
    /// expectation (or the virtual weight), durability follows the
    /// task-link decay parameter, quality is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        task: Task,
        task_concept_term: Term,
        subterm: Term,
        belief_concept: Term,
        belief_concept_priority: f32,
        belief: Option<Task>,
        temporal: bool,
        tasklink_forget_durations: u32,
    ) -> Self {
        let weight = belief
            .as_ref()
            .and_then(|b| b.truth())
            .map_or(VIRTUAL_PREMISE_WEIGHT, |t| t.expectation());
        let budget = Budget::new(
            belief_concept_priority * weight,
            tasklink_forget_durations as f32,
            0.0,
        );
        FireBelief {
            id,
            task,
            task_concept_term,
            subterm,
            belief_concept,
            belief,
            temporal,
            budget,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_virtual(&self) -> bool {
        self.belief.is_none()
    }
}

impl Item for FireBelief {
    type Key = u64;

    fn name(&self) -> u64 {
        self.id
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}
