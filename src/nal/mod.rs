//! Logic-layer collaborators
//!
//! The control layer requires a rule table, answer delivery, and operation
//! execution, but does not implement them. This module defines those seams
//! and the small default implementations the tests and the demo binary run
//! with.

pub mod derivation;
pub mod nar;
pub mod unify;

use crate::task::Task;

pub use derivation::Derivation;
pub use nar::Nar;

/// The external rule table. Given an executed premise (visible through the
/// context), it may queue derived tasks via [`Derivation::derive`].
pub trait RuleTables {
    fn reason(&self, ctx: &mut Derivation);
}

/// Answer delivery: called when a question task unifies with a belief.
pub trait LocalRules {
    fn try_solution(&self, belief: &Task, task: &Task, ctx: &mut Derivation, is_input: bool);
}

/// Side effect hook for executable operation terms in derived tasks.
pub trait OperationExecutor {
    fn execute(&self, task: &Task);
}

/// A rule table that derives nothing. Useful for driving the attention
/// dynamics alone.
#[derive(Debug, Default)]
pub struct NullRuleTables;

impl RuleTables for NullRuleTables {
    fn reason(&self, _ctx: &mut Derivation) {}
}

/// Answer delivery that reports the unified belief as the solution.
#[derive(Debug, Default)]
pub struct DefaultLocalRules;

impl LocalRules for DefaultLocalRules {
    fn try_solution(&self, belief: &Task, _task: &Task, ctx: &mut Derivation, _is_input: bool) {
        ctx.report_answer(belief.clone());
    }
}
