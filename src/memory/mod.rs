//! Memory
//!
//! The memory owns every piece of cross-cycle state: the bounded concept
//! store, the subconscious overflow cache, the input / cycling / premise
//! queues, the stamp serial counter and the event bus. All mutation goes
//! through take -> mutate -> reinsert sequences, because priority keys the
//! store; an in-place budget update would silently corrupt its order.

#[cfg(feature = "serde")]
pub mod snapshot;

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::bag::{Attention, Item, PriorityMap, PutOutcome};
use crate::concept::{Concept, ConceptBuilder};
use crate::control::budget::{ActivateMode, Budget};
use crate::control::premise::FireBelief;
use crate::event::{Event, EventBus, EventKind};
use crate::param::Parameters;
use crate::task::{StampSerial, Task};
use crate::term::Term;

/// The reasoner's long- and short-term state
pub struct Memory {
    params: Parameters,

    /// Concept store; the cycle only sees the `Attention` interface, so
    /// deterministic and probabilistic stores are interchangeable
    concepts: Box<dyn Attention<Concept> + Send>,

    /// Recently displaced concepts, revivable by conceptualization
    subconscious: Option<LruCache<Term, Concept>>,

    /// Tasks entered from outside, processed FIFO and ahead of cycling tasks
    input_tasks: VecDeque<Task>,

    /// Tasks cycling through the attention loop
    cycling_tasks: PriorityMap<Task>,

    /// Pending premises awaiting execution
    premises: PriorityMap<FireBelief>,

    events: EventBus,

    nar_id: u64,
    stamp_counter: u64,
    premise_counter: u64,
}

impl Memory {
    /// Create a memory with the deterministic concept store
    pub fn new(params: Parameters, nar_id: u64) -> Self {
        let store = Box::new(PriorityMap::new(params.concept_bag_size));
        Memory::with_store(params, nar_id, store)
    }

    /// Create a memory around a caller-supplied concept store variant
    pub fn with_store(
        params: Parameters,
        nar_id: u64,
        store: Box<dyn Attention<Concept> + Send>,
    ) -> Self {
        let subconscious = NonZeroUsize::new(params.subconscious_size).map(LruCache::new);
        Memory {
            cycling_tasks: PriorityMap::new(params.task_link_bag_size),
            premises: PriorityMap::new(params.task_link_bag_size),
            concepts: store,
            subconscious,
            input_tasks: VecDeque::new(),
            events: EventBus::new(),
            params,
            nar_id,
            stamp_counter: 0,
            premise_counter: 0,
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn nar_id(&self) -> u64 {
        self.nar_id
    }

    /// Subscribe an observer to an event kind
    pub fn on_event(&mut self, kind: EventKind, observer: impl Fn(&Event) + Send + 'static) {
        self.events.on(kind, observer);
    }

    pub(crate) fn emit(&self, event: Event) {
        self.events.emit(event);
    }

    /// Issue a fresh stamp serial: `(reasoner id, monotonic counter)`
    pub fn new_stamp_serial(&mut self) -> StampSerial {
        self.stamp_counter += 1;
        (self.nar_id, self.stamp_counter)
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Look up a concept without mutating anything. The term must already
    /// be normalized.
    pub fn concept(&self, term: &Term) -> Option<&Concept> {
        self.concepts.get(term)
    }

    /// Map a term to its concept, creating or reviving it if allowed.
    ///
    /// Interval terms never conceptualize. An existing (or revived) concept
    /// is activated with the incoming budget; either way the concept is
    /// reinserted through `put_back`, paying one forgetting step, and the
    /// insertion outcome decides the result: a rejected insert means the
    /// concept itself lost the capacity fight and goes to the subconscious.
    pub fn conceptualize(
        &mut self,
        budget: Budget,
        term: &Term,
        create_if_missing: bool,
        builder: &dyn ConceptBuilder,
        now: i64,
    ) -> Option<&Concept> {
        if term.is_interval() {
            return None;
        }
        let term = term.replace_intervals();

        let mut concept = self.concepts.take(&term);

        if concept.is_none() {
            if let Some(cache) = self.subconscious.as_mut() {
                if let Some(mut revived) = cache.pop(&term) {
                    revived.budget_mut().reset_forget_time(now);
                    self.events.emit(Event::ConceptRemember(term.clone()));
                    concept = Some(revived);
                }
            }
        }

        let concept = match concept {
            Some(mut existing) => {
                existing.budget_mut().activate(&budget, ActivateMode::TaskLink);
                existing
            }
            None => {
                if !create_if_missing {
                    return None;
                }
                let mut built = builder.new_concept(budget, &term)?;
                built.budget_mut().reset_forget_time(now);
                self.events.emit(Event::ConceptNew(term.clone()));
                built
            }
        };

        let outcome = self.concepts.put_back(
            concept,
            self.params.concept_forget_durations as f32,
            self.params.quality_rescaled,
            now,
        );
        match outcome {
            PutOutcome::Stored => self.concepts.get(&term),
            PutOutcome::Rejected(lost) => {
                self.concept_removed(lost);
                None
            }
            PutOutcome::Displaced(other) => {
                self.concept_removed(other);
                self.concepts.get(&term)
            }
        }
    }

    /// Activate a stored concept's budget under `mode`, reinserting through
    /// `put_back`
    pub fn activate_concept(&mut self, term: &Term, budget: &Budget, mode: ActivateMode, now: i64) {
        if let Some(mut concept) = self.concepts.take(term) {
            concept.budget_mut().activate(budget, mode);
            self.reinsert_concept(concept, now);
        }
    }

    /// Apply one forgetting step to a stored concept
    pub fn forget_concept(&mut self, term: &Term, now: i64) {
        if let Some(concept) = self.concepts.take(term) {
            self.reinsert_concept(concept, now);
        }
    }

    /// Take -> mutate -> reinsert without a decay step. This is the only
    /// sanctioned way to modify a stored concept in place.
    pub fn mutate_concept<R>(
        &mut self,
        term: &Term,
        f: impl FnOnce(&mut Concept) -> R,
    ) -> Option<R> {
        let mut concept = self.concepts.take(term)?;
        let result = f(&mut concept);
        if let Some(lost) = self.concepts.put_in(concept).evicted() {
            self.concept_removed(lost);
        }
        Some(result)
    }

    /// Drain up to `n` highest-priority concepts (the cycle's temporal
    /// anchors); the caller reinserts them via [`Memory::put_back_concept`]
    pub fn take_highest_concepts(&mut self, n: usize) -> Vec<Concept> {
        let mut drained = Vec::with_capacity(n);
        for _ in 0..n {
            match self.concepts.take_highest() {
                Some(c) => drained.push(c),
                None => break,
            }
        }
        drained
    }

    /// Reinsert a drained concept, paying one forgetting step
    pub fn put_back_concept(&mut self, concept: Concept, now: i64) {
        self.reinsert_concept(concept, now);
    }

    fn reinsert_concept(&mut self, concept: Concept, now: i64) {
        let outcome = self.concepts.put_back(
            concept,
            self.params.concept_forget_durations as f32,
            self.params.quality_rescaled,
            now,
        );
        if let Some(lost) = outcome.evicted() {
            self.concept_removed(lost);
        }
    }

    /// A concept lost its place in the store: move it to the subconscious
    /// (if present) and announce the forgetting
    fn concept_removed(&mut self, concept: Concept) {
        let term = concept.term().clone();
        if let Some(cache) = self.subconscious.as_mut() {
            cache.put(term.clone(), concept);
        }
        self.events.emit(Event::ConceptForget(term));
    }

    /// Insert a judgment into the belief list of the concept for `term`
    /// (which must be normalized and present)
    pub fn insert_belief(&mut self, term: &Term, task: &Task, now: i64) {
        let max = self.params.concept_beliefs_max;
        let duration = self.params.duration;
        let Some(change) = self.mutate_concept(term, |c| c.add_belief(task, max, now, duration))
        else {
            return;
        };
        if change.added {
            self.events.emit(Event::ConceptBeliefAdd {
                concept: term.clone(),
                belief: task.sentence().clone(),
            });
        }
        if let Some(removed) = change.removed {
            self.events.emit(Event::ConceptBeliefRemove {
                concept: term.clone(),
                belief: removed.sentence().clone(),
            });
        }
    }

    /// Accept a task: inputs append to the FIFO, derivations compete in the
    /// cycling queue. Derivations below the noise floor are neglected.
    pub fn add_task(&mut self, task: Task, derived: bool) {
        if !derived {
            self.events.emit(Event::TaskAdd(task.sentence().clone()));
            self.input_tasks.push_back(task);
            return;
        }
        if !task.budget().above_threshold(self.params.noise_level) {
            self.events.emit(Event::TaskRemove(task.sentence().clone()));
            return;
        }
        if task.budget().summary() >= self.params.report_threshold() {
            log::info!("derived: {}", task);
        }
        self.events.emit(Event::TaskAdd(task.sentence().clone()));
        if let Some(evicted) = self.cycling_tasks.put_in(task).evicted() {
            self.events.emit(Event::TaskRemove(evicted.sentence().clone()));
        }
    }

    /// Select the next task to fire: input FIFO first, then the
    /// highest-priority cycling task
    pub fn next_task(&mut self) -> Option<Task> {
        if let Some(task) = self.input_tasks.pop_front() {
            return Some(task);
        }
        self.cycling_tasks.take_highest()
    }

    /// Return a fired task to the cycling queue, paying one decay step
    pub fn put_back_task(&mut self, task: Task, now: i64) {
        let outcome = self.cycling_tasks.put_back(
            task,
            self.params.tasklink_forget_durations as f32,
            self.params.quality_rescaled,
            now,
        );
        if let Some(evicted) = outcome.evicted() {
            self.events.emit(Event::TaskRemove(evicted.sentence().clone()));
        }
    }

    /// Enqueue a premise pairing `task` with an optional belief of the
    /// concept for `belief_concept`. Overflow evicts the least important
    /// pending premise, silently.
    #[allow(clippy::too_many_arguments)]
    pub fn enqueue_premise(
        &mut self,
        task: Task,
        task_concept_term: Term,
        subterm: Term,
        belief_concept: Term,
        belief_concept_priority: f32,
        belief: Option<Task>,
        temporal: bool,
    ) {
        self.premise_counter += 1;
        let record = FireBelief::new(
            self.premise_counter,
            task,
            task_concept_term,
            subterm,
            belief_concept,
            belief_concept_priority,
            belief,
            temporal,
            self.params.tasklink_forget_durations,
        );
        self.premises.put_in(record);
    }

    /// Dequeue the most important pending premise
    pub fn next_premise(&mut self) -> Option<FireBelief> {
        self.premises.take_highest()
    }

    pub fn pending_premises(&self) -> usize {
        self.premises.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.input_tasks.len() + self.cycling_tasks.len()
    }

    /// Clear every store and counter back to the initial state
    pub fn reset(&mut self) {
        self.events.emit(Event::ResetStart);
        while self.concepts.take_highest().is_some() {}
        if let Some(cache) = self.subconscious.as_mut() {
            cache.clear();
        }
        self.input_tasks.clear();
        while self.cycling_tasks.take_highest().is_some() {}
        while self.premises.take_highest().is_some() {}
        self.stamp_counter = 0;
        self.premise_counter = 0;
        self.events.emit(Event::ResetEnd);
    }

}
