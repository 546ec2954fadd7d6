//! The inference cycle
//!
//! One step per call: drain temporal anchors, select tasks (inputs first),
//! pre-activate their concepts, fire each task into premises, then execute
//! a bounded batch of the most important pending premises. Everything here
//! runs synchronously under the single writer of the memory; bounding the
//! per-cycle counts is what keeps the reasoner responsive under load.

use std::panic::{catch_unwind, AssertUnwindSafe};

use hashbrown::HashMap;

use crate::bag::Item;
use crate::concept::{ConceptBuilder, DefaultConceptBuilder};
use crate::control::budget::Budget;
use crate::control::premise::FireBelief;
use crate::event::Event;
use crate::memory::Memory;
use crate::nal::unify::unify_query;
use crate::nal::{
    Derivation, DefaultLocalRules, LocalRules, NullRuleTables, OperationExecutor, RuleTables,
};
use crate::task::{Occurrence, Sentence, Stamp, Task};
use crate::term::Term;
use crate::truth::Truth;

/// The collaborator bundle driving the cycle
pub struct Control {
    pub rules: Box<dyn RuleTables + Send>,
    pub local: Box<dyn LocalRules + Send>,
    pub builder: Box<dyn ConceptBuilder + Send>,

    /// Registered operation executors, by operator name
    pub executors: HashMap<String, Box<dyn OperationExecutor + Send>>,
}

impl Default for Control {
    fn default() -> Self {
        Control {
            rules: Box::new(NullRuleTables),
            local: Box::new(DefaultLocalRules),
            builder: Box::new(DefaultConceptBuilder),
            executors: HashMap::new(),
        }
    }
}

impl Control {
    /// Run one cycle step at time `now`
    pub fn step(&mut self, mem: &mut Memory, now: i64) {
        mem.emit(Event::CycleStart(now));
        let tasks_max = mem.params().tasks_max_fired;
        let premises_max = mem.params().premises_max_fired;
        let attempts = mem.params().sequence_bag_attempts;

        // 1. temporal anchors: the highest-priority concepts, decayed once
        // for being looked at
        let anchors = mem.take_highest_concepts(attempts);
        let anchor_events: Vec<(Term, Task)> = anchors
            .iter()
            .filter_map(|c| c.event().map(|e| (c.term().clone(), e.clone())))
            .collect();
        for concept in anchors {
            mem.put_back_concept(concept, now);
        }

        // 2. task selection, inputs first
        let mut selected = Vec::with_capacity(tasks_max);
        while selected.len() < tasks_max {
            match mem.next_task() {
                Some(task) => selected.push(task),
                None => break,
            }
        }

        // 3. pre-activation
        for task in &selected {
            mem.conceptualize(*task.budget(), task.term(), true, &*self.builder, now);
        }

        // 4. firing
        for task in selected {
            log::trace!("firing {}", task);
            self.fire_task(mem, &task, &anchor_events, now);
            mem.put_back_task(task, now);
        }

        // 5. premise batch
        for _ in 0..premises_max {
            match mem.next_premise() {
                Some(premise) => self.fire_premise(mem, premise, now),
                None => break,
            }
        }

        mem.emit(Event::CycleEnd(now));
    }

    /// Turn one task into premises against the beliefs of its component
    /// concepts
    fn fire_task(&self, mem: &mut Memory, task: &Task, anchors: &[(Term, Task)], now: i64) {
        let novelty_horizon = mem.params().novelty_horizon;
        let task_concept_term = task.term().replace_intervals();

        if mem
            .conceptualize(*task.budget(), &task_concept_term, true, &*self.builder, now)
            .is_none()
        {
            return;
        }

        if task.is_judgment() {
            self.add_to_beliefs_conceptualizing_components(mem, task, &task_concept_term, now);
        }

        mem.forget_concept(&task_concept_term, now);

        // novelty gate: a hot concept must cool down before firing again
        let Some(concept) = mem.concept(&task_concept_term) else {
            return;
        };
        if now.saturating_sub(concept.last_fire_time()) < novelty_horizon {
            log::trace!("novelty gate holds {}", task_concept_term);
            return;
        }
        let components: Vec<Term> = concept.component_terms().cloned().collect();
        mem.mutate_concept(&task_concept_term, |c| c.set_last_fire_time(now));

        for sub in components {
            if mem.concept(&sub).is_none() {
                continue;
            }
            mem.forget_concept(&sub, now);
            let Some(belief_concept) = mem.concept(&sub) else {
                continue;
            };
            let concept_priority = belief_concept.priority();
            let beliefs: Vec<Task> = belief_concept.beliefs().to_vec();

            for belief in beliefs {
                mem.enqueue_premise(
                    task.clone(),
                    task_concept_term.clone(),
                    belief.term().clone(),
                    sub.clone(),
                    concept_priority,
                    Some(belief),
                    false,
                );
            }
            // the virtual premise lets rules fire on the term alone
            mem.enqueue_premise(
                task.clone(),
                task_concept_term.clone(),
                sub.clone(),
                sub.clone(),
                concept_priority,
                None,
                false,
            );
        }

        // temporal fanout against the cycle's anchor events
        if task.is_judgment() && !task.is_eternal() {
            for (anchor_term, event) in anchors {
                let concept_priority = mem
                    .concept(anchor_term)
                    .map(|c| c.priority())
                    .unwrap_or(0.0);
                mem.enqueue_premise(
                    task.clone(),
                    task_concept_term.clone(),
                    event.term().clone(),
                    anchor_term.clone(),
                    concept_priority,
                    Some(event.clone()),
                    true,
                );
            }
        }
    }

    /// Insert a judgment as a belief of its own concept and of every
    /// component concept, creating the latter on demand
    fn add_to_beliefs_conceptualizing_components(
        &self,
        mem: &mut Memory,
        task: &Task,
        task_concept_term: &Term,
        now: i64,
    ) {
        mem.insert_belief(task_concept_term, task, now);
        let components: Vec<Term> = mem
            .concept(task_concept_term)
            .map(|c| c.component_terms().cloned().collect())
            .unwrap_or_default();
        for sub in components {
            if mem
                .conceptualize(*task.budget(), &sub, true, &*self.builder, now)
                .is_some()
            {
                mem.insert_belief(&sub, task, now);
            }
        }
    }

    /// Execute one premise record: stamp bookkeeping, question matching,
    /// then the external rule table. Rule failures stay inside this call.
    fn fire_premise(&self, mem: &mut Memory, premise: FireBelief, now: i64) {
        let stamp = match &premise.belief {
            Some(belief) => Stamp::merge(premise.task.stamp(), belief.stamp(), now),
            None => premise.task.stamp().retimed(now),
        };
        let overlap = premise
            .belief
            .as_ref()
            .is_some_and(|b| b.stamp().overlaps(premise.task.stamp()));

        let mut ctx = Derivation::new(now, stamp, &premise, overlap);

        if !premise.task.is_judgment() {
            if let Some(belief) = &premise.belief {
                if unify_query(premise.task.term(), belief.term()) {
                    self.local
                        .try_solution(belief, &premise.task, &mut ctx, premise.task.is_input());
                }
            }
        }

        if catch_unwind(AssertUnwindSafe(|| self.rules.reason(&mut ctx))).is_err() {
            log::warn!("rule table panicked on premise for {}", premise.task);
        }

        let (derived, answers) = ctx.into_results();
        for answer in answers {
            if answer.budget().summary() >= mem.params().report_threshold() {
                log::info!("answer: {} for {}", answer, premise.task);
            }
            mem.emit(Event::Answer {
                question: premise.task.sentence().clone(),
                answer: answer.sentence().clone(),
            });
        }
        for task in derived {
            self.add_derived(mem, task, now);
        }
    }

    /// Re-enter a derived task; operation terms on goal tasks additionally
    /// fire the registered executor and leave an execution-feedback belief
    fn add_derived(&self, mem: &mut Memory, task: Task, now: i64) {
        if task.is_goal() && task.term().is_operation() {
            if let Some(executor) = task
                .term()
                .operation_name()
                .and_then(|name| self.executors.get(name))
            {
                executor.execute(&task);
                let serial = mem.new_stamp_serial();
                let feedback = Task::new(
                    Sentence::judgment(
                        task.term().clone(),
                        Truth::default_judgment(),
                        Stamp::new(serial, now, Occurrence::At(now)),
                    ),
                    Budget::new_at(
                        mem.params().default_feedback_priority,
                        mem.params().default_feedback_durability,
                        0.5,
                        now,
                    ),
                );
                mem.add_task(feedback, true);
            }
        }
        mem.add_task(task, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::param::Parameters;
    use crate::term::atom::Atomic;
    use crate::term::{Compound, Op, Variable};
    use std::sync::Arc;
    use parking_lot::Mutex;

    fn atom(s: &str) -> Term {
        Term::Atomic(Atomic::new_atom(s))
    }

    fn inh(a: Term, b: Term) -> Term {
        Term::Compound(Compound::new(Op::Inheritance, vec![a, b]))
    }

    fn scenario_params() -> Parameters {
        Parameters {
            concept_bag_size: 32,
            concept_beliefs_max: 7,
            duration: 5,
            novelty_horizon: 10,
            tasks_max_fired: 1,
            premises_max_fired: 8,
            ..Parameters::default()
        }
        .validated()
        .unwrap()
    }

    fn memory() -> Memory {
        Memory::new(scenario_params(), 1)
    }

    fn input_judgment(mem: &mut Memory, term: Term) -> Task {
        let serial = mem.new_stamp_serial();
        let task = Task::new_input(
            Sentence::judgment(
                term,
                Truth::new(1.0, 0.9),
                Stamp::new(serial, 0, Occurrence::Eternal),
            ),
            Budget::new(0.8, 0.5, 0.7),
        );
        mem.add_task(task.clone(), false);
        task
    }

    fn count_events(mem: &mut Memory, kind: EventKind) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        mem.on_event(kind, move |e| sink.lock().push(e.clone()));
        seen
    }

    /// Counts premise executions by recording rule-table invocations.
    struct CountingRules {
        calls: Arc<Mutex<Vec<(Term, bool)>>>,
    }

    impl RuleTables for CountingRules {
        fn reason(&self, ctx: &mut Derivation) {
            self.calls
                .lock()
                .push((ctx.subterm().clone(), ctx.belief().is_none()));
        }
    }

    #[test]
    fn test_single_judgment_single_belief() {
        let mut mem = memory();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut control = Control {
            rules: Box::new(CountingRules { calls: calls.clone() }),
            ..Control::default()
        };
        let cycle_end = count_events(&mut mem, EventKind::CycleEnd);

        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        control.step(&mut mem, 0);

        // the statement concept and both component concepts exist
        for term in [
            inh(atom("bird"), atom("animal")),
            atom("bird"),
            atom("animal"),
        ] {
            let concept = mem.concept(&term).unwrap_or_else(|| panic!("no {}", term));
            assert_eq!(concept.beliefs().len(), 1, "belief missing in {}", term);
        }

        // two belief premises plus two virtual premises, all executed
        let calls = calls.lock();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls.iter().filter(|(_, virt)| *virt).count(), 2);
        assert_eq!(cycle_end.lock().len(), 1);
    }

    #[test]
    fn test_novelty_gating() {
        let mut mem = memory();
        let mut control = Control::default();

        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        let statement = inh(atom("bird"), atom("animal"));

        control.step(&mut mem, 0);
        assert_eq!(mem.concept(&statement).unwrap().last_fire_time(), 0);

        // 1 cycle later the gate holds
        control.step(&mut mem, 1);
        assert_eq!(mem.concept(&statement).unwrap().last_fire_time(), 0);

        // at the horizon the concept fires again
        control.step(&mut mem, 11);
        assert_eq!(mem.concept(&statement).unwrap().last_fire_time(), 11);
    }

    #[test]
    fn test_question_matching() {
        let mut mem = memory();
        let mut control = Control::default();
        let answers = count_events(&mut mem, EventKind::Answer);

        // seed the belief and let it settle into component concepts
        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        control.step(&mut mem, 0);

        // ask ?x --> animal
        let serial = mem.new_stamp_serial();
        let question = Task::new_input(
            Sentence::question(
                inh(Term::Variable(Variable::new_query("x")), atom("animal")),
                Stamp::new(serial, 1, Occurrence::Eternal),
            ),
            Budget::new(0.9, 0.9, 1.0),
        );
        mem.add_task(question, false);
        control.step(&mut mem, 1);

        let answers = answers.lock();
        assert_eq!(answers.len(), 1, "exactly one answer expected");
        match &answers[0] {
            Event::Answer { answer, .. } => {
                assert_eq!(answer.term(), &inh(atom("bird"), atom("animal")));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_empty_cycle_emits_only_boundaries() {
        let mut mem = memory();
        let mut control = Control::default();
        let all = {
            let seen = Arc::new(Mutex::new(Vec::new()));
            for kind in [
                EventKind::ConceptNew,
                EventKind::ConceptForget,
                EventKind::TaskAdd,
                EventKind::TaskRemove,
                EventKind::CycleStart,
                EventKind::CycleEnd,
            ] {
                let sink = seen.clone();
                mem.on_event(kind, move |e| sink.lock().push(e.kind()));
            }
            seen
        };

        control.step(&mut mem, 0);
        assert_eq!(
            *all.lock(),
            vec![EventKind::CycleStart, EventKind::CycleEnd]
        );
    }

    #[test]
    fn test_cycle_boundaries_pair_up() {
        let mut mem = memory();
        let mut control = Control::default();
        let order = {
            let seen = Arc::new(Mutex::new(Vec::new()));
            for kind in [EventKind::CycleStart, EventKind::CycleEnd] {
                let sink = seen.clone();
                mem.on_event(kind, move |e| sink.lock().push(e.kind()));
            }
            seen
        };
        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        for now in 0..3 {
            control.step(&mut mem, now);
        }
        assert_eq!(
            *order.lock(),
            vec![
                EventKind::CycleStart,
                EventKind::CycleEnd,
                EventKind::CycleStart,
                EventKind::CycleEnd,
                EventKind::CycleStart,
                EventKind::CycleEnd,
            ]
        );
    }

    #[test]
    fn test_store_capacity_respected_across_cycles() {
        let params = Parameters {
            concept_bag_size: 4,
            subconscious_size: 8,
            ..scenario_params()
        };
        let mut mem = Memory::new(params.validated().unwrap(), 1);
        let mut control = Control::default();

        for (i, name) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            input_judgment(&mut mem, inh(atom(name), atom("animal")));
            control.step(&mut mem, i as i64);
            assert!(mem.concept_count() <= 4);
        }
    }

    #[test]
    fn test_rule_panic_is_contained() {
        struct PanickingRules;
        impl RuleTables for PanickingRules {
            fn reason(&self, _ctx: &mut Derivation) {
                panic!("rule table exploded");
            }
        }
        let mut mem = memory();
        let mut control = Control {
            rules: Box::new(PanickingRules),
            ..Control::default()
        };
        let cycle_end = count_events(&mut mem, EventKind::CycleEnd);

        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        control.step(&mut mem, 0);
        assert_eq!(cycle_end.lock().len(), 1, "cycle survives rule panics");
    }

    #[test]
    fn test_derivations_reenter_cycling_queue() {
        struct DerivingRules;
        impl RuleTables for DerivingRules {
            fn reason(&self, ctx: &mut Derivation) {
                if ctx.belief().is_some() {
                    let stamp = ctx.stamp().clone();
                    let term = Term::Compound(Compound::new(
                        Op::Inheritance,
                        vec![
                            Term::Atomic(Atomic::new_atom("derived")),
                            Term::Atomic(Atomic::new_atom("animal")),
                        ],
                    ));
                    ctx.derive(Task::new(
                        Sentence::judgment(term, Truth::new(1.0, 0.5), stamp),
                        Budget::new(0.6, 0.5, 0.3),
                    ));
                }
            }
        }
        let mut mem = memory();
        let mut control = Control {
            rules: Box::new(DerivingRules),
            ..Control::default()
        };
        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        control.step(&mut mem, 0);
        assert!(mem.pending_tasks() > 0, "derived tasks should be queued");
    }

    #[test]
    fn test_operation_execution_with_feedback() {
        struct Recorder {
            executed: Arc<Mutex<u32>>,
        }
        impl OperationExecutor for Recorder {
            fn execute(&self, _task: &Task) {
                *self.executed.lock() += 1;
            }
        }
        struct OperationRules;
        impl RuleTables for OperationRules {
            fn reason(&self, ctx: &mut Derivation) {
                if ctx.belief().is_some() {
                    let stamp = ctx.stamp().clone();
                    let op = Term::Compound(Compound::new(
                        Op::Product,
                        vec![
                            Term::Atomic(Atomic::new_operator("left")),
                            Term::Atomic(Atomic::new_atom("a")),
                        ],
                    ));
                    ctx.derive(Task::new(
                        Sentence::goal(op, Truth::new(1.0, 0.9), stamp),
                        Budget::new(0.8, 0.5, 0.5),
                    ));
                }
            }
        }

        let executed = Arc::new(Mutex::new(0u32));
        let mut control = Control {
            rules: Box::new(OperationRules),
            ..Control::default()
        };
        control.executors.insert(
            "left".to_string(),
            Box::new(Recorder {
                executed: executed.clone(),
            }),
        );

        let mut mem = memory();
        input_judgment(&mut mem, inh(atom("bird"), atom("animal")));
        control.step(&mut mem, 0);
        assert!(*executed.lock() > 0, "executor should have fired");
    }
}
