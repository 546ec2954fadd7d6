//! Event bus
//!
//! The control layer reports what it does through a closed set of event
//! kinds. Observers subscribe per kind; emission is synchronous, and an
//! observer that panics is isolated and logged rather than allowed to tear
//! down the cycle.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use hashbrown::HashMap;

use crate::task::Sentence;
use crate::term::Term;

/// The closed set of event channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConceptNew,
    ConceptRemember,
    ConceptForget,
    ConceptBeliefAdd,
    ConceptBeliefRemove,
    TaskAdd,
    TaskRemove,
    Answer,
    CycleStart,
    CycleEnd,
    ResetStart,
    ResetEnd,
}

/// An event with its payload
#[derive(Debug, Clone)]
pub enum Event {
    /// A concept was created for a term
    ConceptNew(Term),

    /// A concept was revived from the subconscious
    ConceptRemember(Term),

    /// A concept was displaced from the store
    ConceptForget(Term),

    /// A belief entered a concept's belief list
    ConceptBeliefAdd { concept: Term, belief: Sentence },

    /// A belief fell off a concept's bounded belief list
    ConceptBeliefRemove { concept: Term, belief: Sentence },

    /// A task entered the input or cycling queue
    TaskAdd(Sentence),

    /// A task was displaced or neglected
    TaskRemove(Sentence),

    /// A question received an answer
    Answer { question: Sentence, answer: Sentence },

    CycleStart(i64),
    CycleEnd(i64),
    ResetStart,
    ResetEnd,
}

impl Event {
    /// The channel this event belongs to
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ConceptNew(_) => EventKind::ConceptNew,
            Event::ConceptRemember(_) => EventKind::ConceptRemember,
            Event::ConceptForget(_) => EventKind::ConceptForget,
            Event::ConceptBeliefAdd { .. } => EventKind::ConceptBeliefAdd,
            Event::ConceptBeliefRemove { .. } => EventKind::ConceptBeliefRemove,
            Event::TaskAdd(_) => EventKind::TaskAdd,
            Event::TaskRemove(_) => EventKind::TaskRemove,
            Event::Answer { .. } => EventKind::Answer,
            Event::CycleStart(_) => EventKind::CycleStart,
            Event::CycleEnd(_) => EventKind::CycleEnd,
            Event::ResetStart => EventKind::ResetStart,
            Event::ResetEnd => EventKind::ResetEnd,
        }
    }
}

type Observer = Box<dyn Fn(&Event) + Send>;

/// Publish-subscribe mapping channel -> observers. Not persisted; a loaded
/// memory starts with a fresh bus.
#[derive(Default)]
pub struct EventBus {
    observers: HashMap<EventKind, Vec<Observer>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Subscribe to one event kind
    pub fn on(&mut self, kind: EventKind, observer: impl Fn(&Event) + Send + 'static) {
        self.observers
            .entry(kind)
            .or_default()
            .push(Box::new(observer));
    }

    /// Emit an event to the observers of its kind. Observer panics are
    /// caught and logged; they never reach the cycle.
    pub fn emit(&self, event: Event) {
        let Some(observers) = self.observers.get(&event.kind()) else {
            return;
        };
        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(&event))).is_err() {
                log::warn!("observer for {:?} panicked; detaching from cycle", event.kind());
            }
        }
    }

    /// Number of observers across all channels
    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observer_count())
            .finish()
    }
}
