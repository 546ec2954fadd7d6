//! ALANN attention and inference-control core
//!
//! This crate implements the control layer of a Non-Axiomatic Reasoning
//! System: the bounded concept store with budget-based forgetting, the
//! subconscious overflow cache, the conceptualization protocol, the
//! ALANN-style inference cycle, and the prioritized premise queue. It
//! operates under the Assumption of Insufficient Knowledge and Resources:
//! memory and time are bounded, and every cycle makes forward progress
//! even when starved.
//!
//! The reasoning rules themselves, the full truth algebra, and the Narsese
//! parser are external collaborators; this crate defines the traits they
//! plug into (see [`nal`]) and ships null/default implementations.

pub mod bag;
pub mod concept;
pub mod control;
pub mod event;
pub mod memory;
pub mod nal;
pub mod param;
pub mod task;
pub mod term;
pub mod time;
pub mod truth;

// Re-export the main components for easier access
pub use bag::{Attention, Bag, Item, PriorityMap, PutOutcome};
pub use concept::{Concept, ConceptBuilder, DefaultConceptBuilder};
pub use control::{ActivateMode, Budget, Control, FireBelief};
pub use event::{Event, EventBus, EventKind};
pub use memory::Memory;
pub use nal::{Derivation, LocalRules, Nar, OperationExecutor, RuleTables};
pub use param::{ParameterError, Parameters};
pub use task::{Occurrence, Punctuation, Sentence, Stamp, Task};
pub use term::Term;
pub use time::Clock;
pub use truth::Truth;
