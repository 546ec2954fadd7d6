//! Memory snapshots
//!
//! The whole memory serializes into one opaque snapshot: concepts (with
//! their beliefs), the subconscious, the queues, the stamp counters and the
//! parameters. The event bus is not persisted; a restored memory starts
//! with a fresh one. Restoration always rebuilds the deterministic concept
//! store, re-inserting items in descending priority order so the restored
//! store is logically identical to the captured one.

use serde::{Deserialize, Serialize};

use super::Memory;
use crate::bag::Attention;
use crate::concept::Concept;
use crate::control::premise::FireBelief;
use crate::param::Parameters;
use crate::task::Task;

/// Serializable image of a [`Memory`]
#[derive(Serialize, Deserialize)]
pub struct MemorySnapshot {
    params: Parameters,
    nar_id: u64,
    stamp_counter: u64,
    premise_counter: u64,

    /// Concepts in descending priority order
    concepts: Vec<Concept>,

    /// Subconscious contents, most recently used first
    subconscious: Vec<Concept>,

    input_tasks: Vec<Task>,

    /// Cycling tasks in descending priority order
    cycling_tasks: Vec<Task>,

    /// Pending premises in descending priority order
    premises: Vec<FireBelief>,
}

impl MemorySnapshot {
    /// Capture the current state of a memory
    pub fn capture(memory: &Memory) -> Self {
        MemorySnapshot {
            params: memory.params.clone(),
            nar_id: memory.nar_id,
            stamp_counter: memory.stamp_counter,
            premise_counter: memory.premise_counter,
            concepts: memory.concepts.iter().cloned().collect(),
            subconscious: memory
                .subconscious
                .as_ref()
                .map(|cache| cache.iter().map(|(_, c)| c.clone()).collect())
                .unwrap_or_default(),
            input_tasks: memory.input_tasks.iter().cloned().collect(),
            cycling_tasks: memory.cycling_tasks.iter().cloned().collect(),
            premises: memory.premises.iter().cloned().collect(),
        }
    }

    /// Rebuild a memory from this snapshot. The event bus starts empty and
    /// the RNG of a probabilistic store restarts from the recorded seed.
    pub fn restore(self) -> Memory {
        let mut memory = Memory::new(self.params, self.nar_id);
        memory.stamp_counter = self.stamp_counter;
        memory.premise_counter = self.premise_counter;

        for concept in self.concepts {
            memory.concepts.put_in(concept);
        }
        if let Some(cache) = memory.subconscious.as_mut() {
            // oldest first, so the recency order survives the round trip
            for concept in self.subconscious.into_iter().rev() {
                cache.put(concept.term().clone(), concept);
            }
        }
        memory.input_tasks = self.input_tasks.into();
        for task in self.cycling_tasks {
            memory.cycling_tasks.put_in(task);
        }
        for premise in self.premises {
            memory.premises.put_in(premise);
        }
        memory
    }
}
