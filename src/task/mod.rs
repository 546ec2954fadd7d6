//! Tasks
//!
//! A task is a sentence the reasoner should process, together with the
//! budget that competes for its attention. Judgment tasks stored inside a
//! concept are that concept's beliefs.

pub mod stamp;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::bag::Item;
use crate::control::budget::Budget;
use crate::term::Term;
use crate::truth::Truth;

pub use stamp::{Occurrence, Stamp, StampSerial};

/// Punctuation marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Punctuation {
    /// Judgment (belief)
    Judgment,

    /// Question
    Question,

    /// Goal
    Goal,
}

impl fmt::Display for Punctuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Punctuation::Judgment => write!(f, "."),
            Punctuation::Question => write!(f, "?"),
            Punctuation::Goal => write!(f, "!"),
        }
    }
}

/// Identity key of a sentence, used for queueing tasks. Two tasks carrying
/// the same statement, evidence and occurrence collapse onto one queue slot.
pub type SentenceKey = u64;

/// A statement with punctuation, optional truth, and its evidence stamp
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sentence {
    term: Term,
    punctuation: Punctuation,
    truth: Option<Truth>,
    stamp: Stamp,
}

impl Sentence {
    /// Create a judgment sentence
    pub fn judgment(term: Term, truth: Truth, stamp: Stamp) -> Self {
        Sentence {
            term,
            punctuation: Punctuation::Judgment,
            truth: Some(truth),
            stamp,
        }
    }

    /// Create a question sentence; questions carry no truth
    pub fn question(term: Term, stamp: Stamp) -> Self {
        Sentence {
            term,
            punctuation: Punctuation::Question,
            truth: None,
            stamp,
        }
    }

    /// Create a goal sentence
    pub fn goal(term: Term, truth: Truth, stamp: Stamp) -> Self {
        Sentence {
            term,
            punctuation: Punctuation::Goal,
            truth: Some(truth),
            stamp,
        }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn punctuation(&self) -> Punctuation {
        self.punctuation
    }

    pub fn truth(&self) -> Option<&Truth> {
        self.truth.as_ref()
    }

    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    pub fn is_eternal(&self) -> bool {
        self.stamp.is_eternal()
    }

    /// The sentence identity key (budget-independent)
    pub fn key(&self) -> SentenceKey {
        let mut hasher = DefaultHasher::new();
        self.term.hash(&mut hasher);
        self.punctuation.hash(&mut hasher);
        self.truth.hash(&mut hasher);
        self.stamp.evidential_base().hash(&mut hasher);
        self.stamp.occurrence().hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.term, self.punctuation)?;
        if let Some(truth) = &self.truth {
            write!(f, " {}", truth)?;
        }
        Ok(())
    }
}

/// A sentence under a budget
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    sentence: Sentence,
    budget: Budget,
    input: bool,
}

impl Task {
    /// Create a derived task
    pub fn new(sentence: Sentence, budget: Budget) -> Self {
        Task {
            sentence,
            budget,
            input: false,
        }
    }

    /// Create an input task (entered from outside the reasoner)
    pub fn new_input(sentence: Sentence, budget: Budget) -> Self {
        Task {
            sentence,
            budget,
            input: true,
        }
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn term(&self) -> &Term {
        self.sentence.term()
    }

    pub fn truth(&self) -> Option<&Truth> {
        self.sentence.truth()
    }

    pub fn stamp(&self) -> &Stamp {
        self.sentence.stamp()
    }

    pub fn punctuation(&self) -> Punctuation {
        self.sentence.punctuation()
    }

    pub fn is_judgment(&self) -> bool {
        self.sentence.punctuation() == Punctuation::Judgment
    }

    pub fn is_question(&self) -> bool {
        self.sentence.punctuation() == Punctuation::Question
    }

    pub fn is_goal(&self) -> bool {
        self.sentence.punctuation() == Punctuation::Goal
    }

    pub fn is_eternal(&self) -> bool {
        self.sentence.is_eternal()
    }

    /// Whether this task entered from outside the reasoner
    pub fn is_input(&self) -> bool {
        self.input
    }

    /// Belief rank: confidence, discounted by distance between `now` and the
    /// occurrence time for events. Belief lists sort descending on this.
    pub fn rank(&self, now: i64, duration: i64) -> f32 {
        let confidence = self.truth().map_or(0.0, |t| t.confidence());
        match self.stamp().occurrence() {
            Occurrence::Eternal => confidence,
            Occurrence::At(t) => {
                let distance = (now - t).abs() as f32 / duration.max(1) as f32;
                confidence / (1.0 + distance)
            }
        }
    }
}

impl Item for Task {
    type Key = SentenceKey;

    fn name(&self) -> SentenceKey {
        self.sentence.key()
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.budget, self.sentence)
    }
}
