//! Attention budgets and forgetting
//!
//! Every item the control layer touches (concepts, tasks, premise records)
//! carries a budget: a `(priority, durability, quality)` triple plus the
//! cycle at which forgetting was last applied. Priority is what the bags
//! order by; durability resists decay; quality sets the floor decay can
//! never cross.

use std::fmt;
use ordered_float::OrderedFloat;

/// Budget triple controlling an item's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Budget {
    /// Current importance [0.0, 1.0]
    priority: OrderedFloat<f32>,

    /// Resistance to forgetting [0.0, 1.0]
    durability: OrderedFloat<f32>,

    /// Long-term usefulness [0.0, 1.0]
    quality: OrderedFloat<f32>,

    /// Cycle at which forgetting was last applied; monotonically
    /// non-decreasing over an item's lifetime
    last_forget_time: i64,
}

/// How two budgets combine when an existing item is re-activated. Each mode
/// is a deterministic pure function of the two triples; all of them keep the
/// merged priority at or above both operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateMode {
    /// Or-combination: repeated activations accumulate
    TaskLink,

    /// Plain maximum: activation never overshoots the stronger operand
    TermLink,

    /// Midpoint of max and or
    Concept,
}

/// Probabilistic sum, the or-combinator of budget arithmetic
fn or(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

impl Budget {
    /// Create a new budget; components are clamped to [0, 1]
    pub fn new(priority: f32, durability: f32, quality: f32) -> Self {
        Budget::new_at(priority, durability, quality, 0)
    }

    /// Create a new budget whose forgetting clock starts at `now`
    pub fn new_at(priority: f32, durability: f32, quality: f32, now: i64) -> Self {
        Budget {
            priority: OrderedFloat(priority.clamp(0.0, 1.0)),
            durability: OrderedFloat(durability.clamp(0.0, 1.0)),
            quality: OrderedFloat(quality.clamp(0.0, 1.0)),
            last_forget_time: now,
        }
    }

    pub fn priority(&self) -> f32 {
        self.priority.0
    }

    pub fn durability(&self) -> f32 {
        self.durability.0
    }

    pub fn quality(&self) -> f32 {
        self.quality.0
    }

    pub fn last_forget_time(&self) -> i64 {
        self.last_forget_time
    }

    pub fn set_priority(&mut self, priority: f32) {
        self.priority = OrderedFloat(priority.clamp(0.0, 1.0));
    }

    /// Restart the forgetting clock, e.g. when a concept is revived from the
    /// subconscious. The clock never moves backwards.
    pub fn reset_forget_time(&mut self, now: i64) {
        self.last_forget_time = self.last_forget_time.max(now);
    }

    /// Scalar summary of the triple, used for thresholds and reporting
    pub fn summary(&self) -> f32 {
        (self.priority.0 + self.durability.0 + self.quality.0) / 3.0
    }

    /// Compare the summary against a configured noise floor
    pub fn above_threshold(&self, noise: f32) -> bool {
        self.summary() >= noise
    }

    /// Merge `incoming` into this budget. Priority combines per `mode`,
    /// durability moves toward the stronger operand, quality is unchanged.
    pub fn activate(&mut self, incoming: &Budget, mode: ActivateMode) {
        let (p, ip) = (self.priority.0, incoming.priority.0);
        let merged = match mode {
            ActivateMode::TaskLink => or(p, ip),
            ActivateMode::TermLink => p.max(ip),
            ActivateMode::Concept => (p.max(ip) + or(p, ip)) / 2.0,
        };
        self.priority = OrderedFloat(merged.clamp(0.0, 1.0));

        let (d, id) = (self.durability.0, incoming.durability.0);
        self.durability = OrderedFloat(((d + d.max(id)) / 2.0).clamp(0.0, 1.0));
    }

    /// Decay priority toward the quality floor. The decay factor is
    /// `durability ^ (Δcycles / forget_cycles)`, so durable items fade
    /// slowly and a zero-durability item collapses to its floor at once.
    /// Priority never rises and never crosses below
    /// `quality * relative_threshold`.
    pub fn apply_forgetting(&mut self, forget_cycles: f32, relative_threshold: f32, now: i64) {
        let dt = (now - self.last_forget_time).max(0);
        self.last_forget_time = self.last_forget_time.max(now);
        if dt == 0 || forget_cycles <= 0.0 {
            return;
        }

        let floor = self.quality.0 * relative_threshold.clamp(0.0, 1.0);
        let p = self.priority.0;
        if p <= floor {
            return;
        }
        let factor = self.durability.0.powf(dt as f32 / forget_cycles);
        self.priority = OrderedFloat(floor + (p - floor) * factor);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::new(0.5, 0.5, 0.5)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.2};{:.2};{:.2}$",
            self.priority.0, self.durability.0, self.quality.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_clamping() {
        let b = Budget::new(1.5, -0.2, 0.5);
        assert_eq!(b.priority(), 1.0);
        assert_eq!(b.durability(), 0.0);
        assert_eq!(b.quality(), 0.5);
    }

    #[test]
    fn test_summary() {
        let b = Budget::new(0.9, 0.6, 0.3);
        assert!((b.summary() - 0.6).abs() < 0.0001);
        assert!(b.above_threshold(0.5));
        assert!(!b.above_threshold(0.7));
    }

    #[test]
    fn test_activate_never_below_operands() {
        for mode in [
            ActivateMode::TaskLink,
            ActivateMode::TermLink,
            ActivateMode::Concept,
        ] {
            let mut target = Budget::new(0.4, 0.5, 0.2);
            let incoming = Budget::new(0.7, 0.3, 0.9);
            target.activate(&incoming, mode);
            assert!(target.priority() >= 0.7, "{:?}", mode);
            assert!(target.priority() <= 1.0, "{:?}", mode);
            // quality untouched
            assert_eq!(target.quality(), 0.2);
        }
    }

    #[test]
    fn test_activate_modes_differ() {
        let incoming = Budget::new(0.5, 0.5, 0.5);

        let mut tl = Budget::new(0.5, 0.5, 0.5);
        tl.activate(&incoming, ActivateMode::TaskLink);
        assert!((tl.priority() - 0.75).abs() < 0.0001);

        let mut tm = Budget::new(0.5, 0.5, 0.5);
        tm.activate(&incoming, ActivateMode::TermLink);
        assert!((tm.priority() - 0.5).abs() < 0.0001);

        let mut co = Budget::new(0.5, 0.5, 0.5);
        co.activate(&incoming, ActivateMode::Concept);
        assert!((co.priority() - 0.625).abs() < 0.0001);
    }

    #[test]
    fn test_durability_moves_toward_stronger() {
        let mut b = Budget::new(0.5, 0.4, 0.0);
        b.activate(&Budget::new(0.5, 0.8, 0.0), ActivateMode::TaskLink);
        assert!((b.durability() - 0.6).abs() < 0.0001);

        // the weaker operand does not drag durability down
        let mut b = Budget::new(0.5, 0.8, 0.0);
        b.activate(&Budget::new(0.5, 0.4, 0.0), ActivateMode::TaskLink);
        assert!((b.durability() - 0.8).abs() < 0.0001);
    }

    #[test]
    fn test_forgetting_monotonic_to_floor() {
        let rescaled = 0.3;
        let mut b = Budget::new_at(0.8, 0.5, 0.1, 0);
        let floor = 0.1 * rescaled;

        let mut last = b.priority();
        for now in 1..=10 {
            b.apply_forgetting(5.0, rescaled, now);
            assert!(b.priority() < last, "priority must strictly decrease");
            assert!(b.priority() >= floor, "priority must not cross the floor");
            last = b.priority();
        }
        // converges toward the floor
        for now in 11..=300 {
            b.apply_forgetting(5.0, rescaled, now);
        }
        assert!((b.priority() - floor).abs() < 0.01);
    }

    #[test]
    fn test_forgetting_noop_without_elapsed_cycles() {
        let mut b = Budget::new_at(0.8, 0.5, 0.1, 5);
        b.apply_forgetting(5.0, 0.3, 5);
        assert_eq!(b.priority(), 0.8);
    }

    #[test]
    fn test_forget_time_monotonic() {
        let mut b = Budget::new_at(0.8, 0.5, 0.1, 10);
        b.apply_forgetting(5.0, 0.3, 3);
        assert_eq!(b.last_forget_time(), 10);
        b.apply_forgetting(5.0, 0.3, 12);
        assert_eq!(b.last_forget_time(), 12);
    }

    #[test]
    fn test_full_durability_holds_priority() {
        let mut b = Budget::new_at(0.8, 1.0, 0.0, 0);
        b.apply_forgetting(5.0, 0.3, 50);
        assert!((b.priority() - 0.8).abs() < 0.0001);
    }
}
