//! Reasoner parameters
//!
//! One validated block of knobs controlling capacities, decay rates and
//! per-cycle budgets. Out-of-range values are fatal at construction; the
//! running cycle never re-validates.

use thiserror::Error;

/// Raised when a parameter is out of its legal range
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter {name} = {value} out of range ({expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Reasoner configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    /// Capacity of the concept store
    pub concept_bag_size: usize,

    /// Capacity of the cycling-task queue and the premise queue
    pub task_link_bag_size: usize,

    /// Beliefs retained per concept
    pub concept_beliefs_max: usize,

    /// Decay cycles applied when a concept is reinserted
    pub concept_forget_durations: u32,

    /// Decay cycles applied when a task is reinserted
    pub tasklink_forget_durations: u32,

    /// Minimum cycles between two firings of the same concept
    pub novelty_horizon: i64,

    /// Temporal anchors drawn per cycle
    pub sequence_bag_attempts: usize,

    /// Tasks fired per cycle
    pub tasks_max_fired: usize,

    /// Premise records executed per cycle
    pub premises_max_fired: usize,

    /// Cycles per logical duration
    pub duration: i64,

    /// Output reporting threshold, 0-100
    pub volume: u8,

    /// Quality floor multiplier used by forgetting, in [0, 1]
    pub quality_rescaled: f32,

    /// Default priority of execution-feedback tasks
    pub default_feedback_priority: f32,

    /// Default durability of execution-feedback tasks
    pub default_feedback_durability: f32,

    /// Budget-summary noise floor below which tasks are neglected
    pub noise_level: f32,

    /// Capacity of the subconscious overflow cache; 0 disables it
    pub subconscious_size: usize,

    /// Seed of the per-reasoner RNG (probabilistic bag sampling)
    pub rng_seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            concept_bag_size: 1024,
            task_link_bag_size: 256,
            concept_beliefs_max: 28,
            concept_forget_durations: 2,
            tasklink_forget_durations: 4,
            novelty_horizon: 10,
            sequence_bag_attempts: 4,
            tasks_max_fired: 4,
            premises_max_fired: 8,
            duration: 5,
            volume: 50,
            quality_rescaled: 0.3,
            default_feedback_priority: 0.9,
            default_feedback_durability: 0.5,
            noise_level: 0.01,
            subconscious_size: 2048,
            rng_seed: 1,
        }
    }
}

impl Parameters {
    /// Validate the block; fatal on the first out-of-range value
    pub fn validated(self) -> Result<Self, ParameterError> {
        fn unit(name: &'static str, value: f32) -> Result<(), ParameterError> {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParameterError::OutOfRange {
                    name,
                    value: value as f64,
                    expected: "0.0 ..= 1.0",
                });
            }
            Ok(())
        }

        if self.volume > 100 {
            return Err(ParameterError::OutOfRange {
                name: "volume",
                value: self.volume as f64,
                expected: "0 ..= 100",
            });
        }
        if self.novelty_horizon < 0 {
            return Err(ParameterError::OutOfRange {
                name: "novelty_horizon",
                value: self.novelty_horizon as f64,
                expected: ">= 0",
            });
        }
        if self.duration < 1 {
            return Err(ParameterError::OutOfRange {
                name: "duration",
                value: self.duration as f64,
                expected: ">= 1",
            });
        }
        unit("quality_rescaled", self.quality_rescaled)?;
        unit("default_feedback_priority", self.default_feedback_priority)?;
        unit("default_feedback_durability", self.default_feedback_durability)?;
        unit("noise_level", self.noise_level)?;
        Ok(self)
    }

    /// Budget-summary threshold above which output is reported
    pub fn report_threshold(&self) -> f32 {
        (100 - self.volume as i32) as f32 / 100.0
    }
}
