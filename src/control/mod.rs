//! The control layer: budgets, the premise queue, and the inference cycle.

pub mod budget;
pub mod cycle;
pub mod premise;

pub use budget::{ActivateMode, Budget};
pub use cycle::Control;
pub use premise::FireBelief;
