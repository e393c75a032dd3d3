//! Channel monitors: bounded history, conditions and triggers.
//!
//! A [`Monitor`] samples one [`Channel`], keeps its [`HistoryBuffer`] and
//! evaluates its [`Trigger`]s against the latest sample on every pass.

pub mod channel;
pub mod condition;
pub mod history;
pub mod sample;
pub mod trigger;

// Re-export commonly used items
pub use channel::Monitor;
pub use condition::Condition;
pub use history::HistoryBuffer;
pub use sample::{Channel, Sample};
pub use trigger::{Trigger, TriggerState};
