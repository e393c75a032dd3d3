//! Sample acquisition from the board's registers.
//!
//! The engine only sees [`SampleSource`]. [`RegisterSource`] implements it
//! on top of any [`RegisterBus`], decoding counters and voltage rails.

pub mod bus;
pub mod registers;
pub mod traits;

// Re-export commonly used items
pub use bus::{DefaultBus, SysfsBus};
pub use registers::{Register, RegisterSource};
pub use traits::{RegisterBus, SampleSource};
