//! The two synchronous operations of the engine.
//!
//! - `analyze`: which actions are legal in a state.
//! - `apply`: fold an ordered batch of actions into a new state, atomically.
//!
//! Both are pure and reentrant. They take the state by reference and never
//! mutate it, so any number of callers may run them concurrently.

pub mod analyze;
pub mod apply;

pub use analyze::{analyze, Analysis};
pub use apply::apply;
