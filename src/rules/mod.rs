//! Declarative rules: a guard condition plus a state transformation.
//!
//! Both halves are closed enums rather than closures, so rules can be
//! serialized, compared by name and shared across tasks read-only.

pub mod condition;
pub mod transformation;
pub mod rule;

pub use condition::{Condition, ConditionContext};
pub use transformation::Transformation;
pub use rule::{Rule, RuleSet};
