//! # richter
//!
//! A rule-driven state-transition engine for turn-based card games.
//!
//! ## Design Principles
//!
//! 1. **Rules as Data**: A rule is a named `Condition` plus a
//!    `Transformation`, both closed enums. Rule sets are supplied by the
//!    game, serializable, and shared read-only.
//!
//! 2. **Deterministic Analysis**: The board is ordered (player id, zone
//!    name, position), so `analyze` output is a function of its inputs.
//!
//! 3. **Atomic Application**: `apply` folds a batch of actions into a new
//!    state or rejects the whole batch. States are persistent values, so
//!    a rejected batch can't leak changes into the caller's state.
//!
//! 4. **Single Writer**: The `Pipeline` task is the only owner of the
//!    authoritative state. Everyone else talks to it through queues.
//!
//! ## Modules
//!
//! - `core`: Cards, identifiers, state, actions, errors, configuration
//! - `rules`: Conditions, transformations, rules and rule sets
//! - `engine`: `analyze` and `apply`
//! - `pipeline`: Async orchestrator, action selection, analysis stage

pub mod core;
pub mod rules;
pub mod engine;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{
    Card, CardId, PlayerId, ZoneName,
    Board, Location, State, Zone,
    Action,
    EngineError, Result,
    PipelineConfig,
};

pub use crate::rules::{Condition, ConditionContext, Transformation, Rule, RuleSet};

pub use crate::engine::{analyze, apply, Analysis};

pub use crate::pipeline::{
    ActionSelector, FirstPerArrival, AllForArrivals, RandomPerArrival,
    Pipeline, PipelineHandle, Outcome, Phase, Update, Rejection,
    spawn_analysis_stage,
};
