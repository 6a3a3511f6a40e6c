//! Core value types: cards, state, actions, errors, configuration.
//!
//! Nothing here evaluates rules. `State` is a persistent value: every
//! modification produces a new state and leaves the old one intact.

pub mod card;
pub mod state;
pub mod action;
pub mod error;
pub mod config;

pub use card::{Card, CardId, PlayerId, ZoneName};
pub use state::{Board, Location, State, Zone};
pub use action::Action;
pub use error::{EngineError, Result};
pub use config::PipelineConfig;
