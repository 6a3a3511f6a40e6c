//! Engine error type.

use thiserror::Error;

use super::card::{CardId, PlayerId, ZoneName};

/// Errors produced by state construction, rule application and the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An action's rule condition was false when the batch reached it.
    /// The batch is rejected and the original state stands.
    #[error("rule `{rule}` does not hold for card {target} (action {step} of batch)")]
    RuleConditionFailed {
        rule: String,
        target: CardId,
        step: usize,
    },

    /// A referenced card id is not on the board. This is a consistency bug
    /// in the caller, not a legal-but-rejected move.
    #[error("card {target} is not on the board{}", by_rule(.rule))]
    TargetNotFound {
        target: CardId,
        /// Rule of the action that referenced the card, if any.
        rule: Option<String>,
    },

    /// A card id is already present elsewhere on the board.
    #[error("card {card} already placed at {player}/{zone}")]
    DuplicateCard {
        card: CardId,
        player: PlayerId,
        zone: ZoneName,
    },

    /// A card is stored under a player that does not own it.
    #[error("card {card} is owned by {owner} but stored under {player}")]
    OwnerMismatch {
        card: CardId,
        owner: PlayerId,
        player: PlayerId,
    },

    /// Two rules in one rule set share a name.
    #[error("duplicate rule name `{0}`")]
    DuplicateRule(String),

    /// Rule or pipeline configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pipeline task has stopped accepting batches.
    #[error("pipeline is closed")]
    PipelineClosed,

    /// Fatal internal failure (e.g. the pipeline task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

fn by_rule(rule: &Option<String>) -> String {
    rule.as_ref()
        .map(|name| format!(" (rule `{name}`)"))
        .unwrap_or_default()
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
