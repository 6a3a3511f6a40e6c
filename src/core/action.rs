//! Actions: a rule bound to a target card.
//!
//! An `Action` is produced by `analyze` as a candidate, or built by a
//! selection layer as a choice. The card copy, player and zone are a
//! snapshot from when the action was created; `apply` always re-resolves
//! the target by id against the state it is applied to.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::card::{Card, CardId, PlayerId, ZoneName};
use super::state::State;
use crate::rules::Rule;

/// One application of a rule to one card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    /// The rule to apply. Shared with the rule set.
    pub rule: Arc<Rule>,

    /// Target card.
    pub target: CardId,

    /// Snapshot of the target when the action was created.
    pub card: Card,

    /// Player the target was stored under.
    pub player: PlayerId,

    /// Zone the target was in.
    pub zone: ZoneName,
}

impl Action {
    /// Create an action from a rule and a card sitting at `player`/`zone`.
    #[must_use]
    pub fn new(rule: Arc<Rule>, card: Card, player: PlayerId, zone: ZoneName) -> Self {
        Self {
            rule,
            target: card.id.clone(),
            card,
            player,
            zone,
        }
    }

    /// Create an action for a card, taking its location from `state`.
    ///
    /// Returns `None` if the card is not on the board.
    #[must_use]
    pub fn targeting(rule: Arc<Rule>, state: &State, id: &CardId) -> Option<Self> {
        let location = state.locate(id)?;
        let card = state.card(id)?.clone();
        Some(Self::new(rule, card, location.player, location.zone))
    }

    /// Name of the bound rule.
    #[must_use]
    pub fn rule_name(&self) -> &str {
        &self.rule.name
    }
}

/// Rules compare by name, so actions compare by (rule name, target, location).
impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.rule.name == other.rule.name
            && self.target == other.target
            && self.player == other.player
            && self.zone == other.zone
    }
}

impl Eq for Action {}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({}/{})", self.rule.name, self.target, self.player, self.zone)
    }
}
