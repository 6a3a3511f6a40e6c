//! Rule conditions.
//!
//! A condition is a pure predicate over a card in a state. Conditions are
//! plain data, so rule sets can be serialized, compared and inspected
//! without relying on function equality.

use serde::{Deserialize, Serialize};

use crate::core::{Card, Location, PlayerId, State, ZoneName};

/// A predicate deciding whether a rule may apply to a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    // === Card Flags ===

    /// Card is not tapped.
    Untapped,

    /// Card is tapped.
    Tapped,

    // === Card Identity ===

    /// Card has the given name.
    Named(String),

    /// Card is owned by the given player.
    OwnedBy(PlayerId),

    /// Card is in the given zone.
    InZone(ZoneName),

    // === Card Stats ===

    /// Card costs no more than this.
    CostAtMost(i32),

    /// Card attack is at least this.
    AttackAtLeast(i32),

    /// Card defense is at least this.
    DefenseAtLeast(i32),

    // === Board ===

    /// The card owner's `zone` holds fewer than `limit` cards.
    ZoneSizeBelow { zone: ZoneName, limit: usize },

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<Condition>),

    /// At least one condition must be true.
    Any(Vec<Condition>),

    /// Condition must be false.
    Not(Box<Condition>),

    // === Special ===

    /// Always true.
    Always,

    /// Always false.
    Never,
}

impl Condition {
    /// Create a name condition.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Create a zone condition.
    pub fn in_zone(zone: impl Into<ZoneName>) -> Self {
        Self::InZone(zone.into())
    }

    /// Create an owner condition.
    pub fn owned_by(player: impl Into<PlayerId>) -> Self {
        Self::OwnedBy(player.into())
    }

    /// Create a zone-size condition.
    pub fn zone_size_below(zone: impl Into<ZoneName>, limit: usize) -> Self {
        Self::ZoneSizeBelow {
            zone: zone.into(),
            limit,
        }
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// Check this condition in a context.
    #[must_use]
    pub fn holds(&self, ctx: &ConditionContext) -> bool {
        match self {
            Condition::Untapped => !ctx.card.tapped,

            Condition::Tapped => ctx.card.tapped,

            Condition::Named(name) => ctx.card.name == *name,

            Condition::OwnedBy(player) => ctx.card.owner == *player,

            Condition::InZone(zone) => ctx.zone == zone,

            Condition::CostAtMost(max) => ctx.card.cost <= *max,

            Condition::AttackAtLeast(min) => ctx.card.attack >= *min,

            Condition::DefenseAtLeast(min) => ctx.card.defense >= *min,

            Condition::ZoneSizeBelow { zone, limit } => {
                ctx.state.zone_len(&ctx.card.owner, zone) < *limit
            }

            Condition::All(conditions) => conditions.iter().all(|c| c.holds(ctx)),

            Condition::Any(conditions) => conditions.iter().any(|c| c.holds(ctx)),

            Condition::Not(inner) => !inner.holds(ctx),

            Condition::Always => true,

            Condition::Never => false,
        }
    }
}

/// Everything a condition may look at.
///
/// `card` must be the card as it currently sits in `state`, and `player`
/// / `zone` its current location.
#[derive(Clone, Copy, Debug)]
pub struct ConditionContext<'a> {
    /// The whole board, for board-level conditions.
    pub state: &'a State,
    /// The card under test.
    pub card: &'a Card,
    /// Player key the card sits under.
    pub player: &'a PlayerId,
    /// Zone the card sits in.
    pub zone: &'a ZoneName,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(state: &'a State, card: &'a Card, player: &'a PlayerId, zone: &'a ZoneName) -> Self {
        Self {
            state,
            card,
            player,
            zone,
        }
    }

    /// Create a context from a resolved location.
    pub fn at(state: &'a State, card: &'a Card, location: &'a Location) -> Self {
        Self::new(state, card, &location.player, &location.zone)
    }
}
