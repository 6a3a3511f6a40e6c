//! Cards and the identifiers that address them on the board.
//!
//! Identifiers are string newtypes. They order lexicographically, which is
//! the order the board iterates players and zones in.

use serde::{Deserialize, Serialize};

/// Card identifier, unique within a game.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Player identifier. Keys the top level of the board.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Zone name (hand, battlefield, graveyard...). Games pick the names;
/// the engine only compares them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(String);

impl ZoneName {
    /// Create a new zone name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZoneName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A card as it currently sits on the board.
///
/// `owner` must match the player key the card is stored under in
/// [`State`](super::State); `State::place` enforces this by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier within the game.
    pub id: CardId,

    /// Owning player.
    pub owner: PlayerId,

    /// Display name.
    pub name: String,

    /// Is this card tapped?
    #[serde(default)]
    pub tapped: bool,

    /// Mana cost.
    #[serde(default)]
    pub cost: i32,

    /// Attack power.
    #[serde(default)]
    pub attack: i32,

    /// Defense (toughness).
    #[serde(default)]
    pub defense: i32,
}

impl Card {
    /// Create an untapped card with zeroed stats.
    #[must_use]
    pub fn new(id: impl Into<CardId>, owner: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            name: name.into(),
            tapped: false,
            cost: 0,
            attack: 0,
            defense: 0,
        }
    }

    /// Set the cost.
    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    /// Set attack and defense.
    #[must_use]
    pub fn with_stats(mut self, attack: i32, defense: i32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    /// Mark the card as tapped.
    #[must_use]
    pub fn tapped(mut self) -> Self {
        self.tapped = true;
        self
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for ZoneName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
