//! Game state: the board of cards, per player and zone.
//!
//! ## Ordering
//!
//! The board nests `im::OrdMap`s, so iteration is lexicographic by player
//! id, then zone name, then position within the zone. `analyze` relies on
//! this order being a function of the state alone.
//!
//! ## Copy-on-write
//!
//! Every modifying operation takes `&self` and returns a new `State`.
//! Cloning is O(1) thanks to structural sharing, and a state held by a
//! caller can never observe a modification made on a derived value.

use im::{OrdMap, Vector};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::card::{Card, CardId, PlayerId, ZoneName};
use super::error::{EngineError, Result};

/// Cards in one zone, in order.
pub type Zone = Vector<Card>;

/// Player id -> zone name -> cards.
pub type Board = OrdMap<PlayerId, OrdMap<ZoneName, Zone>>;

/// Where a card currently sits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Player key.
    pub player: PlayerId,
    /// Zone within that player's area.
    pub zone: ZoneName,
    /// Position within the zone.
    pub index: usize,
}

/// Complete game state.
///
/// Deserialization goes through [`State::from_board`], so a decoded state
/// always satisfies the board invariants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawState")]
pub struct State {
    board: Board,
}

/// Wire form of a [`State`], before validation.
#[derive(Deserialize)]
struct RawState {
    board: Board,
}

impl TryFrom<RawState> for State {
    type Error = EngineError;

    fn try_from(raw: RawState) -> Result<Self> {
        Self::from_board(raw.board)
    }
}

impl State {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from a raw board, checking its invariants.
    pub fn from_board(board: Board) -> Result<Self> {
        let state = Self { board };
        state.validate()?;
        Ok(state)
    }

    /// The raw board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    // === Setup ===

    /// Place a card at the end of a zone under its owner.
    ///
    /// Fails if a card with the same id is already on the board.
    pub fn place(&mut self, zone: impl Into<ZoneName>, card: Card) -> Result<()> {
        if let Some(existing) = self.locate(&card.id) {
            return Err(EngineError::DuplicateCard {
                card: card.id,
                player: existing.player,
                zone: existing.zone,
            });
        }
        let zone = zone.into();
        self.board
            .entry(card.owner.clone())
            .or_insert_with(OrdMap::new)
            .entry(zone)
            .or_insert_with(Vector::new)
            .push_back(card);
        Ok(())
    }

    /// Builder form of [`State::place`].
    pub fn with_card(mut self, zone: impl Into<ZoneName>, card: Card) -> Result<Self> {
        self.place(zone, card)?;
        Ok(self)
    }

    /// Make sure an (empty) zone exists for a player.
    pub fn ensure_zone(&mut self, player: impl Into<PlayerId>, zone: impl Into<ZoneName>) {
        self.board
            .entry(player.into())
            .or_insert_with(OrdMap::new)
            .entry(zone.into())
            .or_insert_with(Vector::new);
    }

    /// Check the board invariants: owners match their player key and
    /// every card id appears once.
    pub fn validate(&self) -> Result<()> {
        let mut seen: FxHashMap<&CardId, (&PlayerId, &ZoneName)> = FxHashMap::default();
        for (player, zone, card) in self.iter() {
            if card.owner != *player {
                return Err(EngineError::OwnerMismatch {
                    card: card.id.clone(),
                    owner: card.owner.clone(),
                    player: player.clone(),
                });
            }
            if let Some((first_player, first_zone)) = seen.insert(&card.id, (player, zone)) {
                return Err(EngineError::DuplicateCard {
                    card: card.id.clone(),
                    player: first_player.clone(),
                    zone: first_zone.clone(),
                });
            }
        }
        Ok(())
    }

    // === Queries ===

    /// Iterate every card with its player and zone, in board order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &ZoneName, &Card)> {
        self.board.iter().flat_map(|(player, zones)| {
            zones
                .iter()
                .flat_map(move |(zone, cards)| cards.iter().map(move |card| (player, zone, card)))
        })
    }

    /// Players in board order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.board.keys()
    }

    /// A player's zone names in board order.
    pub fn zones<'a>(&'a self, player: &PlayerId) -> impl Iterator<Item = &'a ZoneName> {
        self.board.get(player).into_iter().flat_map(|zones| zones.keys())
    }

    /// Cards in a player's zone, in order.
    pub fn cards<'a>(&'a self, player: &PlayerId, zone: &ZoneName) -> impl Iterator<Item = &'a Card> {
        self.board
            .get(player)
            .and_then(|zones| zones.get(zone))
            .into_iter()
            .flat_map(|cards| cards.iter())
    }

    /// Number of cards in a player's zone (0 if the zone doesn't exist).
    #[must_use]
    pub fn zone_len(&self, player: &PlayerId, zone: &ZoneName) -> usize {
        self.board
            .get(player)
            .and_then(|zones| zones.get(zone))
            .map_or(0, Vector::len)
    }

    /// Total cards on the board.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.board
            .values()
            .flat_map(|zones| zones.values())
            .map(Vector::len)
            .sum()
    }

    /// Find where a card is.
    #[must_use]
    pub fn locate(&self, id: &CardId) -> Option<Location> {
        self.board.iter().find_map(|(player, zones)| {
            zones.iter().find_map(|(zone, cards)| {
                cards.iter().position(|card| card.id == *id).map(|index| Location {
                    player: player.clone(),
                    zone: zone.clone(),
                    index,
                })
            })
        })
    }

    /// Get a card by id.
    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.iter().find(|(_, _, card)| card.id == *id).map(|(_, _, card)| card)
    }

    /// Check if a card is on the board.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.card(id).is_some()
    }

    // === Transformations ===

    /// Return a new state with one card modified in place.
    ///
    /// `id` and `owner` are restored after `f` runs so the board invariants
    /// survive any edit. Returns `None` if the card is absent.
    #[must_use]
    pub fn update_card(&self, id: &CardId, f: impl FnOnce(&mut Card)) -> Option<Self> {
        let location = self.locate(id)?;
        let mut next = self.clone();
        let card = next
            .board
            .get_mut(&location.player)?
            .get_mut(&location.zone)?
            .get_mut(location.index)?;
        let (id, owner) = (card.id.clone(), card.owner.clone());
        f(card);
        card.id = id;
        card.owner = owner;
        Some(next)
    }

    /// Return a new state with a card moved to the end of another of its
    /// owner's zones. Returns `None` if the card is absent.
    #[must_use]
    pub fn move_card(&self, id: &CardId, destination: &ZoneName) -> Option<Self> {
        let (mut next, card) = self.take_card(id)?;
        next.board
            .entry(card.owner.clone())
            .or_insert_with(OrdMap::new)
            .entry(destination.clone())
            .or_insert_with(Vector::new)
            .push_back(card);
        Some(next)
    }

    /// Return a new state without the card. Returns `None` if it is absent.
    #[must_use]
    pub fn remove_card(&self, id: &CardId) -> Option<Self> {
        self.take_card(id).map(|(next, _)| next)
    }

    fn take_card(&self, id: &CardId) -> Option<(Self, Card)> {
        let location = self.locate(id)?;
        let mut next = self.clone();
        let card = next
            .board
            .get_mut(&location.player)?
            .get_mut(&location.zone)?
            .remove(location.index);
        Some((next, card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo_state() -> State {
        State::new()
            .with_card("zone_bar", Card::new("card_biz_001", "player_foo", "biz"))
            .unwrap()
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let state = foo_state();
        let json = serde_json::to_string(&state).unwrap();

        let decoded: State = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, state);
    }

    #[test]
    fn test_deserialize_rejects_owner_mismatch() {
        let json = r#"{"board":{"alice":{"hand":[{"id":"c1","owner":"bob","name":"x"}]}}}"#;

        let err = serde_json::from_str::<State>(json).unwrap_err();

        assert!(err.to_string().contains("owned by bob"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_duplicate_card() {
        let json = r#"{"board":{"alice":{
            "hand":[{"id":"c1","owner":"alice","name":"x"}],
            "graveyard":[{"id":"c1","owner":"alice","name":"x"}]
        }}}"#;

        let err = serde_json::from_str::<State>(json).unwrap_err();

        assert!(err.to_string().contains("c1"), "{err}");
        assert!(err.to_string().contains("already"), "{err}");
    }

    #[test]
    fn test_place_and_locate() {
        let state = foo_state();

        let location = state.locate(&CardId::new("card_biz_001")).unwrap();
        assert_eq!(location.player, PlayerId::new("player_foo"));
        assert_eq!(location.zone, ZoneName::new("zone_bar"));
        assert_eq!(location.index, 0);
        assert_eq!(state.card_count(), 1);
    }

    #[test]
    fn test_place_duplicate_rejected() {
        let mut state = foo_state();

        let err = state
            .place("other", Card::new("card_biz_001", "player_foo", "biz"))
            .unwrap_err();

        assert!(matches!(err, EngineError::DuplicateCard { .. }));
        assert_eq!(state.card_count(), 1);
    }

    #[test]
    fn test_iter_is_lexicographic() {
        let state = State::new()
            .with_card("hand", Card::new("z1", "zed", "a"))
            .unwrap()
            .with_card("hand", Card::new("a2", "alice", "b"))
            .unwrap()
            .with_card("battlefield", Card::new("a1", "alice", "c"))
            .unwrap()
            .with_card("hand", Card::new("a3", "alice", "d"))
            .unwrap();

        let order: Vec<&str> = state.iter().map(|(_, _, card)| card.id.as_str()).collect();

        assert_eq!(order, vec!["a1", "a2", "a3", "z1"]);
    }

    #[test]
    fn test_update_card_leaves_original() {
        let state = foo_state();
        let id = CardId::new("card_biz_001");

        let tapped = state.update_card(&id, |card| card.tapped = true).unwrap();

        assert!(tapped.card(&id).unwrap().tapped);
        assert!(!state.card(&id).unwrap().tapped);
    }

    #[test]
    fn test_update_card_keeps_identity() {
        let state = foo_state();
        let id = CardId::new("card_biz_001");

        let next = state
            .update_card(&id, |card| {
                card.id = CardId::new("hijacked");
                card.owner = PlayerId::new("someone_else");
            })
            .unwrap();

        assert!(next.contains(&id));
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_update_missing_card() {
        let state = foo_state();
        assert!(state.update_card(&CardId::new("ghost"), |_| {}).is_none());
    }

    #[test]
    fn test_move_card() {
        let state = foo_state();
        let id = CardId::new("card_biz_001");
        let player = PlayerId::new("player_foo");

        let moved = state.move_card(&id, &ZoneName::new("graveyard")).unwrap();

        assert_eq!(moved.locate(&id).unwrap().zone, ZoneName::new("graveyard"));
        assert_eq!(moved.zone_len(&player, &ZoneName::new("zone_bar")), 0);
        assert_eq!(state.zone_len(&player, &ZoneName::new("zone_bar")), 1);
    }

    #[test]
    fn test_remove_card() {
        let state = foo_state();
        let id = CardId::new("card_biz_001");

        let removed = state.remove_card(&id).unwrap();

        assert!(!removed.contains(&id));
        assert!(state.contains(&id));
    }

    #[test]
    fn test_validate_owner_mismatch() {
        let mut zones = OrdMap::new();
        zones.insert(ZoneName::new("hand"), Vector::unit(Card::new("c1", "alice", "x")));
        let mut board = Board::new();
        board.insert(PlayerId::new("bob"), zones);

        let err = State::from_board(board).unwrap_err();

        assert!(matches!(err, EngineError::OwnerMismatch { .. }));
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut zones = OrdMap::new();
        zones.insert(ZoneName::new("hand"), Vector::unit(Card::new("c1", "alice", "x")));
        zones.insert(ZoneName::new("deck"), Vector::unit(Card::new("c1", "alice", "x")));
        let mut board = Board::new();
        board.insert(PlayerId::new("alice"), zones);

        let err = State::from_board(board).unwrap_err();

        assert!(matches!(err, EngineError::DuplicateCard { .. }));
    }

    #[test]
    fn test_ensure_zone() {
        let mut state = State::new();
        state.ensure_zone("alice", "hand");

        assert_eq!(state.players().count(), 1);
        assert_eq!(state.zones(&PlayerId::new("alice")).count(), 1);
        assert_eq!(state.card_count(), 0);
    }

    #[test]
    fn test_state_serialization() {
        let state = foo_state();

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: State = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }
}
