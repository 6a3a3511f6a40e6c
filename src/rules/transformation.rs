//! Rule transformations.
//!
//! A transformation computes the next state from applying a rule to a
//! card. It never touches its input: `State` is persistent, so each step
//! builds a new value that shares structure with the old one.

use serde::{Deserialize, Serialize};

use crate::core::{Card, State, ZoneName};

/// A pure `(State, Card) -> State` step.
///
/// The card is addressed by id. If it is not on the board the input
/// state is returned unchanged; `apply` checks presence before it ever
/// calls a transformation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transformation {
    /// Leave the state as is.
    Noop,

    // === Card Flags ===

    /// Mark the card tapped.
    Tap,

    /// Clear the tapped flag.
    Untap,

    // === Card Movement ===

    /// Move the card to the end of one of its owner's zones.
    MoveTo(ZoneName),

    /// Take the card off the board.
    Remove,

    // === Card Stats ===

    /// Add to attack.
    ModifyAttack(i32),

    /// Add to defense.
    ModifyDefense(i32),

    /// Set cost directly.
    SetCost(i32),

    // === Composite ===

    /// Run transformations in order, each seeing the previous result.
    Sequence(Vec<Transformation>),
}

impl Transformation {
    /// Create a move transformation.
    pub fn move_to(zone: impl Into<ZoneName>) -> Self {
        Self::MoveTo(zone.into())
    }

    /// Create a sequence.
    pub fn sequence(steps: impl IntoIterator<Item = Transformation>) -> Self {
        Self::Sequence(steps.into_iter().collect())
    }

    /// Append a step, flattening into an existing sequence.
    pub fn then(self, next: Transformation) -> Self {
        match self {
            Self::Sequence(mut steps) => {
                steps.push(next);
                Self::Sequence(steps)
            }
            _ => Self::Sequence(vec![self, next]),
        }
    }

    /// Compute the state after applying this step to `card`.
    #[must_use]
    pub fn transform(&self, state: &State, card: &Card) -> State {
        let id = &card.id;
        let next = match self {
            Transformation::Noop => None,
            Transformation::Tap => state.update_card(id, |c| c.tapped = true),
            Transformation::Untap => state.update_card(id, |c| c.tapped = false),
            Transformation::MoveTo(zone) => state.move_card(id, zone),
            Transformation::Remove => state.remove_card(id),
            Transformation::ModifyAttack(delta) => {
                state.update_card(id, |c| c.attack = c.attack.saturating_add(*delta))
            }
            Transformation::ModifyDefense(delta) => {
                state.update_card(id, |c| c.defense = c.defense.saturating_add(*delta))
            }
            Transformation::SetCost(cost) => state.update_card(id, |c| c.cost = *cost),
            Transformation::Sequence(steps) => Some(
                steps
                    .iter()
                    .fold(state.clone(), |current, step| step.transform(&current, card)),
            ),
        };
        next.unwrap_or_else(|| state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, PlayerId};

    fn test_state() -> (State, Card) {
        let card = Card::new("c1", "alice", "Elf").with_cost(2).with_stats(1, 1);
        let state = State::new().with_card("hand", card.clone()).unwrap();
        (state, card)
    }

    #[test]
    fn test_tap_untap() {
        let (state, card) = test_state();

        let tapped = Transformation::Tap.transform(&state, &card);
        assert!(tapped.card(&card.id).unwrap().tapped);

        let untapped = Transformation::Untap.transform(&tapped, &card);
        assert!(!untapped.card(&card.id).unwrap().tapped);

        // Input never changes
        assert!(!state.card(&card.id).unwrap().tapped);
    }

    #[test]
    fn test_move_to() {
        let (state, card) = test_state();

        let moved = Transformation::move_to("battlefield").transform(&state, &card);

        assert_eq!(moved.locate(&card.id).unwrap().zone, ZoneName::new("battlefield"));
        assert_eq!(moved.zone_len(&PlayerId::new("alice"), &ZoneName::new("hand")), 0);
    }

    #[test]
    fn test_remove() {
        let (state, card) = test_state();

        let removed = Transformation::Remove.transform(&state, &card);

        assert!(!removed.contains(&card.id));
        assert_eq!(state.card_count(), 1);
    }

    #[test]
    fn test_stat_changes() {
        let (state, card) = test_state();

        let buffed = Transformation::ModifyAttack(2)
            .then(Transformation::ModifyDefense(-1))
            .then(Transformation::SetCost(0))
            .transform(&state, &card);

        let after = buffed.card(&card.id).unwrap();
        assert_eq!(after.attack, 3);
        assert_eq!(after.defense, 0);
        assert_eq!(after.cost, 0);
    }

    #[test]
    fn test_sequence_sees_previous_steps() {
        let (state, card) = test_state();

        let steps = Transformation::sequence([
            Transformation::move_to("battlefield"),
            Transformation::Tap,
        ]);
        let next = steps.transform(&state, &card);

        let location = next.locate(&card.id).unwrap();
        assert_eq!(location.zone, ZoneName::new("battlefield"));
        assert!(next.card(&card.id).unwrap().tapped);
    }

    #[test]
    fn test_missing_target_is_noop() {
        let (state, _) = test_state();
        let ghost = Card::new(CardId::new("ghost"), "alice", "Ghost");

        assert_eq!(Transformation::Tap.transform(&state, &ghost), state);
        assert_eq!(Transformation::Remove.transform(&state, &ghost), state);
    }

    #[test]
    fn test_noop() {
        let (state, card) = test_state();
        assert_eq!(Transformation::Noop.transform(&state, &card), state);
    }
}
