//! Atomic batch application.

use log::debug;

use crate::core::{Action, EngineError, Result, State};
use crate::rules::ConditionContext;

/// Apply an ordered batch of actions to a state, all or nothing.
///
/// Each action is checked against the state produced by the actions
/// before it, using the target's *current* card and location (looked up
/// by id), not the snapshot stored in the action. The first action whose
/// target is missing or whose condition fails rejects the whole batch.
///
/// `state` is borrowed and never modified: on `Err` the caller still
/// holds the original, and no intermediate state escapes. An empty batch
/// returns a copy of the input.
pub fn apply(state: &State, actions: &[Action]) -> Result<State> {
    let mut current = state.clone();

    for (step, action) in actions.iter().enumerate() {
        let rule = &action.rule;
        let (location, card) = match (current.locate(&action.target), current.card(&action.target)) {
            (Some(location), Some(card)) => (location, card),
            _ => {
                debug!("rejecting batch at action {}: {} is not on the board", step, action.target);
                return Err(EngineError::TargetNotFound {
                    target: action.target.clone(),
                    rule: Some(rule.name.clone()),
                });
            }
        };

        if !rule.allows(&ConditionContext::at(&current, card, &location)) {
            debug!("rejecting batch at action {}: {} does not hold", step, action);
            return Err(EngineError::RuleConditionFailed {
                rule: rule.name.clone(),
                target: action.target.clone(),
                step,
            });
        }

        let next = rule.transform(&current, card);
        current = next;
    }

    debug!("applied {} actions", actions.len());
    Ok(current)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{Card, CardId};
    use crate::rules::{Condition, Rule, Transformation};

    fn may_be_tapped() -> Arc<Rule> {
        Arc::new(Rule::new("mayBeTapped", Condition::Untapped, Transformation::Tap))
    }

    fn foo_state() -> State {
        State::new()
            .with_card("zone_bar", Card::new("card_biz_001", "player_foo", "biz"))
            .unwrap()
    }

    fn biz() -> CardId {
        CardId::new("card_biz_001")
    }

    #[test]
    fn test_apply_taps_card() {
        let state = foo_state();
        let action = Action::targeting(may_be_tapped(), &state, &biz()).unwrap();

        let next = apply(&state, &[action]).unwrap();

        assert!(next.card(&biz()).unwrap().tapped);
        assert!(!state.card(&biz()).unwrap().tapped);
    }

    #[test]
    fn test_apply_empty_batch() {
        let state = foo_state();
        assert_eq!(apply(&state, &[]).unwrap(), state);
    }

    #[test]
    fn test_apply_sees_earlier_actions() {
        let state = foo_state();
        let tap = Action::targeting(may_be_tapped(), &state, &biz()).unwrap();

        let err = apply(&state, &[tap.clone(), tap]).unwrap_err();

        assert_eq!(
            err,
            EngineError::RuleConditionFailed {
                rule: "mayBeTapped".to_string(),
                target: biz(),
                step: 1,
            }
        );
    }

    #[test]
    fn test_apply_missing_target() {
        let state = foo_state();
        let mut action = Action::targeting(may_be_tapped(), &state, &biz()).unwrap();
        action.target = CardId::new("ghost");

        let err = apply(&state, &[action]).unwrap_err();

        assert!(matches!(err, EngineError::TargetNotFound { rule: Some(_), .. }));
    }

    #[test]
    fn test_apply_target_removed_mid_batch() {
        let state = foo_state();
        let exile = Arc::new(Rule::new("exile", Condition::Always, Transformation::Remove));
        let batch = [
            Action::targeting(exile, &state, &biz()).unwrap(),
            Action::targeting(may_be_tapped(), &state, &biz()).unwrap(),
        ];

        let err = apply(&state, &batch).unwrap_err();

        assert_eq!(
            err,
            EngineError::TargetNotFound {
                target: biz(),
                rule: Some("mayBeTapped".to_string()),
            }
        );
    }

    #[test]
    fn test_apply_uses_current_location() {
        let state = foo_state();
        let play = Arc::new(Rule::new(
            "play",
            Condition::in_zone("zone_bar"),
            Transformation::move_to("battlefield"),
        ));
        let attack = Arc::new(Rule::new(
            "attack",
            Condition::in_zone("battlefield").and(Condition::Untapped),
            Transformation::Tap,
        ));
        // Both actions are built from the original snapshot (zone_bar).
        let batch = [
            Action::targeting(play, &state, &biz()).unwrap(),
            Action::targeting(attack, &state, &biz()).unwrap(),
        ];

        let next = apply(&state, &batch).unwrap();

        let card = next.card(&biz()).unwrap();
        assert!(card.tapped);
        assert_eq!(next.locate(&biz()).unwrap().zone.as_str(), "battlefield");
    }
}
