//! Legality analysis: every (rule, card) pair whose condition holds.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::core::{Action, CardId, State};
use crate::rules::{ConditionContext, RuleSet};

/// The legal actions for a state, in board order.
///
/// Order: player id, then zone name, then position in zone, then rule
/// order in the rule set. Recomputed on demand, never stored in state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub actions: Vec<Action>,
}

impl Analysis {
    /// Number of legal actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate actions in analysis order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Actions targeting a card, in analysis order.
    pub fn for_card<'a>(&'a self, id: &'a CardId) -> impl Iterator<Item = &'a Action> {
        self.actions.iter().filter(move |a| a.target == *id)
    }

    /// Actions binding a rule, in analysis order.
    pub fn for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Action> {
        self.actions.iter().filter(move |a| a.rule.name == rule)
    }

    /// Check if a (rule, card) pair is legal.
    #[must_use]
    pub fn contains(&self, rule: &str, id: &CardId) -> bool {
        self.actions.iter().any(|a| a.rule.name == rule && a.target == *id)
    }
}

impl IntoIterator for Analysis {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

/// Find every legal action in `state` under `rules`.
///
/// Never fails; an empty analysis means nothing applies.
#[must_use]
pub fn analyze(state: &State, rules: &RuleSet) -> Analysis {
    let mut actions = Vec::new();

    for (player, zone, card) in state.iter() {
        let ctx = ConditionContext::new(state, card, player, zone);
        for rule in rules {
            if rule.allows(&ctx) {
                trace!("legal: {} -> {} ({}/{})", rule.name, card.id, player, zone);
                actions.push(Action::new(rule.clone(), card.clone(), player.clone(), zone.clone()));
            }
        }
    }

    debug!(
        "analyzed {} cards against {} rules: {} legal actions",
        state.card_count(),
        rules.len(),
        actions.len()
    );
    Analysis { actions }
}
