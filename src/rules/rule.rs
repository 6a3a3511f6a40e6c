//! Rules and rule sets.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::condition::{Condition, ConditionContext};
use super::transformation::Transformation;
use crate::core::{Card, EngineError, Result, State};

/// A named guard plus the transformation it permits.
///
/// Rules are immutable configuration. They are identified by name, which
/// is what errors and tests report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique name within a rule set.
    pub name: String,

    /// When the rule may apply.
    pub condition: Condition,

    /// What applying it does.
    pub transformation: Transformation,
}

impl Rule {
    /// Create a new rule.
    pub fn new(name: impl Into<String>, condition: Condition, transformation: Transformation) -> Self {
        Self {
            name: name.into(),
            condition,
            transformation,
        }
    }

    /// Check the rule's condition.
    #[must_use]
    pub fn allows(&self, ctx: &ConditionContext) -> bool {
        self.condition.holds(ctx)
    }

    /// Apply the rule's transformation.
    #[must_use]
    pub fn transform(&self, state: &State, card: &Card) -> State {
        self.transformation.transform(state, card)
    }
}

/// An ordered, read-only collection of uniquely named rules.
///
/// Wrap in an `Arc` to share across tasks; nothing mutates a rule set
/// after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl RuleSet {
    /// Build a rule set, keeping the given order.
    ///
    /// Fails if two rules share a name.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let rules: Vec<Arc<Rule>> = rules.into_iter().map(Arc::new).collect();
        let mut names = FxHashSet::default();
        for rule in &rules {
            if !names.insert(rule.name.as_str()) {
                return Err(EngineError::DuplicateRule(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// Parse a rule set from a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("rule set: {e}")))?;
        Self::new(rules)
    }

    /// Iterate rules in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter()
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Rule>> {
        self.rules.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Arc<Rule>;
    type IntoIter = std::slice::Iter<'a, Arc<Rule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
