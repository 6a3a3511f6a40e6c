//! Action selection: which legal actions a batch actually applies.
//!
//! The pipeline doesn't decide policy. It hands the current state, the
//! arrived cards and the analysis to an `ActionSelector` and applies
//! whatever ordered batch comes back.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

use crate::core::{Action, Card, CardId, State};
use crate::engine::Analysis;

/// Decision layer plugged into the pipeline.
///
/// The returned actions are applied in order as one atomic batch. They
/// need not come from `analysis`; `apply` re-validates everything.
///
/// Closures implement this trait too; annotate their argument types.
pub trait ActionSelector: Send {
    fn select(&mut self, state: &State, arrivals: &[Card], analysis: &Analysis) -> Vec<Action>;
}

impl<F> ActionSelector for F
where
    F: FnMut(&State, &[Card], &Analysis) -> Vec<Action> + Send,
{
    fn select(&mut self, state: &State, arrivals: &[Card], analysis: &Analysis) -> Vec<Action> {
        self(state, arrivals, analysis)
    }
}

/// Arrived card ids, first occurrence order, duplicates dropped.
fn arrival_ids(arrivals: &[Card]) -> Vec<&CardId> {
    let mut seen = FxHashSet::default();
    arrivals
        .iter()
        .map(|card| &card.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// For each arrived card, the first legal action in analysis order.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstPerArrival;

impl ActionSelector for FirstPerArrival {
    fn select(&mut self, _state: &State, arrivals: &[Card], analysis: &Analysis) -> Vec<Action> {
        arrival_ids(arrivals)
            .into_iter()
            .filter_map(|id| analysis.for_card(id).next().cloned())
            .collect()
    }
}

/// Every legal action targeting an arrived card, in analysis order.
///
/// Two legal actions on the same card can conflict (both require the
/// card untapped and both tap it); such a batch is rejected as a whole.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllForArrivals;

impl ActionSelector for AllForArrivals {
    fn select(&mut self, _state: &State, arrivals: &[Card], analysis: &Analysis) -> Vec<Action> {
        let ids: FxHashSet<&CardId> = arrivals.iter().map(|card| &card.id).collect();
        analysis
            .iter()
            .filter(|action| ids.contains(&action.target))
            .cloned()
            .collect()
    }
}

/// For each arrived card, one legal action picked at random.
///
/// Seeded ChaCha8, so the same seed and inputs give the same picks.
#[derive(Clone, Debug)]
pub struct RandomPerArrival {
    rng: ChaCha8Rng,
}

impl RandomPerArrival {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for RandomPerArrival {
    fn select(&mut self, _state: &State, arrivals: &[Card], analysis: &Analysis) -> Vec<Action> {
        let mut chosen = Vec::new();
        for id in arrival_ids(arrivals) {
            let candidates: Vec<&Action> = analysis.for_card(id).collect();
            if let Some(action) = candidates.choose(&mut self.rng) {
                chosen.push((*action).clone());
            }
        }
        chosen
    }
}
