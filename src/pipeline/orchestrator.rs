//! The pipeline orchestrator: sole owner of the authoritative state.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle --batch arrives--> Evaluating --analysis done--> Applying
//! Applying --success--> Idle (state replaced, Update published)
//! Applying --failure--> Idle (state kept, Rejection published)
//! ```
//!
//! The task owns its `State` outright and only ever hands out snapshots
//! (O(1) persistent clones), so there is exactly one writer by
//! construction. It stops when its inbound queue is closed and drained,
//! or when cancelled; stopping drops its senders, closing the outbound
//! queues.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use super::handle::PipelineHandle;
use super::selector::ActionSelector;
use crate::core::{Action, Card, EngineError, PipelineConfig, Result, State};
use crate::engine::{analyze, apply, Analysis};
use crate::rules::RuleSet;

/// What the orchestrator is doing right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the next batch.
    #[default]
    Idle,
    /// Checking arrivals, analyzing and selecting actions.
    Evaluating,
    /// Applying the selected batch.
    Applying,
}

/// Published after a batch applies successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    /// Batch sequence number, from 1 in arrival order.
    pub batch: u64,
    /// The new authoritative state.
    pub state: State,
    /// Legal actions in the new state.
    pub analysis: Analysis,
    /// The actions that were applied, in order.
    pub applied: Vec<Action>,
}

/// Published when a batch is rejected. The state did not change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Batch sequence number, from 1 in arrival order.
    pub batch: u64,
    /// Why the batch was rejected.
    pub error: EngineError,
}

/// Channel ends owned by a running pipeline task.
pub(crate) struct Ports {
    pub inbound: mpsc::Receiver<Vec<Card>>,
    pub updates: mpsc::Sender<Update>,
    pub rejections: mpsc::Sender<Rejection>,
    pub phase: watch::Sender<Phase>,
    pub cancel: watch::Receiver<bool>,
}

/// A game session's orchestrator, before it is spawned.
pub struct Pipeline {
    state: State,
    rules: Arc<RuleSet>,
    selector: Box<dyn ActionSelector>,
    config: PipelineConfig,
    processed: u64,
}

impl Pipeline {
    /// Create a pipeline over an initial state.
    ///
    /// Fails if the state breaks the board invariants.
    pub fn new(
        state: State,
        rules: Arc<RuleSet>,
        selector: impl ActionSelector + 'static,
        config: PipelineConfig,
    ) -> Result<Self> {
        state.validate()?;
        Ok(Self {
            state,
            rules,
            selector: Box::new(selector),
            config,
            processed: 0,
        })
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Spawn the orchestrator on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    #[must_use]
    pub fn spawn(self) -> PipelineHandle {
        let (inbound_capacity, outbound_capacity, error_capacity) = self.config.clamped();
        let (inbound_tx, inbound_rx) = mpsc::channel(inbound_capacity);
        let (updates_tx, updates_rx) = mpsc::channel(outbound_capacity);
        let (rejections_tx, rejections_rx) = mpsc::channel(error_capacity);
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let ports = Ports {
            inbound: inbound_rx,
            updates: updates_tx,
            rejections: rejections_tx,
            phase: phase_tx,
            cancel: cancel_rx,
        };
        let task = tokio::spawn(self.run(ports));

        PipelineHandle::new(inbound_tx, updates_rx, rejections_rx, phase_rx, cancel_tx, task)
    }

    /// Process batches until the inbound queue closes or cancellation.
    /// Returns the final state.
    pub(crate) async fn run(mut self, mut ports: Ports) -> State {
        info!(
            "pipeline started: {} cards, {} rules",
            self.state.card_count(),
            self.rules.len()
        );

        loop {
            let arrivals = tokio::select! {
                biased;
                _ = cancelled(&mut ports.cancel) => {
                    info!("pipeline cancelled after {} batches", self.processed);
                    break;
                }
                next = ports.inbound.recv() => match next {
                    Some(arrivals) => arrivals,
                    None => {
                        info!("inbound closed after {} batches", self.processed);
                        break;
                    }
                },
            };

            self.processed += 1;
            let batch = self.processed;
            let outcome = self.process(batch, &arrivals, &ports.phase);
            ports.phase.send_replace(Phase::Idle);

            let delivered = match outcome {
                Ok(update) => publish(&ports.updates, update, &mut ports.cancel).await,
                Err(error) => {
                    warn!("batch {} rejected: {}", batch, error);
                    publish(&ports.rejections, Rejection { batch, error }, &mut ports.cancel).await
                }
            };
            if !delivered {
                info!("pipeline cancelled while publishing batch {}", batch);
                break;
            }
        }

        self.state
    }

    /// Evaluate and apply one batch. Replaces the state only on success.
    fn process(&mut self, batch: u64, arrivals: &[Card], phase: &watch::Sender<Phase>) -> Result<Update> {
        phase.send_replace(Phase::Evaluating);
        debug!("batch {}: {} cards arrived", batch, arrivals.len());

        if let Some(missing) = arrivals.iter().find(|card| !self.state.contains(&card.id)) {
            return Err(EngineError::TargetNotFound {
                target: missing.id.clone(),
                rule: None,
            });
        }

        let analysis = analyze(&self.state, &self.rules);
        let chosen = self.selector.select(&self.state, arrivals, &analysis);
        debug!("batch {}: {} of {} legal actions selected", batch, chosen.len(), analysis.len());

        phase.send_replace(Phase::Applying);
        let next = apply(&self.state, &chosen)?;
        self.state = next;

        Ok(Update {
            batch,
            state: self.state.clone(),
            analysis: analyze(&self.state, &self.rules),
            applied: chosen,
        })
    }
}

/// Resolves once cancellation is requested. Never resolves if the
/// handle is gone without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|cancelled| *cancelled).await.map(|_| ()).is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

/// Send on a bounded queue, waiting for room. A dropped receiver is
/// logged and ignored. Returns false if cancelled while waiting.
async fn publish<T>(tx: &mpsc::Sender<T>, item: T, cancel: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        biased;
        _ = cancelled(cancel) => false,
        sent = tx.send(item) => {
            if sent.is_err() {
                warn!("outbound receiver dropped; discarding result");
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::pipeline::FirstPerArrival;
    use crate::rules::{Condition, Rule, Transformation};

    fn rules() -> Arc<RuleSet> {
        Arc::new(RuleSet::new([Rule::new("mayBeTapped", Condition::Untapped, Transformation::Tap)]).unwrap())
    }

    fn state() -> State {
        State::new()
            .with_card("zone_bar", Card::new("card_biz_001", "player_foo", "biz"))
            .unwrap()
    }

    fn biz() -> Card {
        Card::new("card_biz_001", "player_foo", "biz")
    }

    /// A `FirstPerArrival` that records the phase it was called in.
    fn recording(phase: watch::Receiver<Phase>, seen: Arc<Mutex<Vec<Phase>>>) -> impl ActionSelector {
        move |state: &State, arrivals: &[Card], analysis: &Analysis| -> Vec<Action> {
            seen.lock().unwrap().push(*phase.borrow());
            FirstPerArrival.select(state, arrivals, analysis)
        }
    }

    #[test]
    fn test_process_success_replaces_state() {
        let (phase, observer) = watch::channel(Phase::Idle);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let selector = recording(observer, Arc::clone(&seen));
        let mut pipeline = Pipeline::new(state(), rules(), selector, PipelineConfig::default()).unwrap();

        let update = pipeline.process(1, &[biz()], &phase).unwrap();

        assert_eq!(update.applied.len(), 1);
        assert!(update.analysis.is_empty());
        assert_eq!(&update.state, pipeline.state());
        // Selection runs while evaluating; apply leaves the phase at Applying.
        assert_eq!(*seen.lock().unwrap(), vec![Phase::Evaluating]);
        assert_eq!(*phase.borrow(), Phase::Applying);
    }

    #[test]
    fn test_process_failure_keeps_state() {
        let mut pipeline = Pipeline::new(state(), rules(), FirstPerArrival, PipelineConfig::default()).unwrap();
        let (phase, _) = watch::channel(Phase::Idle);
        let before = pipeline.state().clone();

        let err = pipeline
            .process(1, &[Card::new("ghost", "player_foo", "ghost")], &phase)
            .unwrap_err();

        assert!(matches!(err, EngineError::TargetNotFound { rule: None, .. }));
        assert_eq!(pipeline.state(), &before);
        assert_eq!(*phase.borrow(), Phase::Evaluating);
    }

    #[tokio::test]
    async fn test_run_phase_lifecycle() {
        let (inbound_tx, inbound) = mpsc::channel(4);
        let (updates, mut updates_rx) = mpsc::channel(4);
        let (rejections, _rejections_rx) = mpsc::channel(4);
        let (phase, mut observer) = watch::channel(Phase::Idle);
        let (_cancel_tx, cancel) = watch::channel(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let selector = recording(observer.clone(), Arc::clone(&seen));
        let pipeline = Pipeline::new(state(), rules(), selector, PipelineConfig::default()).unwrap();
        let ports = Ports {
            inbound,
            updates,
            rejections,
            phase,
            cancel,
        };
        let task = tokio::spawn(pipeline.run(ports));

        inbound_tx.send(vec![biz()]).await.unwrap();
        let update = updates_rx.recv().await.unwrap();

        assert_eq!(update.batch, 1);
        assert_eq!(*seen.lock().unwrap(), vec![Phase::Evaluating]);
        // The phase moved and is back to Idle by the time the update is out.
        assert!(observer.has_changed().unwrap());
        assert_eq!(*observer.borrow_and_update(), Phase::Idle);

        drop(inbound_tx);
        let final_state = task.await.unwrap();
        assert_eq!(final_state, update.state);
    }
}
