//! Caller-side handle to a spawned pipeline.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::orchestrator::{Phase, Rejection, Update};
use crate::core::{Card, EngineError, Result, State};

/// Either kind of published result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A batch applied.
    Applied(Update),
    /// A batch was rejected.
    Rejected(Rejection),
}

/// Inbound and outbound queue ends plus control over a running pipeline.
///
/// The authoritative state stays inside the task; callers only ever see
/// the snapshots carried by [`Update`]s and the final state from
/// [`PipelineHandle::join`].
#[derive(Debug)]
pub struct PipelineHandle {
    inbound: Option<mpsc::Sender<Vec<Card>>>,
    updates: mpsc::Receiver<Update>,
    rejections: mpsc::Receiver<Rejection>,
    phase: watch::Receiver<Phase>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<State>,
}

impl PipelineHandle {
    pub(crate) fn new(
        inbound: mpsc::Sender<Vec<Card>>,
        updates: mpsc::Receiver<Update>,
        rejections: mpsc::Receiver<Rejection>,
        phase: watch::Receiver<Phase>,
        cancel: watch::Sender<bool>,
        task: JoinHandle<State>,
    ) -> Self {
        Self {
            inbound: Some(inbound),
            updates,
            rejections,
            phase,
            cancel,
            task,
        }
    }

    /// Queue a batch of arrived cards, waiting for room if the inbound
    /// queue is full.
    pub async fn submit(&self, batch: Vec<Card>) -> Result<()> {
        let inbound = self.inbound.as_ref().ok_or(EngineError::PipelineClosed)?;
        inbound.send(batch).await.map_err(|_| EngineError::PipelineClosed)
    }

    /// A clone of the inbound sender, for an ingestion task.
    ///
    /// The pipeline only stops on its own once every sender is dropped.
    #[must_use]
    pub fn sender(&self) -> Option<mpsc::Sender<Vec<Card>>> {
        self.inbound.clone()
    }

    /// Drop this handle's inbound sender. The pipeline drains what is
    /// queued and stops once no other senders remain.
    pub fn close(&mut self) {
        self.inbound = None;
    }

    /// Ask the pipeline to stop. Queued batches are discarded; a batch
    /// being applied finishes first.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Next successful update, or `None` once the pipeline stopped and
    /// the queue is empty.
    pub async fn next_update(&mut self) -> Option<Update> {
        self.updates.recv().await
    }

    /// Next rejected batch, or `None` once the pipeline stopped and the
    /// queue is empty.
    pub async fn next_rejection(&mut self) -> Option<Rejection> {
        self.rejections.recv().await
    }

    /// Next result from either outbound queue, or `None` once the pipeline
    /// stopped and both are empty.
    ///
    /// Reading only one queue can stall the pipeline once the other fills
    /// up; consumers that want both should use this.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        tokio::select! {
            Some(update) = self.updates.recv() => Some(Outcome::Applied(update)),
            Some(rejection) = self.rejections.recv() => Some(Outcome::Rejected(rejection)),
            else => None,
        }
    }

    /// Current phase of the orchestrator.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Close inbound, discard unread outbound results and wait for the
    /// pipeline to stop. Returns the final authoritative state.
    pub async fn join(self) -> Result<State> {
        let Self {
            inbound,
            updates,
            rejections,
            phase,
            cancel,
            task,
        } = self;
        drop((inbound, updates, rejections, phase));

        let result = task
            .await
            .map_err(|e| EngineError::Internal(format!("pipeline task failed: {e}")));
        drop(cancel);
        result
    }
}
