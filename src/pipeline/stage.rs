//! Standalone analysis stage.
//!
//! Downstream consumers that receive state snapshots (for example from
//! [`Update`](super::Update)s) can run legality analysis off the
//! orchestrator's task by feeding them through this stage.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::State;
use crate::engine::{analyze, Analysis};
use crate::rules::RuleSet;

/// Spawn a task that analyzes every state it receives, in order, until
/// its inbound queue closes or its outbound receiver is dropped.
pub fn spawn_analysis_stage(
    rules: Arc<RuleSet>,
    mut states: mpsc::Receiver<State>,
    analyses: mpsc::Sender<Analysis>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut analyzed = 0usize;
        while let Some(state) = states.recv().await {
            let analysis = analyze(&state, &rules);
            if analyses.send(analysis).await.is_err() {
                warn!("analysis receiver dropped after {} states", analyzed);
                return;
            }
            analyzed += 1;
        }
        debug!("analysis stage stopped after {} states", analyzed);
    })
}
