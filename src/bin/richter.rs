//! Demo session.
//!
//! Builds a two-player board and a small rule set, runs two batches
//! through the pipeline (one legal, one rejected) and logs the results.
//!
//! Usage: `richter [config.json]` with `RUST_LOG=info` (or `debug`).

use std::sync::Arc;

use log::{error, info};
use richter::*;

fn rules() -> Result<RuleSet> {
    RuleSet::new([
        Rule::new(
            "play",
            Condition::in_zone("hand").and(Condition::zone_size_below("battlefield", 5)),
            Transformation::move_to("battlefield"),
        ),
        Rule::new(
            "attack",
            Condition::in_zone("battlefield")
                .and(Condition::Untapped)
                .and(Condition::AttackAtLeast(1)),
            Transformation::Tap,
        ),
    ])
}

fn board() -> Result<State> {
    State::new()
        .with_card("hand", Card::new("foo_001", "player_foo", "foo").with_cost(1).with_stats(2, 2))?
        .with_card("hand", Card::new("bar_001", "player_bar", "bar").with_cost(2).with_stats(3, 1))?
        .with_card("battlefield", Card::new("bar_002", "player_bar", "wall").with_stats(0, 4))
}

fn config() -> Result<PipelineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| EngineError::InvalidConfig(format!("{path}: {e}")))?;
            PipelineConfig::from_json(&json).map_err(|e| EngineError::InvalidConfig(format!("{path}: {e}")))
        }
        None => Ok(PipelineConfig::default()),
    }
}

async fn session() -> Result<()> {
    let pipeline = Pipeline::new(board()?, Arc::new(rules()?), FirstPerArrival, config()?)?;
    let mut handle = pipeline.spawn();

    let foo = Card::new("foo_001", "player_foo", "foo");
    let wall = Card::new("bar_002", "player_bar", "wall");

    // foo is played; the wall has no legal action, so its batch is empty.
    handle.submit(vec![foo.clone(), wall]).await?;
    // Unknown card: rejected without touching the state.
    handle.submit(vec![Card::new("ghost", "player_foo", "ghost")]).await?;
    handle.close();

    while let Some(outcome) = handle.next_outcome().await {
        match outcome {
            Outcome::Applied(update) => {
                info!("batch {} applied: {} actions", update.batch, update.applied.len());
                for action in update.applied.iter() {
                    info!("  {}", action);
                }
                info!("now legal: {} actions", update.analysis.len());
            }
            Outcome::Rejected(rejection) => {
                error!("batch {} rejected: {}", rejection.batch, rejection.error);
            }
        }
    }

    let state = handle.join().await?;
    info!("final board: {} cards, foo at {:?}", state.card_count(), state.locate(&foo.id));
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = session().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
