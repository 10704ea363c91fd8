//! Sign Translation Pipeline
//!
//! This demo walks one request through the orchestration engine.
//!
//! Key concepts:
//! - Actions are reduced, validated, then committed
//! - Rejected actions leave the state untouched
//! - Observers see every committed snapshot
//! - Checkpoints capture the state for a later restore
//!
//! Run with: RUST_LOG=debug cargo run --example sign_translation

use async_trait::async_trait;
use serde_json::json;
use signflow::actions::{
    Action, Audience, InitTranslation, ProcessSignInput, UpdateEmotion, UpdateExpression,
};
use signflow::core::AIState;
use signflow::observers::{Observer, ObserverError};
use signflow::persistence::MemoryPersistence;
use signflow::store::StateStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct FeedbackCollector;

#[async_trait]
impl Observer for FeedbackCollector {
    fn name(&self) -> &str {
        "feedback"
    }

    async fn update(&self, state: &AIState) -> Result<(), ObserverError> {
        println!(
            "  [feedback] now in {} ({} transitions)",
            state.current_state,
            state.history.total_recorded()
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Sign Translation Pipeline ===\n");

    let store = StateStore::builder()
        .observer(Arc::new(FeedbackCollector))
        .persistence(Arc::new(MemoryPersistence::new()))
        .build()?;

    println!("Step 1: start a translation");
    store
        .dispatch(Action::InitTranslation(InitTranslation {
            text: "Bonjour, comment allez-vous ?".to_string(),
            source_language: "fr".to_string(),
            target_language: "lsf".to_string(),
        }))
        .await?;

    println!("\nStep 2: sign input without data is refused");
    let refused = store
        .dispatch(Action::ProcessSignInput(ProcessSignInput {
            sign_data: None,
            target_audience: Audience::Deaf,
            context: None,
        }))
        .await;
    if let Err(err) = refused {
        println!("  refused: {err}");
    }

    println!("\nStep 3: route sign data to the deaf avatar");
    store
        .dispatch(Action::ProcessSignInput(ProcessSignInput {
            sign_data: Some(json!({"shape": "B", "movement": "arc"})),
            target_audience: Audience::Deaf,
            context: None,
        }))
        .await?;

    println!("\nStep 4: set an emotion, then hand over to expressions");
    store
        .dispatch(Action::UpdateEmotion(UpdateEmotion {
            emotion: "joy".to_string(),
            intensity: 0.6,
            context: None,
        }))
        .await?;
    let state = store
        .dispatch(Action::UpdateExpression(UpdateExpression {
            expression_type: "smile".to_string(),
            details: json!({"mouth": "open"}),
        }))
        .await?;

    let path: Vec<String> = state.history.path().iter().map(|s| s.to_string()).collect();
    println!("\nPath: {}", path.join(" -> "));

    let checkpoint = store.persist_checkpoint().await?;
    println!("Checkpoint {} written", checkpoint.id);

    let restored = StateStore::builder().restore(checkpoint).build()?;
    println!("Restored store is in {}", restored.current_state().await);

    println!("\n=== Demo Complete ===");
    Ok(())
}
