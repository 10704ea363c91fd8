//! Property-based tests for dispatch.
//!
//! These tests use proptest to drive the store with random action
//! sequences and check the invariants that must hold after every step.

use proptest::prelude::*;
use serde_json::json;
use signflow::actions::{
    Action, Audience, HandleError, InitTranslation, ProcessSignInput, UpdateEmotion,
    UpdateExpression,
};
use signflow::core::StateId;
use signflow::store::{OrchestratorConfig, StateStore};
use signflow::validation::TransitionTable;

prop_compose! {
    fn arbitrary_state()(index in 0..StateId::ALL.len()) -> StateId {
        StateId::ALL[index]
    }
}

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(|text| Action::InitTranslation(InitTranslation {
            text,
            source_language: "fr".to_string(),
            target_language: "lsf".to_string(),
        })),
        (any::<bool>(), any::<bool>()).prop_map(|(deaf, with_data)| {
            Action::ProcessSignInput(ProcessSignInput {
                sign_data: with_data.then(|| json!({"shape": "B"})),
                target_audience: if deaf { Audience::Deaf } else { Audience::Hearing },
                context: None,
            })
        }),
        (-0.5f64..1.5).prop_map(|intensity| Action::UpdateEmotion(UpdateEmotion {
            emotion: "joy".to_string(),
            intensity,
            context: None,
        })),
        Just(Action::UpdateExpression(UpdateExpression {
            expression_type: "surprise".to_string(),
            details: json!({}),
        })),
        Just(Action::HandleError(HandleError {
            error_code: "E1".to_string(),
            error_message: "boom".to_string(),
            context: None,
        })),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn accepted_transitions_are_in_the_table(
        initial in arbitrary_state(),
        actions in prop::collection::vec(arbitrary_action(), 1..20)
    ) {
        let table = TransitionTable::standard();
        let store = StateStore::builder().initial(initial).build().unwrap();

        runtime().block_on(async {
            for action in actions {
                if let Ok(state) = store.dispatch(action).await {
                    let last = state.history.last().unwrap();
                    prop_assert!(table.allows(last.from, last.to));
                    prop_assert_eq!(last.to, state.current_state);
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn rejected_dispatch_leaves_state_unchanged(
        initial in arbitrary_state(),
        actions in prop::collection::vec(arbitrary_action(), 1..20)
    ) {
        let store = StateStore::builder().initial(initial).build().unwrap();

        runtime().block_on(async {
            for action in actions {
                let before = store.get_state().await;
                match store.dispatch(action).await {
                    Ok(state) => {
                        prop_assert_eq!(state.history.total_recorded(), before.history.total_recorded() + 1);
                    }
                    Err(_) => {
                        prop_assert_eq!(store.get_state().await, before);
                    }
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn history_chains_within_capacity(
        capacity in 1usize..6,
        actions in prop::collection::vec(arbitrary_action(), 1..30)
    ) {
        let store = StateStore::builder()
            .config(OrchestratorConfig {
                initial_state: StateId::Linguistes,
                history_capacity: capacity,
                ..OrchestratorConfig::default()
            })
            .build()
            .unwrap();

        runtime().block_on(async {
            for action in actions {
                let _ = store.dispatch(action).await;
            }
            Ok::<(), TestCaseError>(())
        })?;

        let state = runtime().block_on(store.get_state());
        let records: Vec<_> = state.history.transitions().collect();
        prop_assert!(records.len() <= capacity);
        for pair in records.windows(2) {
            prop_assert_eq!(pair[1].sequence, pair[0].sequence + 1);
            prop_assert_eq!(pair[1].from, pair[0].to);
        }
        if let Some(last) = records.last() {
            prop_assert_eq!(last.sequence, state.history.total_recorded());
        }
    }

    #[test]
    fn checkpoint_of_any_run_restores(
        actions in prop::collection::vec(arbitrary_action(), 0..15)
    ) {
        let store = StateStore::builder().initial(StateId::Linguistes).build().unwrap();
        let rt = runtime();

        let checkpoint = rt.block_on(async {
            for action in actions {
                let _ = store.dispatch(action).await;
            }
            store.checkpoint().await
        });

        let restored = StateStore::builder().restore(checkpoint.clone()).build().unwrap();
        prop_assert_eq!(rt.block_on(restored.get_state()), checkpoint.snapshot);
    }
}
