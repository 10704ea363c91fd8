//! Per-kind reducers computing a candidate transition from an action.
//!
//! Reducers are pure: they read the current state and the payload and
//! return a proposal. They never touch the store, and never decide whether
//! the proposal is acceptable; that is the validator's job.

use super::error::ReduceError;
use super::{
    Action, ActionKind, Audience, HandleError, InitTranslation, ProcessSignInput, UpdateEmotion,
    UpdateExpression,
};
use crate::core::{fields, AIState, StateContext, StateId};
use crate::validation::TransitionTable;
use serde_json::{json, Value};
use std::sync::Arc;

/// Candidate transition: target state plus the fields to merge into the
/// context.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionProposal {
    pub to: StateId,
    pub patch: StateContext,
}

/// Routes each action kind to its reducer.
#[derive(Clone, Debug)]
pub struct ActionReducer {
    table: Arc<TransitionTable>,
}

impl ActionReducer {
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self { table }
    }

    pub fn reduce(&self, state: &AIState, action: &Action) -> Result<TransitionProposal, ReduceError> {
        match action {
            Action::InitTranslation(payload) => init_translation(payload),
            Action::ProcessSignInput(payload) => process_sign_input(&self.table, state, payload),
            Action::UpdateEmotion(payload) => update_emotion(state, payload),
            Action::UpdateExpression(payload) => Ok(update_expression(payload)),
            Action::HandleError(payload) => Ok(handle_error(state, payload)),
        }
    }
}

fn init_translation(payload: &InitTranslation) -> Result<TransitionProposal, ReduceError> {
    if payload.text.trim().is_empty() {
        return Err(ReduceError::InvalidPayload {
            action: ActionKind::InitTranslation,
            reason: "text is empty".to_string(),
        });
    }

    let mut patch = StateContext::new();
    patch.insert(fields::INPUT, Value::String(payload.text.clone()));
    patch.insert(
        fields::SOURCE_LANGUAGE,
        Value::String(payload.source_language.clone()),
    );
    patch.insert(
        fields::TARGET_LANGUAGE,
        Value::String(payload.target_language.clone()),
    );

    Ok(TransitionProposal {
        to: StateId::Linguistes,
        patch,
    })
}

fn process_sign_input(
    table: &TransitionTable,
    state: &AIState,
    payload: &ProcessSignInput,
) -> Result<TransitionProposal, ReduceError> {
    let from = state.current_state;
    let reachable = |target: StateId| table.reachable_from(from).any(|s| s == target);

    let to = if payload.target_audience == Audience::Deaf && reachable(StateId::AvatarSourd) {
        StateId::AvatarSourd
    } else if reachable(StateId::AvatarEntendant) {
        StateId::AvatarEntendant
    } else {
        return Err(ReduceError::Unroutable {
            from,
            action: ActionKind::ProcessSignInput,
            reason: "no avatar state is reachable".to_string(),
        });
    };

    let mut patch = payload.context.clone().unwrap_or_default();
    if let Some(sign_data) = &payload.sign_data {
        patch.insert(fields::LSF_DATA, sign_data.clone());
    }

    Ok(TransitionProposal { to, patch })
}

fn update_emotion(state: &AIState, payload: &UpdateEmotion) -> Result<TransitionProposal, ReduceError> {
    if !payload.intensity.is_finite() || !(0.0..=1.0).contains(&payload.intensity) {
        return Err(ReduceError::InvalidPayload {
            action: ActionKind::UpdateEmotion,
            reason: format!("intensity {} is outside [0, 1]", payload.intensity),
        });
    }

    let mut patch = payload.context.clone().unwrap_or_default();
    patch.insert(fields::EMOTION, Value::String(payload.emotion.clone()));
    patch.insert(fields::INTENSITY, json!(payload.intensity));

    Ok(TransitionProposal {
        to: state.current_state,
        patch,
    })
}

fn update_expression(payload: &UpdateExpression) -> TransitionProposal {
    let mut patch = StateContext::new();
    patch.insert(
        fields::EXPRESSIONS,
        json!({
            "type": payload.expression_type,
            "details": payload.details,
        }),
    );

    TransitionProposal {
        to: StateId::SystemeExpressions,
        patch,
    }
}

fn handle_error(state: &AIState, payload: &HandleError) -> TransitionProposal {
    let mut patch = payload.context.clone().unwrap_or_default();
    patch.insert(
        fields::LAST_ERROR,
        json!({
            "code": payload.error_code,
            "message": payload.error_message,
        }),
    );

    TransitionProposal {
        to: state.current_state,
        patch,
    }
}
