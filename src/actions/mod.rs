//! Actions: the external requests the engine reacts to.
//!
//! Every [`Action`] variant carries its own payload type and is handled by
//! exactly one reducer function, so adding a kind is a compile error until
//! it is routed.

mod error;
mod reducer;

pub use error::ReduceError;
pub use reducer::{ActionReducer, TransitionProposal};

use crate::core::StateContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminant of an [`Action`], recorded as the trigger of a transition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    InitTranslation,
    ProcessSignInput,
    UpdateEmotion,
    UpdateExpression,
    HandleError,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitTranslation => "InitTranslation",
            Self::ProcessSignInput => "ProcessSignInput",
            Self::UpdateEmotion => "UpdateEmotion",
            Self::UpdateExpression => "UpdateExpression",
            Self::HandleError => "HandleError",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who the rendered signs are meant for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Deaf,
    Hearing,
}

/// Start translating a text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitTranslation {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Route incoming sign data to the avatar matching the audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSignInput {
    #[serde(default)]
    pub sign_data: Option<Value>,
    pub target_audience: Audience,
    #[serde(default)]
    pub context: Option<StateContext>,
}

/// Set the current emotion without changing subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmotion {
    pub emotion: String,
    pub intensity: f64,
    #[serde(default)]
    pub context: Option<StateContext>,
}

/// Hand control to the expression system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpression {
    pub expression_type: String,
    pub details: Value,
}

/// Record an error reported by a subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleError {
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub context: Option<StateContext>,
}

/// A request to transition or update context.
///
/// # Example
///
/// ```rust
/// use signflow::actions::{Action, ActionKind, Audience, ProcessSignInput};
/// use serde_json::json;
///
/// let action = Action::ProcessSignInput(ProcessSignInput {
///     sign_data: Some(json!({"shape": "B"})),
///     target_audience: Audience::Deaf,
///     context: None,
/// });
/// assert_eq!(action.kind(), ActionKind::ProcessSignInput);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum Action {
    InitTranslation(InitTranslation),
    ProcessSignInput(ProcessSignInput),
    UpdateEmotion(UpdateEmotion),
    UpdateExpression(UpdateExpression),
    HandleError(HandleError),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::InitTranslation(_) => ActionKind::InitTranslation,
            Self::ProcessSignInput(_) => ActionKind::ProcessSignInput,
            Self::UpdateEmotion(_) => ActionKind::UpdateEmotion,
            Self::UpdateExpression(_) => ActionKind::UpdateExpression,
            Self::HandleError(_) => ActionKind::HandleError,
        }
    }
}
