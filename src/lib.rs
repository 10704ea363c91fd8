//! Signflow: state orchestration for sign-language translation subsystems.
//!
//! Signflow decides which processing subsystem (linguistic analysis, deaf or
//! hearing avatar rendering, emotion and expression synthesis, feedback
//! review) is in charge at any moment. Every change goes through one
//! protocol: action, validation, commit, notify.
//!
//! # Core Concepts
//!
//! - **State**: the authoritative subsystem, a [`StateId`]
//! - **Actions**: tagged requests reduced to a candidate transition
//! - **Validation**: table membership, then entry preconditions
//! - **Store**: serialized commits and bounded history
//! - **Observers**: post-commit fan-out, isolated from each other
//!
//! # Example
//!
//! ```rust
//! use signflow::actions::{Action, Audience, ProcessSignInput};
//! use signflow::core::StateId;
//! use signflow::store::StateStore;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = StateStore::builder()
//!     .initial(StateId::Linguistes)
//!     .build()
//!     .unwrap();
//!
//! let state = store
//!     .dispatch(Action::ProcessSignInput(ProcessSignInput {
//!         sign_data: Some(json!({"shape": "B"})),
//!         target_audience: Audience::Deaf,
//!         context: None,
//!     }))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(state.current_state, StateId::AvatarSourd);
//! # });
//! ```

pub mod actions;
pub mod checkpoint;
pub mod core;
pub mod observers;
pub mod persistence;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use actions::{Action, ActionKind};
pub use crate::core::{AIState, StateContext, StateId, StateTransition};
pub use store::{DispatchError, StateStore};
