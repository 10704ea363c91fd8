//! Transition validation.
//!
//! A proposed transition is accepted only if the target is reachable from
//! the current state and the target's entry precondition holds against the
//! proposed context. Preconditions live in the [`TransitionTable`] rather
//! than in the reducers, so they can be tested on their own.

mod error;
mod guard;
mod table;
mod validator;

pub use error::Rejection;
pub use guard::Guard;
pub use table::{Precondition, TransitionTable};
pub use validator::TransitionValidator;
