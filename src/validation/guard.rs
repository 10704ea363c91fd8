//! Named guard predicates over the proposed context.
//!
//! A guard refines an entry precondition with a check that a list of
//! required fields cannot express, such as a relation between two fields.
//! Guards are pure: same context, same answer.

use crate::core::StateContext;
use std::fmt;
use std::sync::Arc;

/// Pure, named predicate that must hold before a state can be entered.
///
/// Guards run only once every required field of their precondition is
/// present, so a predicate may assume those fields exist.
///
/// # Example
///
/// ```rust
/// use signflow::core::StateContext;
/// use signflow::validation::Guard;
/// use serde_json::json;
///
/// let distinct = Guard::new("distinct_languages", |ctx: &StateContext| {
///     ctx.get("sourceLanguage") != ctx.get("targetLanguage")
/// });
///
/// let mut context = StateContext::new();
/// context.insert("sourceLanguage", json!("fr"));
/// context.insert("targetLanguage", json!("fr"));
///
/// assert_eq!(distinct.name(), "distinct_languages");
/// assert!(!distinct.check(&context));
/// ```
#[derive(Clone)]
pub struct Guard {
    name: String,
    predicate: Arc<dyn Fn(&StateContext) -> bool + Send + Sync>,
}

impl Guard {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&StateContext) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Name reported when the guard fails.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, context: &StateContext) -> bool {
        (self.predicate)(context)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("name", &self.name).finish()
    }
}
