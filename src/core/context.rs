//! Auxiliary key/value data carried alongside the current state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known context field names.
pub mod fields {
    /// Source text submitted for translation.
    pub const INPUT: &str = "input";
    /// Language of the source text.
    pub const SOURCE_LANGUAGE: &str = "sourceLanguage";
    /// Language to translate into.
    pub const TARGET_LANGUAGE: &str = "targetLanguage";
    /// Sign data (handshape, movement, ...) to render.
    pub const LSF_DATA: &str = "lsfData";
    /// Current emotion label.
    pub const EMOTION: &str = "emotion";
    /// Emotion intensity in `[0, 1]`.
    pub const INTENSITY: &str = "intensity";
    /// Expression requested from the expression system.
    pub const EXPRESSIONS: &str = "expressions";
    /// Last error reported through a `HandleError` action.
    pub const LAST_ERROR: &str = "lastError";
}

/// Named fields mapped to opaque JSON values.
///
/// Merging is shallow: keys present in a patch overwrite, every other key is
/// kept as is.
///
/// # Example
///
/// ```rust
/// use signflow::core::StateContext;
/// use serde_json::json;
///
/// let mut context = StateContext::new();
/// context.insert("emotion", json!("joy"));
///
/// let mut patch = StateContext::new();
/// patch.insert("intensity", json!(0.4));
///
/// let merged = context.merged(&patch);
/// assert!(merged.has("emotion"));
/// assert!(merged.has("intensity"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateContext {
    fields: BTreeMap<String, Value>,
}

impl StateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A field is present when it exists and is not JSON `null`.
    pub fn has(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Shallow-merge `patch` into this context in place.
    pub fn merge(&mut self, patch: &StateContext) {
        for (key, value) in &patch.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Shallow-merge `patch` into a copy of this context.
    pub fn merged(&self, patch: &StateContext) -> StateContext {
        let mut next = self.clone();
        next.merge(patch);
        next
    }
}
