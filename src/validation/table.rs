//! The transition table: which states are reachable from which, and what
//! context a state needs before it can be entered.
//!
//! One table is built at startup and shared through an `Arc` by the reducer
//! and the validator.

use super::guard::Guard;
use crate::core::{fields, StateContext, StateId};
use std::collections::{BTreeMap, BTreeSet};

/// Entry condition for a target state: the context fields that must be
/// present, plus optional named guards checked once those fields are there.
///
/// # Example
///
/// ```rust
/// use signflow::core::StateContext;
/// use signflow::validation::Precondition;
/// use serde_json::json;
///
/// let precondition = Precondition::requires(["emotion", "expressions"]);
///
/// let mut context = StateContext::new();
/// context.insert("expressions", json!({"type": "surprise"}));
///
/// assert_eq!(precondition.missing(&context), vec!["emotion".to_string()]);
/// assert!(!precondition.is_satisfied(&context));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Precondition {
    required: Vec<String>,
    guards: Vec<Guard>,
}

impl Precondition {
    pub fn requires<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            required: fields.into_iter().map(Into::into).collect(),
            guards: Vec::new(),
        }
    }

    /// Add a named guard.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Required fields absent from `context`, in declaration order.
    pub fn missing(&self, context: &StateContext) -> Vec<String> {
        self.required
            .iter()
            .filter(|field| !context.has(field))
            .cloned()
            .collect()
    }

    /// Names of the guards that do not hold for `context`, in declaration
    /// order.
    pub fn failed_guards(&self, context: &StateContext) -> Vec<String> {
        self.guards
            .iter()
            .filter(|guard| !guard.check(context))
            .map(|guard| guard.name().to_string())
            .collect()
    }

    pub fn is_satisfied(&self, context: &StateContext) -> bool {
        self.required.iter().all(|field| context.has(field))
            && self.guards.iter().all(|guard| guard.check(context))
    }
}

/// Static reachability and entry conditions.
///
/// Every state implicitly reaches itself: context-only actions stay in place
/// and are always allowed by the table.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    edges: BTreeMap<StateId, BTreeSet<StateId>>,
    preconditions: BTreeMap<StateId, Precondition>,
}

impl TransitionTable {
    /// Empty table: only self-transitions are allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `targets` as reachable from `from`, extending any existing
    /// declaration.
    pub fn allow<I>(mut self, from: StateId, targets: I) -> Self
    where
        I: IntoIterator<Item = StateId>,
    {
        self.edges.entry(from).or_default().extend(targets);
        self
    }

    /// Set the entry precondition of `target`, replacing any previous one.
    pub fn require(mut self, target: StateId, precondition: Precondition) -> Self {
        self.preconditions.insert(target, precondition);
        self
    }

    /// The sign-translation pipeline.
    pub fn standard() -> Self {
        use StateId::*;

        Self::new()
            .allow(ValidationInitiale, [SystemeControleEthique, Linguistes])
            .allow(
                SystemeControleEthique,
                [ValidationInitiale, Linguistes, Spectatrices],
            )
            .allow(
                Linguistes,
                [AvatarSourd, AvatarEntendant, Emotionnelles, SystemeControleEthique],
            )
            .allow(
                AvatarSourd,
                [SystemeExpressions, Emotionnelles, Linguistes, Spectatrices],
            )
            .allow(
                AvatarEntendant,
                [SystemeExpressions, Emotionnelles, Linguistes, Spectatrices],
            )
            .allow(
                Emotionnelles,
                [SystemeExpressions, AvatarSourd, AvatarEntendant],
            )
            .allow(
                SystemeExpressions,
                [AvatarSourd, AvatarEntendant, Simulatrices, Spectatrices],
            )
            .allow(Simulatrices, [Spectatrices, Linguistes])
            .allow(Spectatrices, [ValidationInitiale, Linguistes])
            .require(
                Linguistes,
                Precondition::requires([
                    fields::INPUT,
                    fields::SOURCE_LANGUAGE,
                    fields::TARGET_LANGUAGE,
                ]),
            )
            .require(AvatarSourd, Precondition::requires([fields::LSF_DATA]))
            .require(AvatarEntendant, Precondition::requires([fields::LSF_DATA]))
            .require(Emotionnelles, Precondition::requires([fields::EMOTION]))
            .require(
                SystemeExpressions,
                Precondition::requires([fields::EMOTION, fields::EXPRESSIONS]),
            )
    }

    /// States declared reachable from `from`, excluding the implicit
    /// self-transition.
    pub fn reachable_from(&self, from: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.edges.get(&from).into_iter().flatten().copied()
    }

    pub fn allows(&self, from: StateId, to: StateId) -> bool {
        from == to || self.edges.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    pub fn precondition(&self, target: StateId) -> Option<&Precondition> {
        self.preconditions.get(&target)
    }
}
