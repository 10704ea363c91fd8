//! Identifiers for the processing subsystems the engine can hand control to.
//!
//! Exactly one [`StateId`] is authoritative at any instant. The set is
//! closed: adding a subsystem means adding a variant here and an entry in
//! the transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The processing subsystem currently in charge.
///
/// # Example
///
/// ```rust
/// use signflow::core::StateId;
///
/// let state = StateId::AvatarSourd;
/// assert_eq!(state.name(), "AvatarSourd");
/// assert_eq!(StateId::ALL.len(), 9);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum StateId {
    /// Entry checks on an incoming request.
    ValidationInitiale,
    /// Ethics and content-policy control.
    SystemeControleEthique,
    /// Linguistic analysis of the source text.
    Linguistes,
    /// Avatar rendering for a deaf audience (LSF output).
    AvatarSourd,
    /// Avatar rendering for a hearing audience.
    AvatarEntendant,
    /// Emotional synthesis.
    Emotionnelles,
    /// Facial and body expression synthesis.
    SystemeExpressions,
    /// Simulation of the rendered output.
    Simulatrices,
    /// Feedback review by spectators.
    Spectatrices,
}

impl StateId {
    /// Every state, in declaration order.
    pub const ALL: [StateId; 9] = [
        StateId::ValidationInitiale,
        StateId::SystemeControleEthique,
        StateId::Linguistes,
        StateId::AvatarSourd,
        StateId::AvatarEntendant,
        StateId::Emotionnelles,
        StateId::SystemeExpressions,
        StateId::Simulatrices,
        StateId::Spectatrices,
    ];

    /// Get the state's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidationInitiale => "ValidationInitiale",
            Self::SystemeControleEthique => "SystemeControleEthique",
            Self::Linguistes => "Linguistes",
            Self::AvatarSourd => "AvatarSourd",
            Self::AvatarEntendant => "AvatarEntendant",
            Self::Emotionnelles => "Emotionnelles",
            Self::SystemeExpressions => "SystemeExpressions",
            Self::Simulatrices => "Simulatrices",
            Self::Spectatrices => "Spectatrices",
        }
    }

    /// Whether this state renders an avatar.
    pub fn is_avatar(&self) -> bool {
        matches!(self, Self::AvatarSourd | Self::AvatarEntendant)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
