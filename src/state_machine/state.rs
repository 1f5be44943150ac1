//! Session state types

use std::time::Duration;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created but no welcome reply yet (also where a failed start leaves it)
    #[default]
    Uninitialized,

    /// Welcome reply received, accepting user turns
    Active,

    /// The persona confirmed a correct guess (terminal)
    Concluded { persona_id: String },
}

impl SessionState {
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[cfg(test)]
    pub fn is_concluded(&self) -> bool {
        matches!(self, Self::Concluded { .. })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Concluded { .. } => "concluded",
        }
    }
}

/// Fixed facts about a session that transitions need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub persona_id: String,
    /// How long the caller shows the final reply before the reveal
    pub reveal_delay: Duration,
}

impl SessionContext {
    pub fn new(persona_id: impl Into<String>, reveal_delay: Duration) -> Self {
        Self {
            persona_id: persona_id.into(),
            reveal_delay,
        }
    }
}
