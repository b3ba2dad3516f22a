//! Per-patient alert state.

/// Whether a patient currently has an open alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertState {
    /// No alert is open. Every patient starts here.
    #[default]
    Resolved,
    /// An alert has been triggered and not yet resolved.
    Active,
}

impl AlertState {
    /// The data string emitted when a patient enters this state.
    pub fn transition_data(&self) -> &'static str {
        match self {
            AlertState::Resolved => "resolved",
            AlertState::Active => "triggered",
        }
    }

    /// Returns true if the alert is open.
    pub fn is_active(&self) -> bool {
        matches!(self, AlertState::Active)
    }

    /// The state reached from this one on a successful transition.
    pub fn flipped(&self) -> Self {
        match self {
            AlertState::Resolved => AlertState::Active,
            AlertState::Active => AlertState::Resolved,
        }
    }
}

impl From<bool> for AlertState {
    fn from(active: bool) -> Self {
        if active {
            AlertState::Active
        } else {
            AlertState::Resolved
        }
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertState::Resolved => write!(f, "resolved"),
            AlertState::Active => write!(f, "active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_resolved() {
        assert_eq!(AlertState::default(), AlertState::Resolved);
        assert!(!AlertState::default().is_active());
    }

    #[test]
    fn transition_data_names_the_entered_state() {
        assert_eq!(AlertState::Active.transition_data(), "triggered");
        assert_eq!(AlertState::Resolved.transition_data(), "resolved");
    }

    #[test]
    fn flipped_alternates() {
        assert_eq!(AlertState::Resolved.flipped(), AlertState::Active);
        assert_eq!(AlertState::Active.flipped(), AlertState::Resolved);
    }

    #[test]
    fn from_bool() {
        assert_eq!(AlertState::from(true), AlertState::Active);
        assert_eq!(AlertState::from(false), AlertState::Resolved);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&AlertState::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
