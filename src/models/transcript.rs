use serde::{Deserialize, Serialize};

/// One role-tagged utterance in a call transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Free-form speaker label (e.g. "agent", "customer")
    pub role: String,
    /// What was said
    pub utterance: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            utterance: utterance.into(),
        }
    }

    /// Render as a single prompt line
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.role, self.utterance)
    }
}

/// Chronologically ordered turns of a call
pub type Transcript = Vec<Turn>;
