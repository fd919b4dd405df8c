//! Outcome of an ensure step

use serde::{Deserialize, Serialize};

/// What an ensure step did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A new resource was created
    Create,
    /// An existing resource was patched
    Update,
    /// A resource was removed
    Delete,
    /// No changes needed
    NoOp,
}

impl ActionType {
    /// Whether the step wrote to the store
    pub fn is_write(&self) -> bool {
        !matches!(self, ActionType::NoOp)
    }

    /// Combine the outcomes of two writes into the one to report
    pub fn and(self, other: ActionType) -> ActionType {
        match (self, other) {
            (ActionType::NoOp, next) => next,
            (current, _) => current,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}
