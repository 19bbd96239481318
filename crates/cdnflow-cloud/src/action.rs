//! Action types describing what a stack will create

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a planned action for a stack resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Logical id of the resource
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "AWS::S3::Bucket")
    pub resource_type: String,

    /// Description of the action
    pub description: String,

    /// Additional details about the action
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    fn new(
        id: impl Into<String>,
        action_type: ActionType,
        resource_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action_type,
            resource_type: resource_type.into(),
            description: description.into(),
            details: HashMap::new(),
        }
    }

    pub fn create(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, ActionType::Create, resource_type, description)
    }

    pub fn reference(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, ActionType::Reference, resource_type, description)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource owned by the stack
    Create,
    /// Use an existing resource without managing it
    Reference,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Reference => write!(f, "reference"),
        }
    }
}

/// Plan containing all actions of a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan creates anything
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type == ActionType::Create);
        Self {
            actions,
            has_changes,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            reference: self.actions_by_type(ActionType::Reference).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub reference: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} referenced",
            self.create, self.reference
        )
    }
}
