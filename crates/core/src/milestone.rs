//! Milestone model.

use serde::{Deserialize, Serialize};
use crate::task::Validation;
use crate::vocabulary::{Priority, TIME_UNIT_TERMS};

/// A milestone is reached when all of its success criteria hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Milestone name
    pub name: String,

    /// Priority level
    pub priority: Priority,

    /// Success criteria (at least one)
    pub success_criteria: Vec<String>,

    /// Names of milestones that come first
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Milestone {
    /// Create a milestone.
    pub fn new(name: impl Into<String>, priority: Priority, success_criteria: Vec<String>) -> Self {
        Self {
            name: name.into(),
            priority,
            success_criteria,
            prerequisites: Vec::new(),
        }
    }

    /// Set prerequisites.
    pub fn with_prerequisites(mut self, prerequisites: Vec<String>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    /// Validate required fields and keep time units out of the name.
    pub fn validate(&self) -> Validation {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Milestone name is required".to_string());
        }

        let lower = self.name.to_lowercase();
        for term in TIME_UNIT_TERMS {
            if lower.contains(term) {
                errors.push(format!("Forbidden time term '{}' in milestone name", term));
            }
        }

        if self.success_criteria.is_empty() {
            errors.push("Success criteria are required".to_string());
        }

        Validation::from_errors(errors)
    }
}
