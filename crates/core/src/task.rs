//! Task model - the unit of planned work.

use serde::{Deserialize, Serialize};
use crate::vocabulary::{Complexity, Priority, Size, TIME_UNIT_TERMS};

/// Outcome of a structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether validation passed
    pub valid: bool,

    /// Every violated invariant
    pub errors: Vec<String>,
}

impl Validation {
    /// Build from collected errors.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Create a successful validation.
    pub fn success() -> Self {
        Self::from_errors(Vec::new())
    }
}

/// A planned task. Categorical attributes only; there is no time field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task name
    pub name: String,

    /// Priority level
    pub priority: Priority,

    /// Complexity rating
    pub complexity: Complexity,

    /// Names of tasks this one depends on (cycles are not checked)
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Optional caller-supplied identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Optional relative size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    /// Acceptance criteria
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
}

impl Task {
    /// Create a task with no dependencies.
    pub fn new(name: impl Into<String>, priority: Priority, complexity: Complexity) -> Self {
        Self {
            name: name.into(),
            priority,
            complexity,
            dependencies: Vec::new(),
            id: None,
            size: None,
            acceptance_criteria: Vec::new(),
        }
    }

    /// Set dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set relative size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Set acceptance criteria.
    pub fn with_acceptance_criteria(mut self, criteria: Vec<String>) -> Self {
        self.acceptance_criteria = criteria;
        self
    }

    /// Validate against the default time-unit terms.
    pub fn validate(&self) -> Validation {
        self.validate_with_terms(TIME_UNIT_TERMS)
    }

    /// Validate against a custom list of forbidden name terms.
    ///
    /// Priority and complexity are closed enums, so membership holds by type;
    /// what remains is the name: non-empty and free of time terms.
    pub fn validate_with_terms(&self, terms: &[&str]) -> Validation {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Task name is required".to_string());
        }

        let lower = self.name.to_lowercase();
        for term in terms {
            if lower.contains(term) {
                errors.push(format!("Forbidden time term '{}' in task name", term));
            }
        }

        Validation::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_task() {
        let task = Task::new("Setup CI", Priority::Critical, Complexity::Complex);
        assert_eq!(task.validate(), Validation::success());
    }

    #[test]
    fn test_time_term_in_name_is_rejected() {
        let task = Task::new("Sprint in 2 weeks", Priority::High, Complexity::Simple);
        let result = task.validate();
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Forbidden time term 'week' in task name".to_string()]);
    }

    #[test]
    fn test_all_errors_are_reported() {
        let task = Task::new("", Priority::Low, Complexity::Simple);
        let result = task.validate_with_terms(&["day"]);
        assert_eq!(result.errors, vec!["Task name is required".to_string()]);

        let task = Task::new("Monday monthly sync", Priority::Low, Complexity::Simple);
        let result = task.validate();
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let task = Task::new("Sprint in 2 weeks", Priority::High, Complexity::Simple);
        let before = task.clone();
        let _ = task.validate();
        assert_eq!(task, before);
    }

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let task = Task::new("Setup CI", Priority::High, Complexity::Simple);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("acceptance_criteria").is_none());

        let task = task.with_id("T-1").with_size(Size::Small);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "T-1");
        assert_eq!(json["size"], "small");
    }
}
