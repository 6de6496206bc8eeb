//! Structured plan document.

use planguard_core::{Complexity, Milestone, PlanType, Priority, Size, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Document format version.
pub const PLAN_VERSION: &str = "1.0";

/// Compliance marker attached to every built plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compliance {
    /// Always false: builder input cannot carry time estimates
    pub uses_time_estimates: bool,
    /// Always true
    pub uses_priority_system: bool,
    /// Any milestone, or any task with dependencies
    pub uses_sequencing: bool,
    /// Every entity passed validation on the way in
    pub validated: bool,
}

/// A task as it appears in a priority bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Task name
    pub name: String,
    /// Complexity rating
    pub complexity: Complexity,
    /// Dependency names
    pub dependencies: Vec<String>,
    /// Caller-supplied identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Relative size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Acceptance criteria
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
}

impl From<&Task> for TaskEntry {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            complexity: task.complexity,
            dependencies: task.dependencies.clone(),
            id: task.id.clone(),
            size: task.size,
            acceptance_criteria: task.acceptance_criteria.clone(),
        }
    }
}

/// Tasks grouped by priority, insertion order kept within each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedTasks {
    /// Critical bucket
    pub critical: Vec<TaskEntry>,
    /// High bucket
    pub high: Vec<TaskEntry>,
    /// Medium bucket
    pub medium: Vec<TaskEntry>,
    /// Low bucket
    pub low: Vec<TaskEntry>,
}

impl PrioritizedTasks {
    /// Group `tasks` by priority.
    pub fn group(tasks: &[Task]) -> Self {
        let mut grouped = Self::default();
        for task in tasks {
            grouped.bucket_mut(task.priority).push(TaskEntry::from(task));
        }
        grouped
    }

    /// The bucket for `priority`.
    pub fn bucket(&self, priority: Priority) -> &[TaskEntry] {
        match priority {
            Priority::Critical => &self.critical,
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut Vec<TaskEntry> {
        match priority {
            Priority::Critical => &mut self.critical,
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }

    /// Total tasks across buckets.
    pub fn len(&self) -> usize {
        Priority::ALL.iter().map(|p| self.bucket(*p).len()).sum()
    }

    /// No tasks in any bucket.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A built plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Plan type
    #[serde(rename = "type")]
    pub plan_type: PlanType,

    /// Format version
    pub version: String,

    /// Compliance marker
    pub compliance: Compliance,

    /// Free-form metadata, sorted by key
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,

    /// Present when the plan has tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prioritized_tasks: Option<PrioritizedTasks>,

    /// Milestones in insertion order, omitted when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,
}

impl PlanDocument {
    /// Assemble a document from validated parts.
    pub fn assemble(
        plan_type: PlanType,
        tasks: &[Task],
        milestones: &[Milestone],
        metadata: &BTreeMap<String, Value>,
    ) -> Self {
        let uses_sequencing =
            !milestones.is_empty() || tasks.iter().any(|task| !task.dependencies.is_empty());

        Self {
            plan_type,
            version: PLAN_VERSION.to_string(),
            compliance: Compliance {
                uses_time_estimates: false,
                uses_priority_system: true,
                uses_sequencing,
                validated: true,
            },
            metadata: metadata.clone(),
            prioritized_tasks: (!tasks.is_empty()).then(|| PrioritizedTasks::group(tasks)),
            milestones: milestones.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_keeps_insertion_order() {
        let tasks = vec![
            Task::new("A", Priority::Low, Complexity::Simple),
            Task::new("B", Priority::Critical, Complexity::Complex),
            Task::new("C", Priority::Low, Complexity::Moderate),
        ];
        let grouped = PrioritizedTasks::group(&tasks);

        assert_eq!(grouped.critical.len(), 1);
        let low: Vec<&str> = grouped.low.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(low, vec!["A", "C"]);
        assert!(grouped.high.is_empty());
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn test_empty_plan_has_no_optional_sections() {
        let doc = PlanDocument::assemble(PlanType::Sprint, &[], &[], &BTreeMap::new());
        assert!(doc.prioritized_tasks.is_none());
        assert!(!doc.compliance.uses_sequencing);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "sprint");
        assert_eq!(json["version"], "1.0");
        assert!(json.get("prioritized_tasks").is_none());
        assert!(json.get("milestones").is_none());
        assert!(json["metadata"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_dependencies_mark_sequencing() {
        let tasks = vec![
            Task::new("Schema", Priority::High, Complexity::Simple),
            Task::new("Migrations", Priority::High, Complexity::Moderate)
                .with_dependencies(vec!["Schema".to_string()]),
        ];
        let doc = PlanDocument::assemble(PlanType::TaskList, &tasks, &[], &BTreeMap::new());
        assert!(doc.compliance.uses_sequencing);
        assert!(!doc.compliance.uses_time_estimates);
    }
}
