//! Declarative plan input and one-call constructors.

use planguard_core::{OutputFormat, PlanType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::builder::PlanBuilder;
use crate::error::Result;

/// Complexity used when a task spec omits one.
pub const DEFAULT_COMPLEXITY: &str = "moderate";

/// A task as plain strings, parsed when added to a builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task name
    pub name: String,
    /// Priority name
    pub priority: String,
    /// Complexity name, defaults to `moderate`
    #[serde(default)]
    pub complexity: Option<String>,
    /// Dependency names
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl TaskSpec {
    /// Create a spec with no dependencies.
    pub fn new(name: impl Into<String>, priority: impl Into<String>, complexity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: priority.into(),
            complexity: Some(complexity.into()),
            dependencies: Vec::new(),
        }
    }

    fn add_to(&self, builder: &mut PlanBuilder, name: &str) -> Result<()> {
        let complexity = self.complexity.as_deref().unwrap_or(DEFAULT_COMPLEXITY);
        builder.add_task_with_dependencies(name, &self.priority, complexity, self.dependencies.as_slice())?;
        Ok(())
    }
}

/// A milestone as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneSpec {
    /// Milestone name
    pub name: String,
    /// Priority name
    pub priority: String,
    /// Success criteria
    #[serde(default)]
    pub success_criteria: Vec<String>,
    /// Prerequisite milestone names
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// A roadmap phase: a milestone plus the tasks that reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Phase milestone
    #[serde(flatten)]
    pub milestone: MilestoneSpec,
    /// Phase tasks
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// A whole plan, as read from a YAML or JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    /// Plan type name
    #[serde(rename = "type")]
    pub plan_type: String,
    /// Metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Tasks
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
    /// Milestones
    #[serde(default)]
    pub milestones: Vec<MilestoneSpec>,
}

impl PlanSpec {
    /// Parse a YAML spec.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON spec.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PlanBuilder {
    /// Build up a plan from a spec. Fails on the first rejected entry.
    pub fn from_spec(spec: &PlanSpec) -> Result<Self> {
        let mut builder = PlanBuilder::for_type(&spec.plan_type)?;

        for (key, value) in &spec.metadata {
            builder.set_metadata(key.as_str(), value.clone())?;
        }
        for task in &spec.tasks {
            task.add_to(&mut builder, &task.name)?;
        }
        for m in &spec.milestones {
            builder.add_milestone(&m.name, &m.priority, m.success_criteria.as_slice(), m.prerequisites.as_slice())?;
        }

        Ok(builder)
    }
}

/// A task-list plan as YAML.
pub fn create_task_list(tasks: &[TaskSpec]) -> Result<String> {
    let mut builder = PlanBuilder::new(PlanType::TaskList);
    for task in tasks {
        task.add_to(&mut builder, &task.name)?;
    }
    builder.build(OutputFormat::Yaml)
}

/// A roadmap as YAML: one milestone per phase, phase tasks prefixed with
/// their 1-based phase number.
pub fn create_roadmap(phases: &[PhaseSpec]) -> Result<String> {
    let mut builder = PlanBuilder::new(PlanType::Roadmap);
    for (idx, phase) in phases.iter().enumerate() {
        let m = &phase.milestone;
        builder.add_milestone(&m.name, &m.priority, m.success_criteria.as_slice(), m.prerequisites.as_slice())?;

        for task in &phase.tasks {
            let name = format!("Phase {}: {}", idx + 1, task.name);
            task.add_to(&mut builder, &name)?;
        }
    }
    builder.build(OutputFormat::Yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PlanDocument;
    use crate::error::PlanError;
    use planguard_core::{Complexity, Priority};

    #[test]
    fn test_create_task_list() {
        let yaml = create_task_list(&[
            TaskSpec::new("Setup CI", "critical", "complex"),
            TaskSpec::new("Write docs", "low", "simple"),
        ])
        .unwrap();

        let doc: PlanDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(doc.plan_type, PlanType::TaskList);
        let tasks = doc.prioritized_tasks.unwrap();
        assert_eq!(tasks.bucket(Priority::Critical)[0].name, "Setup CI");
        assert_eq!(tasks.bucket(Priority::Low)[0].name, "Write docs");
    }

    #[test]
    fn test_create_roadmap_prefixes_phase_tasks() {
        let phases: Vec<PhaseSpec> = serde_yaml::from_str(
            r#"
- name: Foundation
  priority: critical
  success_criteria: [CI green]
  tasks:
    - name: Setup CI
      priority: critical
- name: Delivery
  priority: high
  success_criteria: [Release published]
  prerequisites: [Foundation]
  tasks:
    - name: Package release
      priority: high
      complexity: simple
      dependencies: ["Phase 1: Setup CI"]
"#,
        )
        .unwrap();

        let doc: PlanDocument = serde_yaml::from_str(&create_roadmap(&phases).unwrap()).unwrap();
        let milestones: Vec<&str> = doc.milestones.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(milestones, vec!["Foundation", "Delivery"]);
        assert_eq!(doc.milestones[1].prerequisites, vec!["Foundation".to_string()]);

        let tasks = doc.prioritized_tasks.unwrap();
        assert_eq!(tasks.critical[0].name, "Phase 1: Setup CI");
        assert_eq!(tasks.critical[0].complexity, Complexity::Moderate);
        assert_eq!(tasks.high[0].name, "Phase 2: Package release");
        assert!(doc.compliance.uses_sequencing);
    }

    #[test]
    fn test_roadmap_phase_without_criteria_fails() {
        let phases = vec![PhaseSpec {
            milestone: MilestoneSpec {
                name: "Foundation".to_string(),
                priority: "high".to_string(),
                success_criteria: Vec::new(),
                prerequisites: Vec::new(),
            },
            tasks: Vec::new(),
        }];
        assert!(matches!(create_roadmap(&phases), Err(PlanError::InvalidEntity { .. })));
    }

    #[test]
    fn test_from_spec() {
        let spec = PlanSpec::from_yaml_str(
            r#"
type: sprint
metadata:
  team: platform
tasks:
  - name: Parser
    priority: high
    complexity: complex
milestones:
  - name: Beta
    priority: medium
    success_criteria: [Parser handles the corpus]
"#,
        )
        .unwrap();

        let mut builder = PlanBuilder::from_spec(&spec).unwrap();
        let markdown = builder.build(OutputFormat::Markdown).unwrap();
        assert!(markdown.starts_with("# Sprint\n"));
        assert!(markdown.contains("- **Parser** [Complexity: COMPLEX]"));
        assert!(markdown.contains("### Beta (Priority: MEDIUM)"));
        assert_eq!(builder.metadata()["team"], "platform");
    }

    #[test]
    fn test_from_spec_rejects_bad_input() {
        let spec = PlanSpec::from_json_str(r#"{"type": "gantt"}"#).unwrap();
        assert!(matches!(PlanBuilder::from_spec(&spec), Err(PlanError::UnsupportedPlanType(_))));

        let spec = PlanSpec::from_json_str(
            r#"{"type": "task_list", "metadata": {"window": "two weeks"}}"#,
        )
        .unwrap();
        assert!(matches!(PlanBuilder::from_spec(&spec), Err(PlanError::ForbiddenMetadata { .. })));
    }

    #[test]
    fn test_from_spec_screens_nested_metadata_and_milestones() {
        let spec = PlanSpec::from_yaml_str(
            r#"
type: roadmap
metadata:
  release:
    train: [alpha, "beta in 2 weeks"]
"#,
        )
        .unwrap();
        let err = PlanBuilder::from_spec(&spec).unwrap_err();
        assert!(matches!(err, PlanError::ForbiddenMetadata { ref key, ref term } if key == "release" && term == "week"));

        let spec = PlanSpec::from_yaml_str(
            r#"
type: roadmap
milestones:
  - name: Launch
    priority: high
    success_criteria: [Ship by end of month]
"#,
        )
        .unwrap();
        assert!(matches!(
            PlanBuilder::from_spec(&spec),
            Err(PlanError::InvalidEntity { entity: "milestone", .. })
        ));
    }
}
