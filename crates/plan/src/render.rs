//! Plan encodings.

use planguard_core::{OutputFormat, Priority};

use crate::document::PlanDocument;
use crate::error::Result;

/// Render `doc` in `format`.
pub fn render(doc: &PlanDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(doc)?),
        OutputFormat::Markdown => Ok(to_markdown(doc)),
    }
}

/// Heading-structured rendering: priority buckets, then milestones.
pub fn to_markdown(doc: &PlanDocument) -> String {
    let mut lines = vec![format!("# {}", doc.plan_type.title()), String::new()];

    if let Some(tasks) = &doc.prioritized_tasks {
        for priority in Priority::ALL {
            let bucket = tasks.bucket(priority);
            if bucket.is_empty() {
                continue;
            }

            lines.push(format!("## {} Priority", priority.as_str().to_uppercase()));
            for task in bucket {
                lines.push(format!(
                    "- **{}** [Complexity: {}]",
                    task.name,
                    task.complexity.as_str().to_uppercase()
                ));
                if !task.dependencies.is_empty() {
                    lines.push(format!("  - Dependencies: {}", task.dependencies.join(", ")));
                }
            }
            lines.push(String::new());
        }
    }

    if !doc.milestones.is_empty() {
        lines.push("## Milestones".to_string());
        for milestone in &doc.milestones {
            lines.push(format!(
                "### {} (Priority: {})",
                milestone.name,
                milestone.priority.as_str().to_uppercase()
            ));
            lines.push("**Success Criteria:**".to_string());
            lines.extend(milestone.success_criteria.iter().map(|c| format!("- {}", c)));
            if !milestone.prerequisites.is_empty() {
                lines.push("**Prerequisites:**".to_string());
                lines.extend(milestone.prerequisites.iter().map(|p| format!("- {}", p)));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_core::{Complexity, Milestone, PlanType, Task};
    use std::collections::BTreeMap;

    fn sample() -> PlanDocument {
        let tasks = vec![
            Task::new("Setup CI", Priority::Critical, Complexity::Complex),
            Task::new("Write docs", Priority::Low, Complexity::Simple)
                .with_dependencies(vec!["Setup CI".to_string()]),
        ];
        let milestones = vec![Milestone::new(
            "Foundation",
            Priority::High,
            vec!["CI green".to_string()],
        )
        .with_prerequisites(vec!["Kickoff".to_string()])];
        PlanDocument::assemble(PlanType::TaskList, &tasks, &milestones, &BTreeMap::new())
    }

    #[test]
    fn test_markdown_layout() {
        let expected = "\
# Task List

## CRITICAL Priority
- **Setup CI** [Complexity: COMPLEX]

## LOW Priority
- **Write docs** [Complexity: SIMPLE]
  - Dependencies: Setup CI

## Milestones
### Foundation (Priority: HIGH)
**Success Criteria:**
- CI green
**Prerequisites:**
- Kickoff
";
        assert_eq!(to_markdown(&sample()), expected);
    }

    #[test]
    fn test_json_and_yaml_carry_the_same_document() {
        let doc = sample();
        let json = render(&doc, OutputFormat::Json).unwrap();
        let yaml = render(&doc, OutputFormat::Yaml).unwrap();

        let from_json: PlanDocument = serde_json::from_str(&json).unwrap();
        let from_yaml: PlanDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(from_json, doc);
        assert_eq!(from_yaml, doc);
        assert!(yaml.starts_with("type: task_list\n"));
    }
}
