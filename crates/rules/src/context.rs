//! Project-context document: non-goal alignment and structural checks.
//!
//! The document is optional. A missing or malformed file never fails a
//! validation pass; alignment checking simply has nothing to check.

use planguard_core::{Severity, Violation};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

/// Default location of the project-context document.
pub const DEFAULT_CONTEXT_PATH: &str = "_project/PROJECT_CONTEXT.yaml";

/// Rule name reported for non-goal matches.
pub const NON_GOAL_RULE: &str = "non_goal_violation";

const REQUIRED_SECTIONS: &[&str] = &[
    "project",
    "repositories",
    "conventions",
    "development_guidelines",
    "quick_reference",
];
const REQUIRED_PROJECT_FIELDS: &[&str] = &["name", "type", "description", "initialized_at"];
const PROJECT_TYPES: &[&str] = &[
    "single-repository",
    "single-repository-focus",
    "multi-repository",
    "monorepo",
];
const REPOSITORY_FIELDS: &[&str] = &["path", "description", "technology_stack", "status", "has_git"];
const REPOSITORY_STATUSES: &[&str] = &["active", "inactive", "archived", "maintenance"];
const GOAL_FIELDS: &[&str] = &["primary_objective", "success_metrics", "constraints"];

/// The parts of the project-context document the validator reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectContext {
    /// Project section
    #[serde(default)]
    pub project: ProjectSection,
}

/// `project` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSection {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,

    /// Goals
    #[serde(default)]
    pub goals: Goals,
}

/// `project.goals` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Goals {
    /// Primary objective
    #[serde(default)]
    pub primary_objective: Option<String>,

    /// Things the project explicitly does not do
    #[serde(default)]
    pub non_goals: Vec<String>,
}

impl ProjectContext {
    /// Parse a context document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a context document, or `None` if it is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let yaml = match std::fs::read_to_string(path) {
            Ok(yaml) => yaml,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "project context unavailable");
                return None;
            }
        };

        match Self::from_yaml_str(&yaml) {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed project context");
                None
            }
        }
    }

    /// Non-goal keywords.
    pub fn non_goals(&self) -> &[String] {
        &self.project.goals.non_goals
    }

    /// One warning per non-goal that appears in `text` (case-insensitive substring).
    pub fn check_alignment(&self, text: &str) -> Vec<Violation> {
        let lower = text.to_lowercase();
        self.non_goals()
            .iter()
            .filter(|non_goal| !non_goal.trim().is_empty())
            .filter(|non_goal| lower.contains(&non_goal.to_lowercase()))
            .map(|non_goal| Violation {
                rule: NON_GOAL_RULE.to_string(),
                severity: Severity::Warning,
                message: format!("Output may violate non-goal: {}", non_goal),
                evidence: vec![non_goal.clone()],
            })
            .collect()
    }
}

/// Result of structurally validating a context document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextReport {
    /// Problems that make the document invalid
    pub errors: Vec<String>,
    /// Recommended fields that are missing
    pub warnings: Vec<String>,
    /// Hints
    pub info: Vec<String>,
}

impl ContextReport {
    /// Valid when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the context document at `path`.
///
/// A missing document is valid with a warning.
pub fn validate_context_document(path: impl AsRef<Path>) -> ContextReport {
    let path = path.as_ref();
    let mut report = ContextReport::default();

    if !path.exists() {
        report
            .warnings
            .push(format!("{} not found (will be created on initialization)", path.display()));
        return report;
    }

    match std::fs::read_to_string(path) {
        Ok(yaml) => validate_context_str(&yaml),
        Err(e) => {
            report.errors.push(format!("Error reading file: {}", e));
            report
        }
    }
}

/// Validate a context document held in memory.
pub fn validate_context_str(yaml: &str) -> ContextReport {
    let mut report = ContextReport::default();

    let data: Value = match serde_yaml::from_str(yaml) {
        Ok(data) => data,
        Err(e) => {
            report.errors.push(format!("Invalid YAML syntax: {}", e));
            return report;
        }
    };

    if !data.is_mapping() {
        report.errors.push("Context document must be a mapping".to_string());
        return report;
    }

    let missing = missing_keys(&data, REQUIRED_SECTIONS);
    if !missing.is_empty() {
        report
            .errors
            .push(format!("Missing required sections: {}", missing.join(", ")));
    }

    if let Some(project) = data.get("project") {
        check_project(project, &mut report);
        check_goals(project, &mut report);
    }

    if let Some(repos) = data.get("repositories") {
        check_repositories(repos, &mut report);
    }

    report
}

fn check_project(project: &Value, report: &mut ContextReport) {
    let missing = missing_keys(project, REQUIRED_PROJECT_FIELDS);
    if !missing.is_empty() {
        report
            .errors
            .push(format!("Project section missing fields: {}", missing.join(", ")));
    }

    if let Some(kind) = project.get("type") {
        let kind = display_value(kind);
        if !PROJECT_TYPES.contains(&kind.as_str()) {
            report.errors.push(format!("Invalid project type: {}", kind));
        }
    }
}

fn check_repositories(repos: &Value, report: &mut ContextReport) {
    let Some(repos) = repos.as_mapping() else {
        report
            .errors
            .push("Repositories section must be a dictionary".to_string());
        return;
    };

    for (name, repo) in repos {
        let name = display_value(name);

        let missing = missing_keys(repo, REPOSITORY_FIELDS);
        if !missing.is_empty() {
            report.warnings.push(format!(
                "Repository '{}' missing fields: {}",
                name,
                missing.join(", ")
            ));
        }

        if let Some(status) = repo.get("status") {
            let status = display_value(status);
            if !REPOSITORY_STATUSES.contains(&status.as_str()) {
                report
                    .errors
                    .push(format!("Invalid status for {}: {}", name, status));
            }
        }
    }
}

fn check_goals(project: &Value, report: &mut ContextReport) {
    match project.get("goals") {
        None => {
            report
                .warnings
                .push("Missing 'goals' section in project (required for goal alignment)".to_string());
            report.info.push(
                "Consider adding goals with: primary_objective, success_metrics, constraints".to_string(),
            );
        }
        Some(goals) => {
            let missing = missing_keys(goals, GOAL_FIELDS);
            if !missing.is_empty() {
                report.warnings.push(format!(
                    "Goals section missing recommended fields: {}",
                    missing.join(", ")
                ));
            }
        }
    }
}

fn missing_keys<'a>(value: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|key| value.get(*key).is_none())
        .collect()
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
