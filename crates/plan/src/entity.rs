//! Structured entities checked against the rule catalog.
//!
//! Structural validation only looks at names. Here every text field of a
//! task or milestone is also run through the catalog's forbidden rules, so
//! "Deadline Q1 2025" is caught as readily as "2 weeks".

use planguard_core::{Milestone, Task};
use planguard_rules::{RuleCatalog, Scanner};
use serde::Serialize;

use crate::document::PrioritizedTasks;

/// Structured planning output handed over for enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEntity {
    /// A single task
    Task(Task),
    /// A single milestone
    Milestone(Milestone),
    /// A batch of tasks, reported as a priority list
    Tasks(Vec<Task>),
}

/// Normalized form of a checked entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StructuredOutput {
    /// Task as given
    Task(Task),
    /// Milestone as given
    Milestone(Milestone),
    /// Tasks grouped by priority
    PriorityList(PrioritizedTasks),
}

/// Outcome of checking a structured entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    /// No violations found
    pub valid: bool,
    /// Every violation, across all entities
    pub violations: Vec<String>,
    /// Normalized entity
    pub structured: StructuredOutput,
}

impl PlanEntity {
    /// Check the entity. Structured input is never rewritten: it either
    /// holds or the report lists what is wrong with it.
    pub fn check(&self, catalog: &RuleCatalog) -> EntityReport {
        let (violations, structured) = match self {
            PlanEntity::Task(task) => (task_errors(task, catalog), StructuredOutput::Task(task.clone())),
            PlanEntity::Milestone(milestone) => (
                milestone_errors(milestone, catalog),
                StructuredOutput::Milestone(milestone.clone()),
            ),
            PlanEntity::Tasks(tasks) => (
                tasks.iter().flat_map(|task| task_errors(task, catalog)).collect(),
                StructuredOutput::PriorityList(PrioritizedTasks::group(tasks)),
            ),
        };

        if !violations.is_empty() {
            tracing::debug!(violations = violations.len(), "structured output failed checks");
        }

        EntityReport {
            valid: violations.is_empty(),
            violations,
            structured,
        }
    }
}

impl From<Task> for PlanEntity {
    fn from(task: Task) -> Self {
        PlanEntity::Task(task)
    }
}

impl From<Milestone> for PlanEntity {
    fn from(milestone: Milestone) -> Self {
        PlanEntity::Milestone(milestone)
    }
}

impl From<Vec<Task>> for PlanEntity {
    fn from(tasks: Vec<Task>) -> Self {
        PlanEntity::Tasks(tasks)
    }
}

/// Structural errors followed by catalog matches in any task field.
pub(crate) fn task_errors(task: &Task, catalog: &RuleCatalog) -> Vec<String> {
    let mut errors = task.validate().errors;
    let scanner = Scanner::new(catalog);

    screen(&scanner, "task name", &task.name, &mut errors);
    for dependency in &task.dependencies {
        screen(&scanner, "task dependency", dependency, &mut errors);
    }
    for criterion in &task.acceptance_criteria {
        screen(&scanner, "acceptance criterion", criterion, &mut errors);
    }
    errors
}

/// Structural errors followed by catalog matches in any milestone field.
pub(crate) fn milestone_errors(milestone: &Milestone, catalog: &RuleCatalog) -> Vec<String> {
    let mut errors = milestone.validate().errors;
    let scanner = Scanner::new(catalog);

    screen(&scanner, "milestone name", &milestone.name, &mut errors);
    for criterion in &milestone.success_criteria {
        screen(&scanner, "success criterion", criterion, &mut errors);
    }
    for prerequisite in &milestone.prerequisites {
        screen(&scanner, "milestone prerequisite", prerequisite, &mut errors);
    }
    errors
}

/// First forbidden expression in `text`, warnings included.
pub(crate) fn first_forbidden(catalog: &RuleCatalog, text: &str) -> Option<String> {
    Scanner::new(catalog)
        .scan_forbidden(text)
        .into_iter()
        .flat_map(|v| v.evidence)
        .next()
}

fn screen(scanner: &Scanner<'_>, field: &str, text: &str, errors: &mut Vec<String>) {
    for violation in scanner.scan_forbidden(text) {
        for evidence in &violation.evidence {
            errors.push(format!(
                "Forbidden time expression '{}' in {} ({})",
                evidence, field, violation.rule
            ));
        }
    }
}
