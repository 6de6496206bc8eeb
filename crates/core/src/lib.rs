//! PlanGuard core data models.
//!
//! This crate defines the closed planning vocabularies and the structured
//! entities (tasks, milestones) that carry them, together with the rule and
//! violation records shared by the scanning and building layers.

#![warn(missing_docs)]

// Vocabularies
mod vocabulary;

// Rules and reporting
mod rule;

// Planned work
mod task;
mod milestone;

// Re-exports
pub use vocabulary::{
    Priority, Complexity, Size, PlanType, OutputFormat, UnknownVariant,
    find_forbidden_term, TIME_UNIT_TERMS, METADATA_FORBIDDEN_TERMS,
};
pub use rule::{Rule, Severity, Violation, is_compliant};
pub use task::{Task, Validation};
pub use milestone::Milestone;
