//! PlanGuard rule engine.
//!
//! This crate compiles the declarative rule catalog and applies it to text:
//! scanning for forbidden and required patterns, rewriting time estimates,
//! checking alignment with the project context, editing that context in
//! place, and auditing files on disk.

#![warn(missing_docs)]

pub mod catalog;
pub mod scanner;
pub mod transform;
pub mod context;
pub mod update;
pub mod validator;
pub mod enforce;
pub mod audit;

pub use catalog::{
    CatalogDefinition, CatalogError, CompiledRule, EnforcementLevel, ExceptionContext, RuleCatalog,
    TransformRule,
};
pub use scanner::{LineHit, Scanner};
pub use transform::{transform, Transformer};
pub use context::{
    validate_context_document, validate_context_str, ContextReport, ProjectContext,
    DEFAULT_CONTEXT_PATH,
};
pub use update::{backup_path, ContextUpdater, SaveOutcome, SectionChange, UpdateError};
pub use validator::{AgentOutputResult, ContextSource, OutputValidator, ValidationReport, GENERAL_OUTPUT};
pub use enforce::{EnforcedOutput, EnforcementError, Enforcer};
pub use audit::{AuditError, AuditReport, Auditor, LineMatch, DEFAULT_PATTERNS};
