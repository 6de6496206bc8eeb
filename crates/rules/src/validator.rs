//! Output validation: scan, align with project goals, and optionally rewrite.

use planguard_core::{is_compliant, Violation};
use serde::Serialize;
use std::path::PathBuf;

use crate::catalog::RuleCatalog;
use crate::context::{ProjectContext, DEFAULT_CONTEXT_PATH};
use crate::scanner::Scanner;
use crate::transform::Transformer;

/// Output type with no required patterns.
pub const GENERAL_OUTPUT: &str = "general";

/// Result of validating one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// No error-severity violations
    pub compliant: bool,
    /// Every violation, errors and warnings
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn new(violations: Vec<Violation>) -> Self {
        Self {
            compliant: is_compliant(&violations),
            violations,
        }
    }

    /// Error-severity violations only.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }
}

/// Validation plus, for non-compliant output, a best-effort rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentOutputResult {
    /// Original output was compliant
    pub valid: bool,
    /// Violations of the original output
    pub violations: Vec<Violation>,
    /// Rewritten output, only when the original was not compliant
    pub transformed: Option<String>,
    /// Whether a rewrite was needed
    pub requires_transformation: bool,
    /// Violations that survive the rewrite (re-scan of `transformed`)
    pub remaining_violations: Vec<Violation>,
}

impl AgentOutputResult {
    /// Whether the rewrite, if any, is compliant.
    pub fn transformed_is_compliant(&self) -> bool {
        self.transformed.is_some() && is_compliant(&self.remaining_violations)
    }
}

/// Where the validator finds the project-context document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSource {
    /// No alignment checking
    Disabled,
    /// Read this file on every validation call
    Path(PathBuf),
}

impl Default for ContextSource {
    fn default() -> Self {
        ContextSource::Path(PathBuf::from(DEFAULT_CONTEXT_PATH))
    }
}

/// Validates agent output against a catalog and the project context.
#[derive(Debug, Clone)]
pub struct OutputValidator<'c> {
    catalog: &'c RuleCatalog,
    context: ContextSource,
}

impl OutputValidator<'static> {
    /// Validator over the built-in catalog with the default context path.
    pub fn builtin() -> Self {
        Self::new(RuleCatalog::builtin())
    }
}

impl<'c> OutputValidator<'c> {
    /// Create a validator reading the default context path.
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self {
            catalog,
            context: ContextSource::default(),
        }
    }

    /// Set the context source.
    pub fn with_context(mut self, context: ContextSource) -> Self {
        self.context = context;
        self
    }

    /// Scan, then add non-goal warnings from the project context.
    pub fn validate_output(&self, output: &str, output_type: &str) -> ValidationReport {
        let mut violations = Scanner::new(self.catalog).scan(output, output_type);
        violations.extend(self.check_goal_alignment(output));
        ValidationReport::new(violations)
    }

    /// Validate; if non-compliant, rewrite and re-validate the rewrite.
    pub fn validate_agent_output(&self, output: &str, output_type: &str) -> AgentOutputResult {
        let report = self.validate_output(output, output_type);

        if report.compliant {
            return AgentOutputResult {
                valid: true,
                violations: report.violations,
                transformed: None,
                requires_transformation: false,
                remaining_violations: Vec::new(),
            };
        }

        let transformed = Transformer::new(self.catalog).transform(output);
        let after = self.validate_output(&transformed, output_type);
        if !after.compliant {
            tracing::debug!(
                remaining = after.errors().count(),
                "rewrite did not remove every error"
            );
        }

        AgentOutputResult {
            valid: false,
            violations: report.violations,
            transformed: Some(transformed),
            requires_transformation: true,
            remaining_violations: after.violations,
        }
    }

    fn check_goal_alignment(&self, output: &str) -> Vec<Violation> {
        match &self.context {
            ContextSource::Disabled => Vec::new(),
            ContextSource::Path(path) => ProjectContext::load(path)
                .map(|context| context.check_alignment(output))
                .unwrap_or_default(),
        }
    }
}
