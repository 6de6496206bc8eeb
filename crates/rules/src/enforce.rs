//! Enforcement: strict mode rejects, lenient mode rewrites.

use planguard_core::{is_compliant, Violation};
use serde::Serialize;

use crate::catalog::{EnforcementLevel, RuleCatalog};
use crate::scanner::Scanner;
use crate::transform::Transformer;

/// Strict-mode rejection.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    /// Text carries error-severity violations
    #[error("output rejected with {} violation(s)", .violations.len())]
    Rejected {
        /// Violations found
        violations: Vec<Violation>,
    },
}

/// Text that passed enforcement, possibly rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcedOutput {
    /// Final text
    pub text: String,
    /// Whether the text was rewritten
    pub transformed: bool,
    /// Violations still present in `text`, warnings included
    pub violations: Vec<Violation>,
}

impl EnforcedOutput {
    /// No error-severity violations remain.
    pub fn is_compliant(&self) -> bool {
        is_compliant(&self.violations)
    }
}

/// Applies the catalog's enforcement level to output.
#[derive(Debug, Clone, Copy)]
pub struct Enforcer<'c> {
    catalog: &'c RuleCatalog,
    level: EnforcementLevel,
}

impl<'c> Enforcer<'c> {
    /// Enforcer using the catalog's configured level.
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self {
            catalog,
            level: catalog.enforcement_level(),
        }
    }

    /// Override the level.
    pub fn with_level(mut self, level: EnforcementLevel) -> Self {
        self.level = level;
        self
    }

    /// Current level.
    pub fn level(&self) -> EnforcementLevel {
        self.level
    }

    /// Enforce on `text`.
    ///
    /// Strict: compliant text passes unchanged, anything else is rejected.
    /// Lenient: non-compliant text is rewritten and re-scanned; the rewrite is
    /// returned even if errors remain, with those errors listed.
    pub fn enforce(&self, text: &str, output_type: &str) -> Result<EnforcedOutput, EnforcementError> {
        let scanner = Scanner::new(self.catalog);
        let violations = scanner.scan(text, output_type);

        if is_compliant(&violations) {
            return Ok(EnforcedOutput {
                text: text.to_string(),
                transformed: false,
                violations,
            });
        }

        match self.level {
            EnforcementLevel::Strict => {
                tracing::info!(violations = violations.len(), "rejecting non-compliant output");
                Err(EnforcementError::Rejected { violations })
            }
            EnforcementLevel::Lenient => {
                let rewritten = Transformer::new(self.catalog).transform(text);
                let remaining = scanner.scan(&rewritten, output_type);
                if !is_compliant(&remaining) {
                    tracing::warn!(
                        remaining = remaining.iter().filter(|v| v.is_error()).count(),
                        "rewrite left violations in place"
                    );
                }
                Ok(EnforcedOutput {
                    transformed: rewritten != text,
                    text: rewritten,
                    violations: remaining,
                })
            }
        }
    }
}
