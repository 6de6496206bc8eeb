//! Rule and violation model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Makes output non-compliant
    Error,
    /// Reported, does not affect compliance
    Warning,
}

impl Severity {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule name
    pub name: String,

    /// Regular expression, matched case-insensitively
    pub pattern: String,

    /// Severity
    pub severity: Severity,

    /// Human-readable message
    pub message: String,
}

/// A single rule outcome from a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule name
    pub rule: String,

    /// Severity
    pub severity: Severity,

    /// Message
    pub message: String,

    /// Matched substrings; empty for a missing required pattern
    pub evidence: Vec<String>,
}

impl Violation {
    /// Create a violation for `rule` with the given evidence.
    pub fn from_rule(rule: &Rule, evidence: Vec<String>) -> Self {
        Self {
            rule: rule.name.clone(),
            severity: rule.severity,
            message: rule.message.clone(),
            evidence,
        }
    }

    /// Whether this violation breaks compliance.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Compliance means zero error-severity violations.
pub fn is_compliant(violations: &[Violation]) -> bool {
    !violations.iter().any(Violation::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(severity: Severity) -> Rule {
        Rule {
            name: "time_estimate_weeks".to_string(),
            pattern: r"\b\d+\s*weeks?\b".to_string(),
            severity,
            message: "Time estimates in weeks are forbidden.".to_string(),
        }
    }

    #[test]
    fn test_warnings_do_not_break_compliance() {
        let warning = Violation::from_rule(&rule(Severity::Warning), vec!["2 weeks".to_string()]);
        assert!(is_compliant(&[warning.clone()]));

        let error = Violation::from_rule(&rule(Severity::Error), vec!["2 weeks".to_string()]);
        assert!(!is_compliant(&[warning, error]));
    }

    #[test]
    fn test_empty_is_compliant() {
        assert!(is_compliant(&[]));
    }
}
