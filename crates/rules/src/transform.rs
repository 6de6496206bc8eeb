//! Best-effort rewriting of time estimates into planning vocabulary.
//!
//! The table only covers specific phrasings, not the whole forbidden grammar.
//! A rewritten text must be scanned again before it is treated as compliant.

use crate::catalog::RuleCatalog;

/// Applies the catalog's transformation table.
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'c> {
    catalog: &'c RuleCatalog,
}

impl<'c> Transformer<'c> {
    /// Create a transformer over `catalog`.
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Apply every entry in order, each as a global case-insensitive
    /// substitution. Unrecognized fragments pass through unchanged.
    pub fn transform(&self, text: &str) -> String {
        self.catalog
            .transforms()
            .iter()
            .fold(text.to_string(), |acc, entry| entry.apply(&acc))
    }
}

/// Transform with the built-in catalog.
pub fn transform(text: &str) -> String {
    Transformer::new(RuleCatalog::builtin()).transform(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    #[test]
    fn test_literal_replacements() {
        assert_eq!(transform("Finish in 1 week"), "Finish in Priority: High");
        assert_eq!(transform("Takes 2 weeks"), "Takes Priority: Medium");
        assert_eq!(transform("About 1 month"), "About Priority: Low");
        assert_eq!(transform("Just 1 day"), "Just Priority: Critical");
        assert_eq!(transform("Maybe 2-3 days"), "Maybe Complexity: Simple");
        assert_eq!(transform("Roughly 6 hours"), "Roughly Complexity: Moderate");
    }

    #[test]
    fn test_case_insensitive_phrases() {
        assert_eq!(transform("DEADLINE: Q1 2025"), "priority target: Priority 1");
        assert_eq!(transform("Due Date set, complete by Friday"), "priority milestone set, prioritize for Friday");
    }

    #[test]
    fn test_transform_is_idempotent_for_covered_phrases() {
        let once = transform("Phase 1: 1 week\nPhase 2: 2 weeks\nDeadline: Q4 2025");
        assert_eq!(transform(&once), once);
    }

    #[test]
    fn test_unrecognized_text_is_unchanged() {
        let text = "Build the parser, then the type checker";
        assert_eq!(transform(text), text);
    }

    #[test]
    fn test_rewrite_is_not_guaranteed_compliant() {
        let rewritten = transform("Ship in 3 weeks");
        assert_eq!(rewritten, "Ship in 3 weeks");
        assert!(!Scanner::new(RuleCatalog::builtin()).is_compliant(&rewritten, "general"));
    }

    #[test]
    fn test_covered_rewrite_rescans_clean() {
        let rewritten = transform("Phase 1: Complete in 2 weeks\nDeadline: Q1 2025");
        assert!(Scanner::new(RuleCatalog::builtin()).scan(&rewritten, "general").is_empty());
    }
}
