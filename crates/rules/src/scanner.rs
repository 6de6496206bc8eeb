//! Pattern scanner.
//!
//! Applies a [`RuleCatalog`] to text. Exception contexts are line-scoped: if
//! any exception pattern matches anywhere on a line, every forbidden match
//! starting on that line is discarded, however far apart the two tokens are.

use planguard_core::Violation;
use crate::catalog::{CompiledRule, RuleCatalog};

/// A forbidden match found on a single line.
#[derive(Debug, Clone)]
pub struct LineHit<'c> {
    /// Rule that matched
    pub rule: &'c CompiledRule,
    /// Matched text
    pub matched: String,
}

/// Scans text against a rule catalog. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'c> {
    catalog: &'c RuleCatalog,
}

impl<'c> Scanner<'c> {
    /// Create a scanner over `catalog`.
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &'c RuleCatalog {
        self.catalog
    }

    /// Scan `text` for forbidden patterns and, for `output_type`, missing
    /// required patterns.
    ///
    /// One violation per forbidden rule (carrying every surviving match),
    /// then one per absent required rule, in catalog order.
    pub fn scan(&self, text: &str, output_type: &str) -> Vec<Violation> {
        let mut violations = self.scan_forbidden(text);

        for rule in self.catalog.required_for(output_type) {
            if !rule.regex().is_match(text) {
                tracing::debug!(rule = rule.name(), output_type, "required pattern missing");
                violations.push(Violation::from_rule(&rule.rule, Vec::new()));
            }
        }

        violations
    }

    /// Forbidden-pattern pass only.
    pub fn scan_forbidden(&self, text: &str) -> Vec<Violation> {
        let lines = ExemptLines::new(text, self.catalog);
        let mut violations = Vec::new();

        for rule in self.catalog.forbidden() {
            let evidence: Vec<String> = rule
                .regex()
                .find_iter(text)
                .filter(|m| !lines.is_exempt(m.start()))
                .map(|m| m.as_str().to_string())
                .collect();

            if !evidence.is_empty() {
                tracing::debug!(rule = rule.name(), matches = evidence.len(), "forbidden pattern matched");
                violations.push(Violation::from_rule(&rule.rule, evidence));
            }
        }

        violations
    }

    /// Every forbidden match on one line, in rule order then position.
    /// Empty when the line carries an exception context.
    pub fn scan_line(&self, line: &str) -> Vec<LineHit<'c>> {
        if self.catalog.is_exception_line(line) {
            return Vec::new();
        }

        self.catalog
            .forbidden()
            .iter()
            .flat_map(|rule| {
                rule.regex().find_iter(line).map(move |m| LineHit {
                    rule,
                    matched: m.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Whether `text` has no error-severity violations for `output_type`.
    pub fn is_compliant(&self, text: &str, output_type: &str) -> bool {
        planguard_core::is_compliant(&self.scan(text, output_type))
    }
}

/// Line start offsets with a per-line exception flag.
struct ExemptLines {
    starts: Vec<usize>,
    exempt: Vec<bool>,
}

impl ExemptLines {
    fn new(text: &str, catalog: &RuleCatalog) -> Self {
        let mut starts = Vec::new();
        let mut exempt = Vec::new();
        let mut offset = 0;

        for line in text.split('\n') {
            starts.push(offset);
            exempt.push(catalog.is_exception_line(line));
            offset += line.len() + 1;
        }

        Self { starts, exempt }
    }

    fn is_exempt(&self, offset: usize) -> bool {
        let idx = self.starts.partition_point(|&start| start <= offset);
        idx > 0 && self.exempt[idx - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_core::Severity;

    fn scanner() -> Scanner<'static> {
        Scanner::new(RuleCatalog::builtin())
    }

    fn rule_names(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn test_week_count_is_an_error() {
        let violations = scanner().scan("Complete in 2 weeks", "general");
        let weeks = violations.iter().find(|v| v.rule == "time_estimate_weeks").unwrap();
        assert_eq!(weeks.severity, Severity::Error);
        assert_eq!(weeks.evidence, vec!["2 weeks".to_string()]);
        assert!(!scanner().is_compliant("Complete in 2 weeks", "general"));
    }

    #[test]
    fn test_all_matches_grouped_per_rule() {
        let violations = scanner().scan("Phase 1: 3 days\nPhase 2: 5 days", "general");
        let days = violations.iter().find(|v| v.rule == "time_estimate_days").unwrap();
        assert_eq!(days.evidence, vec!["3 days".to_string(), "5 days".to_string()]);
    }

    #[test]
    fn test_compliant_text() {
        let text = "Priority: High\nComplexity: Moderate\nDepends on the auth service";
        assert!(scanner().scan(text, "general").is_empty());
    }

    #[test]
    fn test_rule_definition_order() {
        let violations = scanner().scan("Deadline: Q1 2025, about 2 weeks", "general");
        assert_eq!(
            rule_names(&violations),
            vec!["time_estimate_weeks", "time_estimate_quarters", "deadline_references"]
        );
    }

    #[test]
    fn test_exception_on_same_line_suppresses() {
        let text = "Copyright 2024 Example Corp. Complete in 2 weeks";
        assert!(scanner().scan(text, "general").is_empty());
    }

    #[test]
    fn test_exception_on_other_line_does_not_suppress() {
        let text = "Copyright 2024 Example Corp.\nComplete in 2 weeks";
        let violations = scanner().scan(text, "general");
        assert_eq!(rule_names(&violations), vec!["time_estimate_weeks"]);
    }

    #[test]
    fn test_technical_timeout_suppresses_line() {
        let text = "Retry with a 30 seconds delay, poll every 2 hours";
        assert!(scanner().scan(text, "general").is_empty());
    }

    #[test]
    fn test_warning_does_not_break_compliance() {
        let text = "Focus on the first month of adoption";
        let violations = scanner().scan(text, "general");
        assert_eq!(rule_names(&violations), vec!["relative_periods"]);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(scanner().is_compliant(text, "general"));
    }

    #[test]
    fn test_required_pattern_missing() {
        let violations = scanner().scan("Build the thing, then ship it", "project_plan");
        assert_eq!(rule_names(&violations), vec!["priority_levels"]);
        assert!(violations[0].evidence.is_empty());

        assert!(scanner().scan("Priority: Critical - build the thing", "project_plan").is_empty());
    }

    #[test]
    fn test_required_pattern_for_task_breakdown() {
        assert!(scanner().scan("Parser rewrite (complex)", "task_breakdown").is_empty());
        let violations = scanner().scan("Parser rewrite", "task_breakdown");
        assert_eq!(rule_names(&violations), vec!["complexity_or_size"]);
    }

    #[test]
    fn test_forbidden_families() {
        let cases = [
            ("Ship by March 2025", "calendar_dates"),
            ("Week 3: integration", "sequential_periods"),
            ("Done in 2-3 days", "time_estimate_ranges"),
            ("Launch in early March", "relative_month_references"),
            ("Wrap up by end of month", "period_boundaries"),
            ("timeline: 3", "timeline_values"),
            ("Takes two weeks", "spelled_out_durations"),
            ("The due date is fixed", "deadline_references"),
        ];
        for (text, rule) in cases {
            let violations = scanner().scan(text, "general");
            assert!(rule_names(&violations).contains(&rule), "{text:?} should trigger {rule}");
        }
    }

    #[test]
    fn test_scan_is_deterministic() {
        let text = "Q1 2025 deadline\n3 months of work";
        assert_eq!(scanner().scan(text, "project_plan"), scanner().scan(text, "project_plan"));
    }

    #[test]
    fn test_scan_line_hits() {
        let hits = scanner().scan_line("Phase 1 takes 3 days, Phase 2 takes 4 days");
        let matched: Vec<&str> = hits.iter().map(|h| h.matched.as_str()).collect();
        assert_eq!(matched, vec!["3 days", "4 days"]);
        assert!(scanner().scan_line("Listen on port 8080 for 2 days").is_empty());
    }
}
