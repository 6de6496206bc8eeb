//! Rule catalog: forbidden, required, exception and transformation rules.
//!
//! The catalog is declarative data. [`CatalogDefinition`] mirrors the YAML
//! document; [`RuleCatalog`] is its compiled, immutable form. The built-in
//! definition is embedded at compile time and compiled once per process.

use planguard_core::{Rule, Severity};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_RULES: &str = include_str!("../rules/planning_rules.yaml");

/// Errors raised while loading or compiling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed YAML definition
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Pattern failed to compile
    #[error("invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        /// Rule name
        rule: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Two rules share a name
    #[error("duplicate rule name '{0}'")]
    DuplicateRule(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// How the enforcer treats non-compliant text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// Reject non-compliant text
    Strict,
    /// Rewrite non-compliant text
    #[default]
    Lenient,
}

/// Enforcement settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementSettings {
    /// Enforcement level
    #[serde(default)]
    pub level: EnforcementLevel,
}

/// A pattern whose presence on a line suppresses forbidden matches on that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionContext {
    /// Context name
    pub name: String,
    /// Regular expression
    pub pattern: String,
}

/// A replacement applied by the text transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Regular expression
    pub pattern: String,
    /// Replacement; `${n}` expands capture group `n`
    pub replacement: String,
}

/// Uncompiled catalog, as written in YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Enforcement settings
    #[serde(default)]
    pub enforcement: EnforcementSettings,

    /// Rules applied to every output
    #[serde(default)]
    pub forbidden: Vec<Rule>,

    /// Rules keyed by output type
    #[serde(default)]
    pub required: BTreeMap<String, Vec<Rule>>,

    /// Same-line exception contexts
    #[serde(default)]
    pub exceptions: Vec<ExceptionContext>,

    /// Ordered transformation table
    #[serde(default)]
    pub transformations: Vec<TransformRule>,
}

impl CatalogDefinition {
    /// The embedded default definition.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    /// Parse a definition from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A rule with its compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Source rule
    pub rule: Rule,
    regex: Regex,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self> {
        let regex = compile_pattern(&rule.name, &rule.pattern)?;
        Ok(Self { rule, regex })
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.rule.name
    }

    /// Rule severity.
    pub fn severity(&self) -> Severity {
        self.rule.severity
    }

    /// Compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A compiled exception context.
#[derive(Debug, Clone)]
pub struct CompiledException {
    /// Context name
    pub name: String,
    regex: Regex,
}

impl CompiledException {
    /// Whether this context occurs in `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// A compiled transformation entry.
#[derive(Debug, Clone)]
pub struct CompiledTransform {
    /// Source entry
    pub rule: TransformRule,
    regex: Regex,
}

impl CompiledTransform {
    /// Replace every match in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.regex.replace_all(text, self.rule.replacement.as_str()).into_owned()
    }
}

/// Compiled, immutable rule catalog.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    forbidden: Vec<CompiledRule>,
    required: BTreeMap<String, Vec<CompiledRule>>,
    exceptions: Vec<CompiledException>,
    transforms: Vec<CompiledTransform>,
    enforcement: EnforcementLevel,
}

impl RuleCatalog {
    /// The process-wide built-in catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded definition does not compile; the process cannot
    /// run without its catalog.
    pub fn builtin() -> &'static RuleCatalog {
        static BUILTIN: OnceLock<RuleCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            CatalogDefinition::builtin()
                .and_then(RuleCatalog::compile)
                .expect("built-in rule catalog must compile")
        })
    }

    /// Compile a definition.
    pub fn compile(definition: CatalogDefinition) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut check_unique = |name: &str| {
            if seen.insert(name.to_string()) {
                Ok(())
            } else {
                Err(CatalogError::DuplicateRule(name.to_string()))
            }
        };

        let mut forbidden = Vec::with_capacity(definition.forbidden.len());
        for rule in definition.forbidden {
            check_unique(&rule.name)?;
            forbidden.push(CompiledRule::compile(rule)?);
        }

        let mut required = BTreeMap::new();
        for (output_type, rules) in definition.required {
            let mut compiled = Vec::with_capacity(rules.len());
            for rule in rules {
                check_unique(&rule.name)?;
                compiled.push(CompiledRule::compile(rule)?);
            }
            required.insert(output_type, compiled);
        }

        let exceptions = definition
            .exceptions
            .into_iter()
            .map(|ctx| {
                let regex = compile_pattern(&ctx.name, &ctx.pattern)?;
                Ok(CompiledException { name: ctx.name, regex })
            })
            .collect::<Result<Vec<_>>>()?;

        let transforms = definition
            .transformations
            .into_iter()
            .map(|rule| {
                let regex = compile_pattern(&rule.pattern, &rule.pattern)?;
                Ok(CompiledTransform { rule, regex })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            forbidden = forbidden.len(),
            output_types = required.len(),
            exceptions = exceptions.len(),
            transforms = transforms.len(),
            "compiled rule catalog"
        );

        Ok(Self {
            forbidden,
            required,
            exceptions,
            transforms,
            enforcement: definition.enforcement.level,
        })
    }

    /// Load and compile a YAML definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::compile(CatalogDefinition::from_yaml_str(yaml)?)
    }

    /// Load and compile a YAML definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Forbidden rules in definition order.
    pub fn forbidden(&self) -> &[CompiledRule] {
        &self.forbidden
    }

    /// Required rules for an output type; empty for unknown types.
    pub fn required_for(&self, output_type: &str) -> &[CompiledRule] {
        self.required
            .get(output_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Output types with required rules.
    pub fn output_types(&self) -> impl Iterator<Item = &str> {
        self.required.keys().map(String::as_str)
    }

    /// Exception contexts.
    pub fn exceptions(&self) -> &[CompiledException] {
        &self.exceptions
    }

    /// Transformation table in application order.
    pub fn transforms(&self) -> &[CompiledTransform] {
        &self.transforms
    }

    /// Configured enforcement level.
    pub fn enforcement_level(&self) -> EnforcementLevel {
        self.enforcement
    }

    /// Whether any exception context occurs in `line`.
    pub fn is_exception_line(&self, line: &str) -> bool {
        self.exceptions.iter().any(|ctx| ctx.matches(line))
    }
}

fn compile_pattern(name: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CatalogError::InvalidPattern {
            rule: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = RuleCatalog::builtin();
        assert!(!catalog.forbidden().is_empty());
        assert!(!catalog.exceptions().is_empty());
        assert!(!catalog.transforms().is_empty());
        assert_eq!(catalog.enforcement_level(), EnforcementLevel::Lenient);
    }

    #[test]
    fn test_builtin_forbidden_order() {
        let names: Vec<&str> = RuleCatalog::builtin()
            .forbidden()
            .iter()
            .map(CompiledRule::name)
            .collect();
        assert_eq!(names.first(), Some(&"time_estimate_days"));
        assert!(names.contains(&"time_estimate_quarters"));
        assert!(names.contains(&"deadline_references"));
        assert_eq!(names.last(), Some(&"timeline_values"));
    }

    #[test]
    fn test_required_rules_by_output_type() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.required_for("project_plan")[0].name(), "priority_levels");
        assert_eq!(catalog.required_for("task_breakdown")[0].name(), "complexity_or_size");
        assert!(catalog.required_for("general").is_empty());
        assert!(catalog.required_for("unknown").is_empty());
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let catalog = RuleCatalog::builtin();
        let quarters = catalog
            .forbidden()
            .iter()
            .find(|r| r.name() == "time_estimate_quarters")
            .unwrap();
        assert!(quarters.regex().is_match("q3 2025"));
        assert!(catalog.is_exception_line("COPYRIGHT 2024 Example Corp"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let yaml = r#"
forbidden:
  - name: broken
    pattern: '(unclosed'
    severity: error
    message: broken
"#;
        let err = RuleCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let yaml = r#"
forbidden:
  - name: same
    pattern: 'a'
    severity: error
    message: a
required:
  project_plan:
    - name: same
      pattern: 'b'
      severity: error
      message: b
"#;
        let err = RuleCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRule(ref name) if name == "same"));
    }

    #[test]
    fn test_strict_level_from_yaml() {
        let catalog = RuleCatalog::from_yaml_str("enforcement:\n  level: strict\n").unwrap();
        assert_eq!(catalog.enforcement_level(), EnforcementLevel::Strict);
        assert!(catalog.forbidden().is_empty());
    }

    #[test]
    fn test_templated_transform() {
        let catalog = RuleCatalog::builtin();
        let out = catalog
            .transforms()
            .iter()
            .fold("Ship in Q3 2025".to_string(), |acc, t| t.apply(&acc));
        assert_eq!(out, "Ship in Priority 3");
    }
}
