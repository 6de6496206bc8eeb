//! Plan builder.
//!
//! Entities are validated before insertion, never flagged after the fact.
//! Every mutating call either succeeds or leaves the builder unchanged.
//! Each text field is screened against the rule catalog on the way in, so
//! a built plan re-scans clean.

use planguard_core::{
    find_forbidden_term, Complexity, Milestone, OutputFormat, PlanType, Priority, Task,
    METADATA_FORBIDDEN_TERMS,
};
use planguard_rules::RuleCatalog;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::document::PlanDocument;
use crate::entity::{first_forbidden, milestone_errors, task_errors};
use crate::error::{PlanError, Result};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Open,
    Built,
}

/// Fluent plan builder.
///
/// ```
/// use planguard_core::{OutputFormat, PlanType};
/// use planguard_plan::PlanBuilder;
///
/// let mut builder = PlanBuilder::new(PlanType::TaskList);
/// builder
///     .add_task("Setup CI", "critical", "complex")?
///     .add_task_with_dependencies("Deploy", "high", "moderate", &["Setup CI"])?;
/// let yaml = builder.build(OutputFormat::Yaml)?;
/// assert!(yaml.contains("Setup CI"));
/// # Ok::<(), planguard_plan::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    plan_type: PlanType,
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    metadata: BTreeMap<String, Value>,
    catalog: &'static RuleCatalog,
    state: BuildState,
}

impl PlanBuilder {
    /// Create an empty, open builder.
    pub fn new(plan_type: PlanType) -> Self {
        Self {
            plan_type,
            tasks: Vec::new(),
            milestones: Vec::new(),
            metadata: BTreeMap::new(),
            catalog: RuleCatalog::builtin(),
            state: BuildState::Open,
        }
    }

    /// Screen entries against `catalog` instead of the built-in one.
    pub fn with_catalog(mut self, catalog: &'static RuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Create an empty builder from a plan-type name.
    pub fn for_type(plan_type: &str) -> Result<Self> {
        PlanType::parse(plan_type)
            .map(Self::new)
            .ok_or_else(|| PlanError::UnsupportedPlanType(plan_type.to_string()))
    }

    /// Plan type.
    pub fn plan_type(&self) -> PlanType {
        self.plan_type
    }

    /// Accepted tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Accepted milestones in insertion order.
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Metadata.
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Whether `build` has been called.
    pub fn is_built(&self) -> bool {
        self.state == BuildState::Built
    }

    /// Add a task with no dependencies.
    pub fn add_task(&mut self, name: &str, priority: &str, complexity: &str) -> Result<&mut Self> {
        self.add_task_with_dependencies::<&str>(name, priority, complexity, &[])
    }

    /// Add a task.
    ///
    /// Priority and complexity are parsed case-insensitively; an unknown value
    /// fails with [`PlanError::InvalidValue`] naming the allowed set.
    pub fn add_task_with_dependencies<S: AsRef<str>>(
        &mut self,
        name: &str,
        priority: &str,
        complexity: &str,
        dependencies: &[S],
    ) -> Result<&mut Self> {
        self.ensure_open()?;

        let priority = priority
            .parse::<Priority>()
            .map_err(|e| PlanError::invalid_value("priority", e))?;
        let complexity = complexity
            .parse::<Complexity>()
            .map_err(|e| PlanError::invalid_value("complexity", e))?;

        let task = Task::new(name, priority, complexity).with_dependencies(to_strings(dependencies));
        self.push_task(task)
    }

    /// Add a pre-constructed task, validated the same way.
    pub fn push_task(&mut self, task: Task) -> Result<&mut Self> {
        self.ensure_open()?;

        let errors = task_errors(&task, self.catalog);
        if !errors.is_empty() {
            tracing::warn!(task = %task.name, ?errors, "rejected task");
            return Err(PlanError::InvalidEntity { entity: "task", errors });
        }

        self.tasks.push(task);
        Ok(self)
    }

    /// Add a milestone.
    pub fn add_milestone<S: AsRef<str>>(
        &mut self,
        name: &str,
        priority: &str,
        success_criteria: &[S],
        prerequisites: &[S],
    ) -> Result<&mut Self> {
        self.ensure_open()?;

        let priority = priority
            .parse::<Priority>()
            .map_err(|e| PlanError::invalid_value("priority", e))?;

        let milestone = Milestone::new(name, priority, to_strings(success_criteria))
            .with_prerequisites(to_strings(prerequisites));
        self.push_milestone(milestone)
    }

    /// Add a pre-constructed milestone, validated the same way.
    pub fn push_milestone(&mut self, milestone: Milestone) -> Result<&mut Self> {
        self.ensure_open()?;

        let errors = milestone_errors(&milestone, self.catalog);
        if !errors.is_empty() {
            tracing::warn!(milestone = %milestone.name, ?errors, "rejected milestone");
            return Err(PlanError::InvalidEntity { entity: "milestone", errors });
        }

        self.milestones.push(milestone);
        Ok(self)
    }

    /// Set a metadata entry.
    ///
    /// Every string in the value, nested arrays and objects included, is
    /// checked against a short list of time terms and the catalog's
    /// forbidden rules. The key and nested object keys go through the
    /// catalog only.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<&mut Self> {
        self.ensure_open()?;

        let key = key.into();
        let value = value.into();
        if let Some(term) = self.forbidden_in_metadata(&key, &value) {
            tracing::warn!(%key, %term, "rejected metadata value");
            return Err(PlanError::ForbiddenMetadata { key, term });
        }

        self.metadata.insert(key, value);
        Ok(self)
    }

    /// Insert metadata known to be clean.
    pub(crate) fn insert_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), Value::from(value));
    }

    /// The structured document for the current contents.
    pub fn document(&self) -> PlanDocument {
        PlanDocument::assemble(self.plan_type, &self.tasks, &self.milestones, &self.metadata)
    }

    /// Render the plan and close it to further changes.
    ///
    /// May be called again to render another encoding.
    pub fn build(&mut self, format: OutputFormat) -> Result<String> {
        let output = render::render(&self.document(), format)?;
        self.state = BuildState::Built;
        tracing::debug!(
            plan_type = %self.plan_type,
            %format,
            tasks = self.tasks.len(),
            milestones = self.milestones.len(),
            "built plan"
        );
        Ok(output)
    }

    /// Render using a format name.
    pub fn build_with(&mut self, format: &str) -> Result<String> {
        let format = OutputFormat::parse(format)
            .ok_or_else(|| PlanError::UnsupportedFormat(format.to_string()))?;
        self.build(format)
    }

    fn forbidden_in_metadata(&self, key: &str, value: &Value) -> Option<String> {
        if let Some(found) = first_forbidden(self.catalog, key) {
            return Some(found);
        }

        let mut keys = Vec::new();
        let mut texts = Vec::new();
        collect_text(value, &mut keys, &mut texts);

        keys.into_iter()
            .find_map(|k| first_forbidden(self.catalog, k))
            .or_else(|| {
                texts.into_iter().find_map(|text| {
                    find_forbidden_term(text, METADATA_FORBIDDEN_TERMS)
                        .map(str::to_string)
                        .or_else(|| first_forbidden(self.catalog, text))
                })
            })
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            BuildState::Open => Ok(()),
            BuildState::Built => Err(PlanError::AlreadyBuilt),
        }
    }
}

/// Object keys and string leaves of `value`, depth first.
fn collect_text<'v>(value: &'v Value, keys: &mut Vec<&'v str>, texts: &mut Vec<&'v str>) {
    match value {
        Value::String(text) => texts.push(text),
        Value::Array(items) => {
            for item in items {
                collect_text(item, keys, texts);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                keys.push(k);
                collect_text(v, keys, texts);
            }
        }
        _ => {}
    }
}

fn to_strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_string()).collect()
}
