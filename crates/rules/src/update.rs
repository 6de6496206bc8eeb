//! Incremental edits to the project-context document.
//!
//! Only fields whose value actually changes are touched, and every touch is
//! recorded. Unknown sections and fields are carried through untouched.

use chrono::Local;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::display_value;

/// Skeleton written when no document exists yet.
const DEFAULT_DOCUMENT: &str = r#"
project:
  name: Workspace
  type: single-repository
  description: Planning workspace
  goals:
    primary_objective: ""
    success_metrics: []
    constraints: []
    milestones: []
    non_goals: []
repositories: {}
conventions:
  commit_style: conventional-commits
  branch_strategy: main-branch
  documentation: markdown
development_guidelines:
  testing: Project-specific testing frameworks
  security: Follow security best practices
  code_style: Match existing project conventions
quick_reference:
  available_agents: {}
  working_directories: {}
  key_commands: {}
"#;

/// Errors from writing the context document.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Filesystem failure
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How a top-level section differs from the loaded document.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionChange {
    /// Section did not exist before
    Added(Value),
    /// Section exists with different content
    Modified {
        /// Loaded value
        old: Value,
        /// Pending value
        new: Value,
    },
}

/// Result of [`ContextUpdater::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed, nothing written
    Unchanged,
    /// Dry run: the changes that would have been written
    DryRun(Vec<String>),
    /// Document written
    Written {
        /// Changes applied
        changes: Vec<String>,
        /// Copy of the previous document, if there was one
        backup: Option<PathBuf>,
    },
}

/// Pending edits to a project-context document.
#[derive(Debug, Clone)]
pub struct ContextUpdater {
    path: PathBuf,
    existed: bool,
    original: Value,
    updated: Value,
    changes: Vec<String>,
}

impl ContextUpdater {
    /// Load the document at `path`.
    ///
    /// A missing or malformed document is replaced by a default skeleton;
    /// a malformed one is kept as the backup when saving.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = match std::fs::read_to_string(&path) {
            Ok(yaml) => match serde_yaml::from_str::<Value>(&yaml) {
                Ok(value) if value.is_mapping() => Some(value),
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "context document is not a mapping, starting fresh");
                    None
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed context document, starting fresh");
                    None
                }
            },
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "creating new context document");
                None
            }
        };

        let existed = loaded.is_some();
        let original = loaded.unwrap_or_else(default_document);
        Self {
            path,
            existed,
            updated: original.clone(),
            original,
            changes: Vec::new(),
        }
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a well-formed document was loaded.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Pending document.
    pub fn document(&self) -> &Value {
        &self.updated
    }

    /// Change log, in the order edits were made.
    pub fn changes(&self) -> &[String] {
        &self.changes
    }

    /// Set `project` fields whose value differs.
    pub fn update_project_info<K, V>(&mut self, updates: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let project = section_mut(&mut self.updated, "project");
        for (key, value) in updates {
            let key = key.into();
            let value = value.into();
            if project.get(key.as_str()) == Some(&value) {
                continue;
            }

            let old = project
                .get(key.as_str())
                .map(display_value)
                .unwrap_or_else(|| "Not set".to_string());
            self.changes.push(format!(
                "Updated project.{}: {} -> {}",
                key,
                old,
                display_value(&value)
            ));
            project.insert(Value::from(key), value);
        }
        self
    }

    /// Add a repository, or set the fields of an existing one that differ.
    pub fn update_repository<K, V>(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let repos = section_mut(&mut self.updated, "repositories");
        let is_new = !repos.get(name).is_some_and(Value::is_mapping);
        let repo = section_mut_in(repos, name);

        let mut changed = Vec::new();
        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            if repo.get(key.as_str()) != Some(&value) {
                changed.push(format!("Updated {}.{}", name, key));
                repo.insert(Value::from(key), value);
            }
        }

        if is_new {
            self.changes.push(format!("Added new repository: {}", name));
        } else {
            self.changes.extend(changed);
        }
        self
    }

    /// Add the `project.goals` section, or set the goal fields that differ.
    pub fn update_goals<K, V>(&mut self, goals: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let project = section_mut(&mut self.updated, "project");
        let is_new = !project.get("goals").is_some_and(Value::is_mapping);
        let section = section_mut_in(project, "goals");

        let mut changed = Vec::new();
        for (key, value) in goals {
            let key = key.into();
            let value = value.into();
            if section.get(key.as_str()) != Some(&value) {
                changed.push(format!("Updated goals.{}", key));
                section.insert(Value::from(key), value);
            }
        }

        if is_new {
            self.changes.push("Added goals section to project".to_string());
        } else {
            self.changes.extend(changed);
        }
        self
    }

    /// Set the current focus of a known repository.
    ///
    /// Returns false, changing nothing, when the repository is unknown.
    pub fn add_current_focus(&mut self, repository: &str, focus: &str) -> bool {
        let Some(repo) = self
            .updated
            .get_mut("repositories")
            .and_then(|repos| repos.get_mut(repository))
            .and_then(Value::as_mapping_mut)
        else {
            tracing::debug!(repository, "unknown repository, focus not recorded");
            return false;
        };

        let focus = Value::from(focus);
        if repo.get("current_focus") != Some(&focus) {
            repo.insert(Value::from("current_focus"), focus);
            self.changes.push(format!("Updated current focus for {}", repository));
        }
        true
    }

    /// Top-level sections that differ from the loaded document.
    pub fn diff(&self) -> BTreeMap<String, SectionChange> {
        let mut diff = BTreeMap::new();
        let (Some(updated), Some(original)) = (self.updated.as_mapping(), self.original.as_mapping()) else {
            return diff;
        };

        for (key, new) in updated {
            let change = match original.get(key) {
                None => SectionChange::Added(new.clone()),
                Some(old) if old != new => SectionChange::Modified {
                    old: old.clone(),
                    new: new.clone(),
                },
                Some(_) => continue,
            };
            diff.insert(display_value(key), change);
        }
        diff
    }

    /// Write the pending document.
    ///
    /// The previous file, if any, is first copied to `<path>.backup`. With
    /// `dry_run` nothing is written and the pending changes are returned.
    pub fn save(&self, dry_run: bool) -> Result<SaveOutcome, UpdateError> {
        if self.changes.is_empty() {
            tracing::debug!(path = %self.path.display(), "no context changes to save");
            return Ok(SaveOutcome::Unchanged);
        }

        if dry_run {
            return Ok(SaveOutcome::DryRun(self.changes.clone()));
        }

        let io_err = |source: std::io::Error| UpdateError::Io {
            path: self.path.clone(),
            source,
        };

        let backup = if self.path.exists() {
            let backup = backup_path(&self.path);
            std::fs::copy(&self.path, &backup).map_err(io_err)?;
            Some(backup)
        } else {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
            None
        };

        let body = serde_yaml::to_string(&self.updated)?;
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        std::fs::write(&self.path, format!("# Last updated: {}\n{}", stamp, body)).map_err(io_err)?;

        tracing::info!(
            path = %self.path.display(),
            changes = self.changes.len(),
            "updated project context"
        );
        Ok(SaveOutcome::Written {
            changes: self.changes.clone(),
            backup,
        })
    }
}

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

fn default_document() -> Value {
    let mut doc: Value = serde_yaml::from_str(DEFAULT_DOCUMENT).unwrap_or_else(|e| {
        tracing::error!(error = %e, "default context skeleton does not parse");
        Value::Mapping(Mapping::new())
    });
    let today = Local::now().format("%Y-%m-%d").to_string();
    section_mut(&mut doc, "project").insert(Value::from("initialized_at"), Value::from(today));
    doc
}

/// The mapping under `key` in `root`, replacing a missing or non-mapping value.
fn section_mut<'v>(root: &'v mut Value, key: &str) -> &'v mut Mapping {
    if !root.is_mapping() {
        *root = Value::Mapping(Mapping::new());
    }
    match root {
        Value::Mapping(map) => section_mut_in(map, key),
        _ => unreachable!("guarded by is_mapping above"),
    }
}

fn section_mut_in<'m>(map: &'m mut Mapping, key: &str) -> &'m mut Mapping {
    let slot = map
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(inner) => inner,
        _ => unreachable!("guarded by is_mapping above"),
    }
}
