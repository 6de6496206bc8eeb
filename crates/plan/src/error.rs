//! Plan construction errors.

use planguard_core::UnknownVariant;

/// Errors raised while constructing or rendering a plan.
///
/// Every variant is raised before any state change, so a builder that
/// returned an error holds exactly what it held before the call.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Value outside a closed vocabulary
    #[error("invalid {field} '{value}': must be one of {}", .allowed.join(", "))]
    InvalidValue {
        /// Field being set (e.g. "priority")
        field: &'static str,
        /// Rejected input, as given
        value: String,
        /// Allowed values
        allowed: &'static [&'static str],
    },

    /// Entity failed structural validation
    #[error("invalid {entity}: {}", .errors.join("; "))]
    InvalidEntity {
        /// "task" or "milestone"
        entity: &'static str,
        /// Every violated invariant
        errors: Vec<String>,
    },

    /// Metadata key or value contains a time term or forbidden expression
    #[error("forbidden term '{term}' in metadata for '{key}'")]
    ForbiddenMetadata {
        /// Metadata key
        key: String,
        /// Term or matched expression
        term: String,
    },

    /// Unknown output encoding
    #[error("unsupported output format '{0}': must be one of json, yaml, markdown")]
    UnsupportedFormat(String),

    /// Unknown plan type
    #[error("unsupported plan type '{0}'")]
    UnsupportedPlanType(String),

    /// Mutation attempted after the plan was built
    #[error("plan has already been built; further changes are rejected")]
    AlreadyBuilt,

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PlanError {
    pub(crate) fn invalid_value(field: &'static str, err: UnknownVariant) -> Self {
        PlanError::InvalidValue {
            field,
            value: err.value,
            allowed: err.allowed,
        }
    }
}

/// Result type for plan operations.
pub type Result<T> = std::result::Result<T, PlanError>;
