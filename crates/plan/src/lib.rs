//! PlanGuard plan builder.
//!
//! Plans are assembled only through validated construction steps. Every
//! text field is screened against the rule catalog on insertion, so a built
//! plan cannot carry a time estimate.

#![warn(missing_docs)]

pub mod error;
pub mod document;
pub mod entity;
pub mod builder;
pub mod render;
pub mod presets;
pub mod api;

pub use error::{PlanError, Result};
pub use document::{Compliance, PlanDocument, PrioritizedTasks, TaskEntry, PLAN_VERSION};
pub use entity::{EntityReport, PlanEntity, StructuredOutput};
pub use builder::PlanBuilder;
pub use render::{render, to_markdown};
pub use presets::AgentProfile;
pub use api::{create_roadmap, create_task_list, MilestoneSpec, PhaseSpec, PlanSpec, TaskSpec};
