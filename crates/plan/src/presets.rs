//! Builders pre-configured for a planning agent.

use planguard_core::PlanType;
use std::fmt;
use std::str::FromStr;

use crate::builder::PlanBuilder;
use crate::error::PlanError;

/// A planning agent with a fixed plan type and focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentProfile {
    /// Sprint planning
    ProjectManager,
    /// Technical design
    SystemArchitect,
    /// Requirements and acceptance
    RequirementsAnalyst,
}

impl AgentProfile {
    /// Agent names.
    pub const NAMES: &'static [&'static str] =
        &["project-manager", "system-architect", "requirements-analyst"];

    /// Agent name, as recorded in plan metadata.
    pub fn name(&self) -> &'static str {
        match self {
            AgentProfile::ProjectManager => "project-manager",
            AgentProfile::SystemArchitect => "system-architect",
            AgentProfile::RequirementsAnalyst => "requirements-analyst",
        }
    }

    /// Plan type the agent produces.
    pub fn plan_type(&self) -> PlanType {
        match self {
            AgentProfile::ProjectManager => PlanType::Sprint,
            AgentProfile::SystemArchitect => PlanType::Architecture,
            AgentProfile::RequirementsAnalyst => PlanType::Requirements,
        }
    }

    /// Focus label.
    pub fn focus(&self) -> &'static str {
        match self {
            AgentProfile::ProjectManager => "task_breakdown_and_prioritization",
            AgentProfile::SystemArchitect => "technical_design_and_dependencies",
            AgentProfile::RequirementsAnalyst => "success_criteria_and_acceptance",
        }
    }
}

impl fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentProfile {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project-manager" => Ok(AgentProfile::ProjectManager),
            "system-architect" => Ok(AgentProfile::SystemArchitect),
            "requirements-analyst" => Ok(AgentProfile::RequirementsAnalyst),
            _ => Err(PlanError::InvalidValue {
                field: "agent",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl PlanBuilder {
    /// Open builder for `agent`, with `agent` and `focus` metadata set.
    pub fn for_agent(agent: AgentProfile) -> Self {
        let mut builder = PlanBuilder::new(agent.plan_type());
        builder.insert_metadata("agent", agent.name());
        builder.insert_metadata("focus", agent.focus());
        builder
    }
}
