//! Closed planning vocabularies.
//!
//! Every planning attribute is a closed set. Lookups from free text go
//! through `parse`, which returns `None` for anything outside the set so the
//! caller can echo the offending input in its own error.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Terms that must never appear in a task name (case-insensitive substring).
pub const TIME_UNIT_TERMS: &[&str] = &["hour", "day", "week", "month", "quarter", "year"];

/// Terms rejected in free-form plan metadata values.
pub const METADATA_FORBIDDEN_TERMS: &[&str] = &["day", "week", "month", "hour", "deadline", "due date"];

/// Error returned when a string is not a member of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}': must be one of {}", .allowed.join(", "))]
pub struct UnknownVariant {
    /// Vocabulary name (e.g. "priority")
    pub kind: &'static str,
    /// The rejected input, as given
    pub value: String,
    /// Allowed wire values
    pub allowed: &'static [&'static str],
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str, allowed: &'static [&'static str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            allowed,
        }
    }
}

/// Priority level.
///
/// Ordered for grouping only: `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Must happen first
    Critical,
    /// Next in line
    High,
    /// Normal priority
    Medium,
    /// Can wait
    Low,
}

impl Priority {
    /// All priorities, highest first.
    pub const ALL: [Priority; 4] = [Priority::Critical, Priority::High, Priority::Medium, Priority::Low];

    /// Wire values, highest first.
    pub const NAMES: &'static [&'static str] = &["critical", "high", "medium", "low"];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 3,
            Priority::High => 2,
            Priority::Medium => 1,
            Priority::Low => 0,
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownVariant::new("priority", s, Self::NAMES))
    }
}

/// Complexity rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Straightforward work
    Simple,
    /// Some unknowns
    Moderate,
    /// Many moving parts
    Complex,
}

impl Complexity {
    /// Wire values.
    pub const NAMES: &'static [&'static str] = &["simple", "moderate", "complex"];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Some(Complexity::Simple),
            "moderate" => Some(Complexity::Moderate),
            "complex" => Some(Complexity::Complex),
            _ => None,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownVariant::new("complexity", s, Self::NAMES))
    }
}

/// Relative size. Independent of [`Complexity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    /// Fits in one sitting
    Small,
    /// A few related changes
    Medium,
    /// Touches several components
    Large,
    /// Should be split before it is scheduled
    ExtraLarge,
}

impl Size {
    /// Wire values.
    pub const NAMES: &'static [&'static str] = &["small", "medium", "large", "extra_large"];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::ExtraLarge => "extra_large",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(Size::Small),
            "medium" => Some(Size::Medium),
            "large" => Some(Size::Large),
            "extra_large" => Some(Size::ExtraLarge),
            _ => None,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownVariant::new("size", s, Self::NAMES))
    }
}

/// Kind of plan a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Flat prioritized task list
    TaskList,
    /// Phased roadmap with milestones
    Roadmap,
    /// Sprint backlog
    Sprint,
    /// Architecture plan
    Architecture,
    /// Requirements breakdown
    Requirements,
}

impl PlanType {
    /// Wire values.
    pub const NAMES: &'static [&'static str] = &["task_list", "roadmap", "sprint", "architecture", "requirements"];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::TaskList => "task_list",
            PlanType::Roadmap => "roadmap",
            PlanType::Sprint => "sprint",
            PlanType::Architecture => "architecture",
            PlanType::Requirements => "requirements",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "task_list" => Some(PlanType::TaskList),
            "roadmap" => Some(PlanType::Roadmap),
            "sprint" => Some(PlanType::Sprint),
            "architecture" => Some(PlanType::Architecture),
            "requirements" => Some(PlanType::Requirements),
            _ => None,
        }
    }

    /// Human-readable title, e.g. "Task List".
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownVariant::new("plan type", s, Self::NAMES))
    }
}

/// Serialized plan encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Nested key/value document
    Json,
    /// Same document as line-oriented markup
    #[default]
    Yaml,
    /// Heading-structured narrative
    Markdown,
}

impl OutputFormat {
    /// Wire values.
    pub const NAMES: &'static [&'static str] = &["json", "yaml", "markdown"];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Markdown => "markdown",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" => Some(OutputFormat::Yaml),
            "markdown" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownVariant::new("output format", s, Self::NAMES))
    }
}

/// Returns the first term from `terms` found in `text` (case-insensitive substring).
pub fn find_forbidden_term<'a>(text: &str, terms: &[&'a str]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    terms.iter().copied().find(|term| lower.contains(term))
}
