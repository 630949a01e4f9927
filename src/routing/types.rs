use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::hooks::NamedHookResult;
use crate::routing::RoutingError;

/// Capability domain a task can be routed to.
///
/// The declaration order is the tie-break priority: when a single "first"
/// department is needed, the lowest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Strategic,
    Experience,
    Technical,
}

impl Department {
    pub const ALL: [Department; 3] = [
        Department::Strategic,
        Department::Experience,
        Department::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Strategic => "strategic",
            Department::Experience => "experience",
            Department::Technical => "technical",
        }
    }

    pub fn all() -> BTreeSet<Department> {
        Self::ALL.into_iter().collect()
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strategic" => Ok(Department::Strategic),
            "experience" => Ok(Department::Experience),
            "technical" => Ok(Department::Technical),
            _ => Err(format!("Unknown department: {}", s)),
        }
    }
}

/// Routing tiers, ordered from least to most coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingKind {
    SingleDomain,
    DomainWithHelpers,
    MultiDomain,
    Executive,
}

impl std::fmt::Display for RoutingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingKind::SingleDomain => write!(f, "single-domain"),
            RoutingKind::DomainWithHelpers => write!(f, "domain-with-helpers"),
            RoutingKind::MultiDomain => write!(f, "multi-domain"),
            RoutingKind::Executive => write!(f, "executive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinationMode {
    PeerToPeer,
    Hierarchical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RoutingDecision {
    SingleDomain {
        department: Department,
    },
    DomainWithHelpers {
        primary: Department,
        helpers: Vec<String>,
        supporting: Vec<Department>,
    },
    MultiDomain {
        departments: Vec<Department>,
        coordination: CoordinationMode,
        /// Departments added to reach two peers that no keyword detected.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        padded: Vec<Department>,
    },
    Executive {
        departments: Vec<Department>,
        coordination: CoordinationMode,
    },
}

impl RoutingDecision {
    pub fn kind(&self) -> RoutingKind {
        match self {
            RoutingDecision::SingleDomain { .. } => RoutingKind::SingleDomain,
            RoutingDecision::DomainWithHelpers { .. } => RoutingKind::DomainWithHelpers,
            RoutingDecision::MultiDomain { .. } => RoutingKind::MultiDomain,
            RoutingDecision::Executive { .. } => RoutingKind::Executive,
        }
    }

    /// Every department engaged by this decision, primary first.
    pub fn departments(&self) -> Vec<Department> {
        match self {
            RoutingDecision::SingleDomain { department } => vec![*department],
            RoutingDecision::DomainWithHelpers {
                primary,
                supporting,
                ..
            } => {
                let mut all = vec![*primary];
                all.extend(supporting.iter().copied());
                all
            }
            RoutingDecision::MultiDomain { departments, .. }
            | RoutingDecision::Executive { departments, .. } => departments.clone(),
        }
    }
}

/// A task submitted for classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    command: String,
    args: Vec<String>,
    #[serde(default)]
    context: Value,
}

impl TaskRequest {
    pub fn new(command: impl Into<String>, args: Vec<String>, context: Value) -> Self {
        let context = match context {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Self {
            command: command.into(),
            args,
            context,
        }
    }

    /// Build a request from untyped JSON, e.g. `{"command": "...", "args": [...], "context": {...}}`.
    ///
    /// Scalar args are coerced to strings; nested values in `args` are rejected.
    pub fn from_json(value: &Value) -> Result<Self, RoutingError> {
        let command = match value.get("command") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(RoutingError::InvalidArgument {
                    field: "command".to_string(),
                    reason: format!("expected a string, got {}", json_type(other)),
                });
            }
        };

        let args = match value.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_arg(i, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(RoutingError::InvalidArgument {
                    field: "args".to_string(),
                    reason: format!("expected an array, got {}", json_type(other)),
                });
            }
        };

        let context = match value.get("context") {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(ctx @ Value::Object(_)) => ctx.clone(),
            Some(other) => {
                return Err(RoutingError::InvalidArgument {
                    field: "context".to_string(),
                    reason: format!("expected an object, got {}", json_type(other)),
                });
            }
        };

        Ok(Self {
            command,
            args,
            context,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Lowercased `command + " " + args.join(" ")`, the text all keyword tables match against.
    pub fn text(&self) -> String {
        format!("{} {}", self.command, self.args.join(" ")).to_lowercase()
    }

    pub fn previous_task_count(&self) -> usize {
        self.context
            .get("previousTasks")
            .or_else(|| self.context.get("previous_tasks"))
            .and_then(Value::as_array)
            .map(|tasks| tasks.len())
            .unwrap_or(0)
    }
}

fn coerce_arg(index: usize, item: &Value) -> Result<String, RoutingError> {
    match item {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(RoutingError::InvalidArgument {
            field: format!("args[{}]", index),
            reason: format!("expected a string, got {}", json_type(other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingAnalysis {
    pub complexity: f32,
    pub departments: Vec<Department>,
    pub executive_need: bool,
    pub decision: RoutingDecision,
    pub reasoning: String,
}

impl RoutingAnalysis {
    pub fn kind(&self) -> RoutingKind {
        self.decision.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingResult {
    pub request_id: String,
    pub routed_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RoutingKind,
    pub complexity: f32,
    #[serde(rename = "domains")]
    pub departments: Vec<Department>,
    pub decision: RoutingDecision,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub dispatcher_results: Vec<NamedHookResult>,
}
