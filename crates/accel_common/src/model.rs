//! Wire and record types for acceleration passes.
//!
//! Everything here serializes with the exact field and variant strings
//! the persisted record and the status payload use. The record is read
//! back verbatim to drive restore, so these shapes are the compatibility
//! surface of the tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AccelError;

/// Pre-mutation value of one tunable.
///
/// Untagged: integers, soft/hard limit pairs, and raw text all appear
/// naturally in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TunableValue {
    Int(i64),
    Limits { soft: u64, hard: u64 },
    Text(String),
}

impl fmt::Display for TunableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunableValue::Int(n) => write!(f, "{n}"),
            TunableValue::Limits { soft, hard } => write!(f, "soft={soft}, hard={hard}"),
            TunableValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Mapping from tunable name to its captured prior value.
///
/// Unreadable tunables get an explicit `None`, never omission, so the
/// apply engine can tell "unsupported here" from "unknown". BTreeMap
/// keeps serialization order stable across runs.
pub type PreviousState = BTreeMap<String, Option<TunableValue>>;

/// Tunable category, used by the scope filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Gpu,
}

/// Outcome of evaluating one tunable in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeResult {
    Applied,
    Planned,
    Skipped,
    NotApplied,
    Restored,
}

impl ChangeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeResult::Applied => "applied",
            ChangeResult::Planned => "planned",
            ChangeResult::Skipped => "skipped",
            ChangeResult::NotApplied => "not-applied",
            ChangeResult::Restored => "restored",
        }
    }
}

/// One immutable outcome record. The set for one pass is sorted by name
/// before it leaves the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub name: String,
    pub result: ChangeResult,
    pub message: String,
    pub requires_root: bool,
    pub category: Category,
    /// Literal command string, echoed verbatim where one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Tri-state summary of whether requested acceleration is fully, not,
/// or partially realized. Always recomputed from its inputs, never
/// stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveStatus {
    True,
    False,
    Partial,
}

impl ActiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStatus::True => "True",
            ActiveStatus::False => "False",
            ActiveStatus::Partial => "Partial",
        }
    }
}

impl fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invocation mode, recorded in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    On,
    Off,
    Status,
    DryRun,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::On => "on",
            Mode::Off => "off",
            Mode::Status => "status",
            Mode::DryRun => "dry-run",
        }
    }
}

/// Scope filters. `cpu_only` and `gpu_only` are mutually exclusive and
/// rejected at construction, before any capture begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    cpu_only: bool,
    gpu_only: bool,
}

impl Scope {
    pub fn new(cpu_only: bool, gpu_only: bool) -> Result<Self, AccelError> {
        if cpu_only && gpu_only {
            return Err(AccelError::ConflictingScope);
        }
        Ok(Self { cpu_only, gpu_only })
    }

    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Cpu => !self.gpu_only,
            Category::Gpu => !self.cpu_only,
        }
    }
}

/// The persisted/reported payload for one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelerationRecord {
    pub active: bool,
    pub active_requested: bool,
    pub effective_active: bool,
    pub active_status: ActiveStatus,
    pub platform: String,
    pub timestamp: String,
    pub mode: Mode,
    pub changes_applied: Vec<Change>,
    pub failures: Vec<String>,
    pub applied_actions: Vec<String>,
    pub previous_state: PreviousState,
    pub applied_count: usize,
    pub skipped_count: usize,
    pub planned_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
