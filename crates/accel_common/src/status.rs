//! Status aggregation.
//!
//! Pure reductions from a Change list and the request flags to the one
//! deterministic payload. `active_status` is always recomputed from its
//! inputs and never stored independently, so the persisted record can
//! never drift out of agreement with its own counts.

use crate::model::{
    AccelerationRecord, ActiveStatus, Change, ChangeResult, Mode, PreviousState,
};

/// Counts derived from one pass's Change list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub applied: usize,
    pub skipped: usize,
    pub planned: usize,
}

pub fn compute_counts(changes: &[Change]) -> Counts {
    let mut counts = Counts::default();
    for change in changes {
        match change.result {
            ChangeResult::Applied => counts.applied += 1,
            ChangeResult::Skipped | ChangeResult::NotApplied => counts.skipped += 1,
            ChangeResult::Planned => counts.planned += 1,
            ChangeResult::Restored => {}
        }
    }
    counts
}

/// Tri-state summary. "True" only for a requested, effective pass where
/// something applied and nothing was skipped; a requested pass that
/// fell short in any way is "Partial".
pub fn active_status(
    active_requested: bool,
    effective_active: bool,
    applied_count: usize,
    skipped_count: usize,
) -> ActiveStatus {
    if !active_requested {
        return ActiveStatus::False;
    }
    if effective_active && applied_count > 0 && skipped_count == 0 {
        return ActiveStatus::True;
    }
    ActiveStatus::Partial
}

/// Inputs to [`build_record`]; everything the payload carries that is
/// not derived.
#[derive(Debug, Clone)]
pub struct RecordParts {
    pub platform: String,
    pub timestamp: String,
    pub mode: Mode,
    pub active_requested: bool,
    pub effective_active: bool,
    pub changes: Vec<Change>,
    pub failures: Vec<String>,
    pub applied_actions: Vec<String>,
    pub previous_state: PreviousState,
    pub message: Option<String>,
}

/// Reduce one pass to the persisted/reported payload, deriving counts
/// and active_status on the way.
pub fn build_record(parts: RecordParts) -> AccelerationRecord {
    let counts = compute_counts(&parts.changes);
    let mut applied_actions = parts.applied_actions;
    applied_actions.sort();

    AccelerationRecord {
        active: parts.effective_active,
        active_requested: parts.active_requested,
        effective_active: parts.effective_active,
        active_status: active_status(
            parts.active_requested,
            parts.effective_active,
            counts.applied,
            counts.skipped,
        ),
        platform: parts.platform,
        timestamp: parts.timestamp,
        mode: parts.mode,
        changes_applied: parts.changes,
        failures: parts.failures,
        applied_actions,
        previous_state: parts.previous_state,
        applied_count: counts.applied,
        skipped_count: counts.skipped,
        planned_count: counts.planned,
        message: parts.message,
    }
}
