//! Apply and restore engines.
//!
//! One synchronous pass over the fixed catalog. Per-tunable problems are
//! value-level outcomes (`Change` records plus an advisory failures
//! list), never propagated errors, so one bad tunable cannot abort the
//! rest of the pass. Side effects happen only on the applied/restored
//! branches; every other branch is a pure bookkeeping decision.
//!
//! Guard order per tunable (see DESIGN.md for the derivation):
//! unknown value → risky gate → privilege → tool → dry-run → execute.
//! Restore uses the same order without the risky gate; reverting a
//! risky tunable needs no opt-in.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::catalog::{catalog, Applicability, RiskTier, Tunable};
use crate::context::HostContext;
use crate::host::HostOps;
use crate::model::{Change, ChangeResult, PreviousState, Scope};

/// Caller knobs for an apply pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
    /// Operator opt-in for risky tunables.
    pub allow_risky: bool,
}

/// Output of an apply pass.
#[derive(Debug, Clone, Default)]
pub struct ApplyOutcome {
    /// All outcome records, sorted by name.
    pub changes: Vec<Change>,
    /// Advisory detail for command failures; not a crash signal.
    pub failures: Vec<String>,
    /// Names actually mutated, sorted. Sole driver of restore scope.
    pub applied_actions: Vec<String>,
    /// PreviousState pruned to the tunables actually changed.
    pub applied_previous_state: PreviousState,
}

/// Output of a restore pass.
#[derive(Debug, Clone, Default)]
pub struct RestoreOutcome {
    pub changes: Vec<Change>,
    pub failures: Vec<String>,
}

/// Read the current value of every tunable this host plausibly
/// supports. Unreadable values are stored as explicit nulls so apply
/// can tell "unsupported here" from "unknown". Never aborts: a failed
/// read of one tunable does not disturb the others.
pub fn capture_previous_state(
    host: &dyn HostOps,
    ctx: &HostContext,
    scope: Scope,
) -> PreviousState {
    let mut state = PreviousState::new();
    for tunable in catalog() {
        if tunable.applicability(ctx, scope) != Applicability::Applies {
            continue;
        }
        let value = tunable.read_current(host);
        if value.is_none() {
            debug!(tunable = tunable.name(), "current value unreadable, storing null");
        }
        state.insert(tunable.name().to_string(), value);
    }
    state
}

fn change_for(tunable: &dyn Tunable, result: ChangeResult, message: String, command: Option<String>) -> Change {
    Change {
        name: tunable.name().to_string(),
        result,
        message,
        requires_root: tunable.requires_root(),
        category: tunable.category(),
        command,
    }
}

/// Evaluate every applicable tunable against the captured state and the
/// caller's flags, executing or simulating each one.
pub fn apply_acceleration(
    host: &dyn HostOps,
    ctx: &HostContext,
    scope: Scope,
    previous_state: &PreviousState,
    options: ApplyOptions,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for tunable in catalog() {
        let name = tunable.name();

        match tunable.applicability(ctx, scope) {
            Applicability::NotApplicable => continue,
            Applicability::Unavailable(reason) => {
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Skipped,
                    reason.to_string(),
                    tunable.apply_command(),
                ));
                continue;
            }
            Applicability::Applies => {}
        }

        // Capture was unavailable: nothing safe to do.
        let Some(Some(prev)) = previous_state.get(name) else {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Skipped,
                "current value unknown, capture unavailable".to_string(),
                tunable.apply_command(),
            ));
            continue;
        };

        if tunable.risk() == RiskTier::Risky && !options.allow_risky {
            let result = if options.dry_run {
                ChangeResult::Planned
            } else {
                ChangeResult::NotApplied
            };
            outcome.changes.push(change_for(
                tunable.as_ref(),
                result,
                "opt-in required for risky tunable".to_string(),
                tunable.apply_command(),
            ));
            continue;
        }

        if tunable.requires_root() && !ctx.is_root {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Skipped,
                "root required".to_string(),
                tunable.apply_command(),
            ));
            continue;
        }

        if let Some(tool) = tunable.required_tool() {
            if host.which(tool).is_none() {
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Skipped,
                    format!("{tool} not installed"),
                    tunable.apply_command(),
                ));
                continue;
            }
        }

        if options.dry_run {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Planned,
                tunable.plan_message(),
                tunable.apply_command(),
            ));
            continue;
        }

        match tunable.apply(host, prev) {
            Ok(message) => {
                debug!(tunable = name, "applied");
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Applied,
                    message,
                    tunable.apply_command(),
                ));
                outcome.applied_actions.push(name.to_string());
                outcome
                    .applied_previous_state
                    .insert(name.to_string(), Some(prev.clone()));
            }
            Err(detail) => {
                warn!(tunable = name, detail = %detail, "apply failed");
                outcome.failures.push(format!("{name}: {detail}"));
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Skipped,
                    format!("failed: {detail}"),
                    tunable.apply_command(),
                ));
            }
        }
    }

    outcome.changes.sort_by(|a, b| a.name.cmp(&b.name));
    outcome.applied_actions.sort();
    outcome
}

/// Replay the inverse of only the tunables actually applied, using the
/// persisted PreviousState verbatim, never a live re-probe. Everything
/// outside `applied_actions` is reported as not-applied and never
/// touched, regardless of the tunable's current live value.
pub fn restore_acceleration(
    host: &dyn HostOps,
    ctx: &HostContext,
    previous_state: &PreviousState,
    applied_actions: &[String],
    dry_run: bool,
) -> RestoreOutcome {
    let mut outcome = RestoreOutcome::default();
    let applied: BTreeSet<&str> = applied_actions.iter().map(String::as_str).collect();

    for tunable in catalog() {
        let name = tunable.name();

        if !applied.contains(name) {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::NotApplied,
                "was not applied during --on".to_string(),
                None,
            ));
            continue;
        }

        // An applied name with no recorded value violates the record's
        // invariant; report it rather than guessing at a target.
        let Some(Some(prev)) = previous_state.get(name) else {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Skipped,
                "no recorded prior value".to_string(),
                None,
            ));
            continue;
        };

        if tunable.requires_root() && !ctx.is_root {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Skipped,
                "root required for restore".to_string(),
                tunable.restore_command(prev),
            ));
            continue;
        }

        if let Some(tool) = tunable.required_tool() {
            if host.which(tool).is_none() {
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Skipped,
                    format!("{tool} unavailable for restore"),
                    tunable.restore_command(prev),
                ));
                continue;
            }
        }

        if dry_run {
            outcome.changes.push(change_for(
                tunable.as_ref(),
                ChangeResult::Planned,
                tunable.restore_message(prev),
                tunable.restore_command(prev),
            ));
            continue;
        }

        match tunable.restore(host, prev) {
            Ok(message) => {
                debug!(tunable = name, "restored");
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Restored,
                    message,
                    tunable.restore_command(prev),
                ));
            }
            Err(detail) => {
                warn!(tunable = name, detail = %detail, "restore failed");
                outcome.failures.push(format!("{name} restore: {detail}"));
                outcome.changes.push(change_for(
                    tunable.as_ref(),
                    ChangeResult::Skipped,
                    format!("failed: {detail}"),
                    tunable.restore_command(prev),
                ));
            }
        }
    }

    outcome.changes.sort_by(|a, b| a.name.cmp(&b.name));
    outcome
}
