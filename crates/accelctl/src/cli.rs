//! Command-line surface and mode orchestration.
//!
//! The flags mirror the tool's three verbs plus the doctor report:
//! `--on` applies, `--off` restores, `--status` (the default) reports,
//! `--doctor` prints read-only environment facts. Scope and mode
//! conflicts are rejected before any capture begins.

use std::path::{Path, PathBuf};

use clap::Parser;

use accel_common::engine::{self, ApplyOptions};
use accel_common::model::Mode;
use accel_common::state;
use accel_common::status::{build_record, RecordParts};
use accel_common::{AccelError, AccelerationRecord, HostContext, HostOps, RealHost, Scope};

use crate::doctor;
use crate::output;

/// Environment toggle enabling risky tunables.
pub const RISKY_ENV: &str = "ACCELCTL_ALLOW_RISKY";

#[derive(Debug, Parser)]
#[command(
    name = "accelctl",
    about = "Reversible, audited performance tuning for ML workloads",
    version
)]
pub struct Cli {
    /// Enable acceleration mode.
    #[arg(long)]
    pub on: bool,

    /// Restore previous system settings.
    #[arg(long)]
    pub off: bool,

    /// Show current acceleration state.
    #[arg(long)]
    pub status: bool,

    /// Print a read-only environment report.
    #[arg(long)]
    pub doctor: bool,

    /// Show what would be changed without executing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print detailed state and command information.
    #[arg(long)]
    pub verbose: bool,

    /// Apply CPU optimizations only.
    #[arg(long)]
    pub cpu_only: bool,

    /// Apply GPU optimizations only.
    #[arg(long)]
    pub gpu_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    Status,
    Doctor,
}

/// Pick the single requested action; no flag means status.
pub fn select_action(cli: &Cli) -> Result<Action, AccelError> {
    let picked = [cli.on, cli.off, cli.status, cli.doctor]
        .iter()
        .filter(|flag| **flag)
        .count();
    if picked > 1 {
        return Err(AccelError::ConflictingModes);
    }
    if cli.on {
        Ok(Action::On)
    } else if cli.off {
        Ok(Action::Off)
    } else if cli.doctor {
        Ok(Action::Doctor)
    } else {
        Ok(Action::Status)
    }
}

/// Interpret the risky opt-in toggle value.
pub fn risky_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn allow_risky() -> bool {
    std::env::var(RISKY_ENV)
        .map(|value| risky_enabled(&value))
        .unwrap_or(false)
}

pub fn run(cli: &Cli) -> Result<(), AccelError> {
    let host = RealHost::new();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    run_in(cli, &host, &cwd)
}

/// Orchestrate one invocation against an explicit host and state
/// directory. The record is persisted in `state_dir` only for real
/// `--on`/`--off` runs; dry runs leave the directory untouched.
pub fn run_in(cli: &Cli, host: &dyn HostOps, state_dir: &Path) -> Result<(), AccelError> {
    let scope = Scope::new(cli.cpu_only, cli.gpu_only)?;
    let action = select_action(cli)?;

    let ctx = HostContext::detect(host);

    match action {
        Action::Doctor => {
            doctor::run_report(host, &ctx, cli.verbose);
            Ok(())
        }
        Action::Status => {
            let record = match state::load(state_dir)? {
                Some(existing) => existing,
                None => empty_record(&ctx, Mode::Status, None),
            };
            emit(&record, cli.verbose);
            Ok(())
        }
        Action::On => {
            let previous_state = engine::capture_previous_state(host, &ctx, scope);
            let outcome = engine::apply_acceleration(
                host,
                &ctx,
                scope,
                &previous_state,
                ApplyOptions {
                    dry_run: cli.dry_run,
                    allow_risky: allow_risky(),
                },
            );

            let effective_active = !cli.dry_run && !outcome.applied_actions.is_empty();
            let record = build_record(RecordParts {
                platform: ctx.platform.clone(),
                timestamp: state::utc_now(),
                mode: if cli.dry_run { Mode::DryRun } else { Mode::On },
                active_requested: true,
                effective_active,
                changes: outcome.changes,
                failures: outcome.failures,
                applied_actions: outcome.applied_actions,
                previous_state: outcome.applied_previous_state,
                message: None,
            });

            if !cli.dry_run {
                state::save(&record, state_dir)?;
            }
            emit(&record, cli.verbose);
            Ok(())
        }
        Action::Off => {
            let Some(existing) = state::load(state_dir)? else {
                let record = empty_record(
                    &ctx,
                    Mode::Off,
                    Some("No active acceleration record found.".to_string()),
                );
                emit(&record, cli.verbose);
                return Ok(());
            };

            let outcome = engine::restore_acceleration(
                host,
                &ctx,
                &existing.previous_state,
                &existing.applied_actions,
                cli.dry_run,
            );

            let record = build_record(RecordParts {
                platform: ctx.platform.clone(),
                timestamp: state::utc_now(),
                mode: if cli.dry_run { Mode::DryRun } else { Mode::Off },
                active_requested: false,
                effective_active: false,
                changes: outcome.changes,
                failures: outcome.failures,
                applied_actions: Vec::new(),
                previous_state: existing.previous_state,
                message: None,
            });

            if !cli.dry_run {
                state::save(&record, state_dir)?;
            }
            emit(&record, cli.verbose);
            Ok(())
        }
    }
}

fn empty_record(ctx: &HostContext, mode: Mode, message: Option<String>) -> AccelerationRecord {
    build_record(RecordParts {
        platform: ctx.platform.clone(),
        timestamp: state::utc_now(),
        mode,
        active_requested: false,
        effective_active: false,
        changes: Vec::new(),
        failures: Vec::new(),
        applied_actions: Vec::new(),
        previous_state: Default::default(),
        message,
    })
}

fn emit(record: &AccelerationRecord, verbose: bool) {
    if verbose {
        if let Ok(json) = serde_json::to_string_pretty(record) {
            eprintln!("{json}");
        }
    }
    output::render_status(record, verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("accelctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_status() {
        let cli = parse(&[]);
        assert_eq!(select_action(&cli).unwrap(), Action::Status);
    }

    #[test]
    fn single_mode_flags_select_their_action() {
        assert_eq!(select_action(&parse(&["--on"])).unwrap(), Action::On);
        assert_eq!(select_action(&parse(&["--off"])).unwrap(), Action::Off);
        assert_eq!(select_action(&parse(&["--doctor"])).unwrap(), Action::Doctor);
    }

    #[test]
    fn conflicting_mode_flags_are_rejected() {
        let err = select_action(&parse(&["--on", "--off"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn conflicting_scope_flags_are_rejected() {
        let cli = parse(&["--on", "--cpu-only", "--gpu-only"]);
        let err = Scope::new(cli.cpu_only, cli.gpu_only).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn dry_run_flag_parses_with_any_mode() {
        let cli = parse(&["--on", "--dry-run", "--verbose"]);
        assert!(cli.dry_run && cli.verbose);
    }

    #[test]
    fn dry_run_on_never_persists_a_record() {
        let dir = tempfile::tempdir().unwrap();
        run_in(&parse(&["--on", "--dry-run"]), &RealHost::new(), dir.path()).unwrap();
        assert!(!dir.path().join(state::STATE_FILE_NAME).exists());
    }

    #[test]
    fn dry_run_off_leaves_an_existing_record_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let host = RealHost::new();
        let ctx = HostContext::detect(&host);
        let saved = empty_record(&ctx, Mode::On, None);
        state::save(&saved, dir.path()).unwrap();

        run_in(&parse(&["--off", "--dry-run"]), &host, dir.path()).unwrap();

        let reloaded = state::load(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.timestamp, saved.timestamp);
        assert_eq!(reloaded.mode.as_str(), saved.mode.as_str());
    }

    #[test]
    fn off_without_a_record_does_not_create_one() {
        let dir = tempfile::tempdir().unwrap();
        run_in(&parse(&["--off"]), &RealHost::new(), dir.path()).unwrap();
        assert!(!dir.path().join(state::STATE_FILE_NAME).exists());
    }

    #[test]
    fn risky_toggle_accepts_the_usual_truthy_spellings() {
        for value in ["1", "true", "YES", " on "] {
            assert!(risky_enabled(value), "{value:?} should enable risky");
        }
        for value in ["", "0", "false", "off", "maybe"] {
            assert!(!risky_enabled(value), "{value:?} should not enable risky");
        }
    }
}
