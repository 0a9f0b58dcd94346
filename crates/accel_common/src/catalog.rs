//! The tunable catalog.
//!
//! A fixed, ordered table of descriptors built at startup, with no runtime
//! discovery. Each tunable declares its policy (category, risk tier,
//! privilege and tool requirements, applicability) and its three
//! behaviors: read the current value, apply the tuned value, restore a
//! recorded prior value. The engines own the guard sequence; the
//! descriptors only ever touch the host through [`HostOps`].

use std::path::Path;

use crate::context::HostContext;
use crate::host::{HostOps, COMMAND_TIMEOUT};
use crate::model::{Category, Scope, TunableValue};

/// Target swap tendency for ML workloads (keep pages in RAM).
const SWAPPINESS_TARGET: i64 = 10;
/// Nice value the apply pass moves the process to.
const NICE_TARGET: i64 = -5;
/// Soft open-file limit floor raised during apply.
const NOFILE_FLOOR: u64 = 65535;
/// Windows priority-class value for "high priority" in wmic terms.
const WMIC_HIGH_PRIORITY: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Normal,
    /// Broader or less-reversible side effects; gated behind explicit opt-in.
    Risky,
}

/// Whether a tunable participates in a pass on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Applies,
    /// Silently outside this host/scope; no record emitted.
    NotApplicable,
    /// In scope but unusable here; emits a skipped record with this reason.
    Unavailable(&'static str),
}

/// One manageable setting. See the module docs for the contract.
pub trait Tunable {
    fn name(&self) -> &'static str;
    fn category(&self) -> Category;

    fn risk(&self) -> RiskTier {
        RiskTier::Normal
    }

    fn requires_root(&self) -> bool {
        false
    }

    /// External tool the apply/restore commands need on PATH.
    fn required_tool(&self) -> Option<&'static str> {
        None
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability;

    /// Current value, or None when unreadable on this host.
    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue>;

    /// Literal apply command, echoed in Change records where one exists.
    fn apply_command(&self) -> Option<String> {
        None
    }

    fn plan_message(&self) -> String;

    /// Apply the tuned value. Ok carries the change message, Err the
    /// failure detail for the pass's failures list.
    fn apply(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String>;

    fn restore_command(&self, _prev: &TunableValue) -> Option<String> {
        None
    }

    fn restore_message(&self, prev: &TunableValue) -> String;

    /// Set the tunable back to `prev`.
    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String>;
}

/// The fixed catalog, in declaration order. Reporting order is
/// normalized by name downstream; this order carries no semantics.
pub fn catalog() -> Vec<Box<dyn Tunable>> {
    vec![
        Box::new(CpuGovernor),
        Box::new(ProcessNice),
        Box::new(Swappiness),
        Box::new(UlimitNofile),
        Box::new(NvidiaPersistence),
        Box::new(WindowsProcessPriority),
        Box::new(WindowsPowerPlan),
    ]
}

fn shape_error(tunable: &str) -> String {
    format!("recorded value for {tunable} has an unexpected shape")
}

fn run_expecting_success(
    host: &dyn HostOps,
    argv: &[&str],
    ok_message: String,
) -> Result<String, String> {
    let out = host.run(argv, COMMAND_TIMEOUT);
    if out.success() {
        Ok(ok_message)
    } else if out.stderr.is_empty() {
        Err(format!("exit code {}", out.code))
    } else {
        Err(out.stderr)
    }
}

// ---------------------------------------------------------------------------
// cpu_governor: Linux CPU frequency governor via cpupower
// ---------------------------------------------------------------------------

struct CpuGovernor;

const GOVERNOR_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor";

impl Tunable for CpuGovernor {
    fn name(&self) -> &'static str {
        "cpu_governor"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn requires_root(&self) -> bool {
        true
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("cpupower")
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_linux && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        let text = host.read_file(Path::new(GOVERNOR_PATH))?;
        let governor = text.trim();
        (!governor.is_empty()).then(|| TunableValue::Text(governor.to_string()))
    }

    fn apply_command(&self) -> Option<String> {
        Some("cpupower frequency-set -g performance".to_string())
    }

    fn plan_message(&self) -> String {
        "would set governor to performance".to_string()
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        run_expecting_success(
            host,
            &["cpupower", "frequency-set", "-g", "performance"],
            "set governor to performance".to_string(),
        )
    }

    fn restore_command(&self, prev: &TunableValue) -> Option<String> {
        Some(format!("cpupower frequency-set -g {prev}"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore governor={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Text(governor) = prev else {
            return Err(shape_error(self.name()));
        };
        run_expecting_success(
            host,
            &["cpupower", "frequency-set", "-g", governor],
            format!("restored governor={governor}"),
        )
    }
}

// ---------------------------------------------------------------------------
// process_nice: scheduling priority of the current process
// ---------------------------------------------------------------------------

struct ProcessNice;

impl Tunable for ProcessNice {
    fn name(&self) -> &'static str {
        "process_nice"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_linux && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        host.current_nice().map(TunableValue::Int)
    }

    fn plan_message(&self) -> String {
        format!("would raise process priority (nice {NICE_TARGET})")
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        host.set_nice(NICE_TARGET)?;
        Ok(format!("raised process priority (nice {NICE_TARGET})"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore nice={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Int(nice) = prev else {
            return Err(shape_error(self.name()));
        };
        host.set_nice(*nice)?;
        Ok(format!("restored nice={nice}"))
    }
}

// ---------------------------------------------------------------------------
// swappiness: kernel swap tendency (risky: affects the whole host)
// ---------------------------------------------------------------------------

struct Swappiness;

const SWAPPINESS_PATH: &str = "/proc/sys/vm/swappiness";

impl Tunable for Swappiness {
    fn name(&self) -> &'static str {
        "swappiness"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn risk(&self) -> RiskTier {
        RiskTier::Risky
    }

    fn requires_root(&self) -> bool {
        true
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("sysctl")
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_linux && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        let text = host.read_file(Path::new(SWAPPINESS_PATH))?;
        text.trim().parse::<i64>().ok().map(TunableValue::Int)
    }

    fn apply_command(&self) -> Option<String> {
        Some(format!("sysctl -w vm.swappiness={SWAPPINESS_TARGET}"))
    }

    fn plan_message(&self) -> String {
        format!("would set vm.swappiness={SWAPPINESS_TARGET}")
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        let setting = format!("vm.swappiness={SWAPPINESS_TARGET}");
        run_expecting_success(
            host,
            &["sysctl", "-w", &setting],
            format!("vm.swappiness set to {SWAPPINESS_TARGET}"),
        )
    }

    fn restore_command(&self, prev: &TunableValue) -> Option<String> {
        Some(format!("sysctl -w vm.swappiness={prev}"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore vm.swappiness={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Int(swappiness) = prev else {
            return Err(shape_error(self.name()));
        };
        let setting = format!("vm.swappiness={swappiness}");
        run_expecting_success(
            host,
            &["sysctl", "-w", &setting],
            format!("restored vm.swappiness={swappiness}"),
        )
    }
}

// ---------------------------------------------------------------------------
// ulimit_nofile: soft open-file limit, direct rlimit call
// ---------------------------------------------------------------------------

struct UlimitNofile;

impl Tunable for UlimitNofile {
    fn name(&self) -> &'static str {
        "ulimit_nofile"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_linux && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        host.nofile_limits()
            .map(|(soft, hard)| TunableValue::Limits { soft, hard })
    }

    fn plan_message(&self) -> String {
        "would raise soft open-file limit".to_string()
    }

    fn apply(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Limits { soft, hard } = prev else {
            return Err(shape_error(self.name()));
        };
        // Raise the soft limit up to the hard cap, never past it.
        let target = (*soft).max(NOFILE_FLOOR).min(*hard);
        host.set_nofile_limits(target, *hard)?;
        Ok(format!("soft limit set to {target}"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore {prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Limits { soft, hard } = prev else {
            return Err(shape_error(self.name()));
        };
        host.set_nofile_limits(*soft, *hard)?;
        Ok(format!("restored soft={soft}, hard={hard}"))
    }
}

// ---------------------------------------------------------------------------
// nvidia_persistence: GPU persistence mode via nvidia-smi
// ---------------------------------------------------------------------------

struct NvidiaPersistence;

impl Tunable for NvidiaPersistence {
    fn name(&self) -> &'static str {
        "nvidia_persistence"
    }

    fn category(&self) -> Category {
        Category::Gpu
    }

    fn requires_root(&self) -> bool {
        true
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("nvidia-smi")
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if !scope.allows(Category::Gpu) {
            Applicability::NotApplicable
        } else if ctx.nvidia_present() {
            Applicability::Applies
        } else {
            Applicability::Unavailable("nvidia-smi not found")
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        let out = host.run(&["nvidia-smi", "-q", "-d", "PERFORMANCE"], COMMAND_TIMEOUT);
        if !out.success() {
            return None;
        }
        let line = out
            .stdout
            .lines()
            .find(|line| line.contains("Persistence Mode"))?;
        let mode = line.split(':').nth(1)?.trim().to_ascii_lowercase();
        matches!(mode.as_str(), "enabled" | "disabled").then(|| TunableValue::Text(mode))
    }

    fn apply_command(&self) -> Option<String> {
        Some("nvidia-smi -pm 1".to_string())
    }

    fn plan_message(&self) -> String {
        "would enable persistence mode".to_string()
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        run_expecting_success(
            host,
            &["nvidia-smi", "-pm", "1"],
            "enabled persistence mode".to_string(),
        )
    }

    fn restore_command(&self, prev: &TunableValue) -> Option<String> {
        let flag = persistence_flag(prev)?;
        Some(format!("nvidia-smi -pm {flag}"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore persistence={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let Some(flag) = persistence_flag(prev) else {
            return Err(shape_error(self.name()));
        };
        run_expecting_success(
            host,
            &["nvidia-smi", "-pm", flag],
            format!("restored persistence={prev}"),
        )
    }
}

fn persistence_flag(prev: &TunableValue) -> Option<&'static str> {
    match prev {
        TunableValue::Text(mode) if mode == "enabled" => Some("1"),
        TunableValue::Text(mode) if mode == "disabled" => Some("0"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// windows_process_priority: priority class via wmic
// ---------------------------------------------------------------------------

struct WindowsProcessPriority;

impl WindowsProcessPriority {
    fn selector() -> String {
        format!("ProcessId={}", std::process::id())
    }
}

impl Tunable for WindowsProcessPriority {
    fn name(&self) -> &'static str {
        "windows_process_priority"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("wmic")
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_windows && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        let selector = Self::selector();
        let out = host.run(
            &["wmic", "process", "where", &selector, "get", "Priority", "/value"],
            COMMAND_TIMEOUT,
        );
        if !out.success() {
            return None;
        }
        // wmic emits "Priority=8" amid blank lines.
        let priority = out
            .stdout
            .lines()
            .find_map(|line| line.trim().strip_prefix("Priority=").map(str::to_string))?;
        priority.parse::<i64>().ok().map(TunableValue::Int)
    }

    fn apply_command(&self) -> Option<String> {
        Some(format!(
            "wmic process where {} call setpriority {WMIC_HIGH_PRIORITY}",
            Self::selector()
        ))
    }

    fn plan_message(&self) -> String {
        "would set HIGH priority class".to_string()
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        let selector = Self::selector();
        let class = WMIC_HIGH_PRIORITY.to_string();
        run_expecting_success(
            host,
            &["wmic", "process", "where", &selector, "call", "setpriority", &class],
            "set HIGH priority class".to_string(),
        )
    }

    fn restore_command(&self, prev: &TunableValue) -> Option<String> {
        let TunableValue::Int(base) = prev else {
            return None;
        };
        Some(format!(
            "wmic process where {} call setpriority {}",
            Self::selector(),
            priority_class_for_base(*base)
        ))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore priority={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Int(base) = prev else {
            return Err(shape_error(self.name()));
        };
        let selector = Self::selector();
        let class = priority_class_for_base(*base).to_string();
        run_expecting_success(
            host,
            &["wmic", "process", "where", &selector, "call", "setpriority", &class],
            format!("restored priority={base}"),
        )
    }
}

/// Map a wmic base priority back to the setpriority class value.
fn priority_class_for_base(base: i64) -> u32 {
    match base {
        4 => 64,       // idle
        6 => 16384,    // below normal
        10 => 32768,   // above normal
        13 => 128,     // high
        24 => 256,     // realtime
        _ => 32,       // normal
    }
}

// ---------------------------------------------------------------------------
// windows_power_plan: active power scheme via powercfg (risky)
// ---------------------------------------------------------------------------

struct WindowsPowerPlan;

impl Tunable for WindowsPowerPlan {
    fn name(&self) -> &'static str {
        "windows_power_plan"
    }

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn risk(&self) -> RiskTier {
        RiskTier::Risky
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("powercfg")
    }

    fn applicability(&self, ctx: &HostContext, scope: Scope) -> Applicability {
        if ctx.is_windows && scope.allows(Category::Cpu) {
            Applicability::Applies
        } else {
            Applicability::NotApplicable
        }
    }

    fn read_current(&self, host: &dyn HostOps) -> Option<TunableValue> {
        let out = host.run(&["powercfg", "/getactivescheme"], COMMAND_TIMEOUT);
        if !out.success() {
            return None;
        }
        extract_scheme_guid(&out.stdout).map(TunableValue::Text)
    }

    fn apply_command(&self) -> Option<String> {
        Some("powercfg /setactive SCHEME_MIN".to_string())
    }

    fn plan_message(&self) -> String {
        "would set high performance power plan".to_string()
    }

    fn apply(&self, host: &dyn HostOps, _prev: &TunableValue) -> Result<String, String> {
        run_expecting_success(
            host,
            &["powercfg", "/setactive", "SCHEME_MIN"],
            "set high performance power plan".to_string(),
        )
    }

    fn restore_command(&self, prev: &TunableValue) -> Option<String> {
        Some(format!("powercfg /setactive {prev}"))
    }

    fn restore_message(&self, prev: &TunableValue) -> String {
        format!("would restore power plan={prev}")
    }

    fn restore(&self, host: &dyn HostOps, prev: &TunableValue) -> Result<String, String> {
        let TunableValue::Text(guid) = prev else {
            return Err(shape_error(self.name()));
        };
        run_expecting_success(
            host,
            &["powercfg", "/setactive", guid],
            format!("restored power plan={guid}"),
        )
    }
}

/// Pull the 36-character scheme GUID out of powercfg's banner line.
fn extract_scheme_guid(stdout: &str) -> Option<String> {
    stdout
        .split_whitespace()
        .find(|token| token.len() == 36 && token.chars().filter(|c| *c == '-').count() == 4)
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeHost;
    use crate::host::OsFamily;
    use std::path::PathBuf;

    fn linux_ctx(host: &FakeHost) -> HostContext {
        HostContext::detect(host)
    }

    #[test]
    fn catalog_names_are_stable() {
        let names: Vec<&str> = catalog().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "cpu_governor",
                "process_nice",
                "swappiness",
                "ulimit_nofile",
                "nvidia_persistence",
                "windows_process_priority",
                "windows_power_plan",
            ]
        );
    }

    #[test]
    fn linux_tunables_respect_scope_filters() {
        let host = FakeHost::linux();
        let ctx = linux_ctx(&host);
        let gpu_only = Scope::new(false, true).unwrap();
        for tunable in catalog() {
            if tunable.category() == Category::Cpu {
                assert_eq!(
                    tunable.applicability(&ctx, gpu_only),
                    Applicability::NotApplicable,
                    "{} should drop out under --gpu-only",
                    tunable.name()
                );
            }
        }
    }

    #[test]
    fn nvidia_unavailable_emits_reason_unless_cpu_only() {
        let host = FakeHost::linux();
        let ctx = linux_ctx(&host);
        let tunable = NvidiaPersistence;
        assert_eq!(
            tunable.applicability(&ctx, Scope::default()),
            Applicability::Unavailable("nvidia-smi not found")
        );
        let cpu_only = Scope::new(true, false).unwrap();
        assert_eq!(
            tunable.applicability(&ctx, cpu_only),
            Applicability::NotApplicable
        );
    }

    #[test]
    fn cpu_governor_reads_sysfs_value() {
        let host = FakeHost::linux();
        assert_eq!(
            CpuGovernor.read_current(&host),
            Some(TunableValue::Text("powersave".into()))
        );
    }

    #[test]
    fn swappiness_reads_proc_value() {
        let host = FakeHost::linux();
        assert_eq!(Swappiness.read_current(&host), Some(TunableValue::Int(60)));
    }

    #[test]
    fn swappiness_unreadable_on_bare_host() {
        let host = FakeHost::new(OsFamily::Linux);
        assert_eq!(Swappiness.read_current(&host), None);
    }

    #[test]
    fn nvidia_persistence_parses_query_output() {
        let host = FakeHost::linux_full();
        assert_eq!(
            NvidiaPersistence.read_current(&host),
            Some(TunableValue::Text("disabled".into()))
        );
    }

    #[test]
    fn nvidia_persistence_rejects_garbage_output() {
        let mut host = FakeHost::linux();
        host.stdout.insert(
            "nvidia-smi -q -d PERFORMANCE".to_string(),
            "Persistence Mode : Pending".to_string(),
        );
        assert_eq!(NvidiaPersistence.read_current(&host), None);
    }

    #[test]
    fn ulimit_apply_caps_target_at_hard_limit() {
        let host = FakeHost::linux();
        host.limits.set(Some((1024, 2048)));
        let prev = TunableValue::Limits { soft: 1024, hard: 2048 };
        let message = UlimitNofile.apply(&host, &prev).unwrap();
        assert_eq!(message, "soft limit set to 2048");
        assert_eq!(host.nofile_limits(), Some((2048, 2048)));
    }

    #[test]
    fn ulimit_apply_keeps_soft_limit_already_above_floor() {
        let host = FakeHost::linux();
        host.limits.set(Some((100_000, 200_000)));
        let prev = TunableValue::Limits { soft: 100_000, hard: 200_000 };
        let message = UlimitNofile.apply(&host, &prev).unwrap();
        assert_eq!(message, "soft limit set to 100000");
    }

    #[test]
    fn ulimit_restore_reinstates_recorded_pair() {
        let host = FakeHost::linux();
        let prev = TunableValue::Limits { soft: 1024, hard: 4096 };
        let message = UlimitNofile.restore(&host, &prev).unwrap();
        assert_eq!(message, "restored soft=1024, hard=4096");
        assert_eq!(host.nofile_limits(), Some((1024, 4096)));
    }

    #[test]
    fn governor_restore_uses_recorded_value_verbatim() {
        let host = FakeHost::linux_full();
        let prev = TunableValue::Text("schedutil".into());
        let message = CpuGovernor.restore(&host, &prev).unwrap();
        assert_eq!(message, "restored governor=schedutil");
        assert_eq!(host.ran(), vec!["cpupower frequency-set -g schedutil"]);
    }

    #[test]
    fn restore_rejects_mismatched_value_shape() {
        let host = FakeHost::linux_full();
        let err = CpuGovernor
            .restore(&host, &TunableValue::Int(3))
            .unwrap_err();
        assert!(err.contains("unexpected shape"));
        assert!(host.ran().is_empty(), "no command for a malformed value");
    }

    #[test]
    fn persistence_flag_maps_modes() {
        assert_eq!(persistence_flag(&TunableValue::Text("enabled".into())), Some("1"));
        assert_eq!(persistence_flag(&TunableValue::Text("disabled".into())), Some("0"));
        assert_eq!(persistence_flag(&TunableValue::Text("unknown".into())), None);
        assert_eq!(persistence_flag(&TunableValue::Int(1)), None);
    }

    #[test]
    fn power_plan_guid_extraction() {
        let banner =
            "Power Scheme GUID: 381b4222-f694-41f0-9685-ff5bb260df2e  (Balanced)";
        assert_eq!(
            extract_scheme_guid(banner).as_deref(),
            Some("381b4222-f694-41f0-9685-ff5bb260df2e")
        );
        assert_eq!(extract_scheme_guid("no guid here"), None);
    }

    #[test]
    fn windows_tunables_apply_on_windows_context_only() {
        let mut host = FakeHost::new(OsFamily::Windows);
        host.tools.insert("powercfg".into(), PathBuf::from("C:/Windows/powercfg.exe"));
        let ctx = HostContext::detect(&host);
        assert_eq!(
            WindowsPowerPlan.applicability(&ctx, Scope::default()),
            Applicability::Applies
        );
        assert_eq!(
            CpuGovernor.applicability(&ctx, Scope::default()),
            Applicability::NotApplicable
        );
    }

    #[test]
    fn priority_class_round_trip_defaults_to_normal() {
        assert_eq!(priority_class_for_base(13), 128);
        assert_eq!(priority_class_for_base(8), 32);
        assert_eq!(priority_class_for_base(99), 32);
    }
}
