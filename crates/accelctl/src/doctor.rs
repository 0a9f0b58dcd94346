//! Read-only environment report.
//!
//! Reports facts the tuning engines care about (platform, privilege,
//! tool presence, current tunable values, NVIDIA driver version) and
//! changes nothing. Never persists a record.

use owo_colors::OwoColorize;
use serde::Serialize;

use accel_common::context::nvidia_driver_version;
use accel_common::engine::capture_previous_state;
use accel_common::model::{Scope, TunableValue};
use accel_common::{HostContext, HostOps};

#[derive(Debug, Clone, Serialize)]
pub struct ToolPresence {
    pub name: String,
    pub found: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub platform: String,
    pub kernel: Option<String>,
    pub cpus: usize,
    pub total_memory_mb: u64,
    pub is_root: bool,
    pub tools: Vec<ToolPresence>,
    pub cpu_governor: Option<String>,
    pub swappiness: Option<i64>,
    pub nofile_soft: Option<u64>,
    pub nofile_hard: Option<u64>,
    pub nvidia_driver: Option<String>,
}

pub fn gather(host: &dyn HostOps, ctx: &HostContext) -> DoctorReport {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();

    // Reuse the capture path for current values; it degrades to nulls
    // instead of failing, which is exactly what a report wants.
    let state = capture_previous_state(host, ctx, Scope::default());
    let cpu_governor = match state.get("cpu_governor") {
        Some(Some(TunableValue::Text(governor))) => Some(governor.clone()),
        _ => None,
    };
    let swappiness = match state.get("swappiness") {
        Some(Some(TunableValue::Int(value))) => Some(*value),
        _ => None,
    };
    let (nofile_soft, nofile_hard) = match host.nofile_limits() {
        Some((soft, hard)) => (Some(soft), Some(hard)),
        None => (None, None),
    };

    DoctorReport {
        platform: ctx.platform.clone(),
        kernel: sysinfo::System::kernel_version(),
        cpus: num_cpus::get(),
        total_memory_mb: sys.total_memory() / (1024 * 1024),
        is_root: ctx.is_root,
        tools: ["cpupower", "sysctl", "nvidia-smi", "powercfg"]
            .into_iter()
            .map(|name| ToolPresence {
                name: name.to_string(),
                found: host.which(name).is_some(),
            })
            .collect(),
        cpu_governor,
        swappiness,
        nofile_soft,
        nofile_hard,
        nvidia_driver: nvidia_driver_version(host),
    }
}

pub fn render(report: &DoctorReport) {
    println!("{}", "environment report".bold());
    println!("  platform         {}", report.platform);
    if let Some(kernel) = &report.kernel {
        println!("  kernel           {kernel}");
    }
    println!("  cpus             {}", report.cpus);
    println!("  memory           {} MiB", report.total_memory_mb);
    println!("  privileged       {}", yes_no(report.is_root));
    for tool in &report.tools {
        println!("  tool {:<12} {}", tool.name, found_mark(tool.found));
    }
    println!("  cpu_governor     {}", or_absent(report.cpu_governor.as_deref()));
    println!(
        "  swappiness       {}",
        or_absent(report.swappiness.map(|v| v.to_string()).as_deref())
    );
    match (report.nofile_soft, report.nofile_hard) {
        (Some(soft), Some(hard)) => println!("  nofile           soft={soft} hard={hard}"),
        _ => println!("  nofile           {}", "unavailable".dimmed()),
    }
    println!(
        "  nvidia driver    {}",
        or_absent(report.nvidia_driver.as_deref())
    );
}

pub fn run_report(host: &dyn HostOps, ctx: &HostContext, verbose: bool) {
    let report = gather(host, ctx);
    render(&report);
    if verbose {
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            eprintln!("{json}");
        }
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".yellow().to_string()
    }
}

fn found_mark(found: bool) -> String {
    if found {
        "found".green().to_string()
    } else {
        "missing".yellow().to_string()
    }
}

fn or_absent(value: Option<&str>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "unavailable".dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> DoctorReport {
        DoctorReport {
            platform: "linux".into(),
            kernel: Some("6.8.0".into()),
            cpus: 16,
            total_memory_mb: 64_000,
            is_root: false,
            tools: vec![
                ToolPresence { name: "cpupower".into(), found: true },
                ToolPresence { name: "nvidia-smi".into(), found: false },
            ],
            cpu_governor: Some("powersave".into()),
            swappiness: Some(60),
            nofile_soft: Some(1024),
            nofile_hard: Some(4096),
            nvidia_driver: None,
        }
    }

    #[test]
    fn report_serializes_with_stable_keys() {
        let json = serde_json::to_string(&sample_report()).unwrap();
        for key in ["platform", "cpus", "tools", "cpu_governor", "nvidia_driver"] {
            assert!(json.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn helpers_spell_out_presence() {
        assert!(found_mark(true).contains("found"));
        assert!(found_mark(false).contains("missing"));
        assert!(or_absent(None).contains("unavailable"));
        assert!(or_absent(Some("535.154.05")).contains("535.154.05"));
    }
}
