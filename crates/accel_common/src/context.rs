//! Host context detection.
//!
//! A pure read-only probe of per-invocation facts: OS family, privilege,
//! and NVIDIA tool presence. Detection must never fail the process:
//! any error degrades to "capability absent". The result is created
//! once and never mutated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{HostOps, OsFamily, COMMAND_TIMEOUT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostContext {
    /// OS tag: "linux", "windows", "macos", or "other".
    pub platform: String,
    pub is_linux: bool,
    pub is_windows: bool,
    pub is_macos: bool,
    pub is_root: bool,
    /// Resolved path of nvidia-smi, if present on PATH.
    pub nvidia_smi: Option<PathBuf>,
}

impl HostContext {
    pub fn detect(host: &dyn HostOps) -> Self {
        let family = host.os_family();
        let nvidia_smi = host.which("nvidia-smi");
        let ctx = Self {
            platform: match family {
                OsFamily::Linux => "linux",
                OsFamily::Windows => "windows",
                OsFamily::Macos => "macos",
                OsFamily::Other => "other",
            }
            .to_string(),
            is_linux: family == OsFamily::Linux,
            is_windows: family == OsFamily::Windows,
            is_macos: family == OsFamily::Macos,
            is_root: host.is_root(),
            nvidia_smi,
        };
        debug!(
            platform = %ctx.platform,
            is_root = ctx.is_root,
            nvidia = ctx.nvidia_present(),
            "detected host context"
        );
        ctx
    }

    pub fn nvidia_present(&self) -> bool {
        self.nvidia_smi.is_some()
    }
}

/// NVIDIA driver version, resolved by an ordered chain of detectors;
/// the first one returning a value wins.
pub fn nvidia_driver_version(host: &dyn HostOps) -> Option<String> {
    let detectors: &[fn(&dyn HostOps) -> Option<String>] =
        &[driver_version_from_smi, driver_version_from_proc];
    detectors.iter().find_map(|detect| detect(host))
}

fn driver_version_from_smi(host: &dyn HostOps) -> Option<String> {
    host.which("nvidia-smi")?;
    let out = host.run(
        &[
            "nvidia-smi",
            "--query-gpu=driver_version",
            "--format=csv,noheader",
        ],
        COMMAND_TIMEOUT,
    );
    if !out.success() {
        return None;
    }
    let version = out.stdout.lines().next()?.trim();
    (!version.is_empty()).then(|| version.to_string())
}

fn driver_version_from_proc(host: &dyn HostOps) -> Option<String> {
    let text = host.read_file(Path::new("/proc/driver/nvidia/version"))?;
    // First line looks like:
    // NVRM version: NVIDIA UNIX x86_64 Kernel Module  535.154.05  ...
    let line = text.lines().find(|line| line.contains("Kernel Module"))?;
    line.split_whitespace()
        .find(|token| {
            token.chars().next().is_some_and(|c| c.is_ascii_digit()) && token.contains('.')
        })
        .map(|token| token.to_string())
}
