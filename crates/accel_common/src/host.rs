//! Host operations seam.
//!
//! Every touch of the real system (command execution, sysfs reads,
//! privilege probes, rlimit and nice syscalls) goes through [`HostOps`]
//! so the engines can be exercised against a scripted host in tests.
//!
//! `run` never returns `Err`: spawn failures and timeouts fold into a
//! non-zero exit code with explanatory stderr text, so callers handle
//! exactly one shape of command outcome.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Fixed timeout for every external command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Cap captured output so a chatty tool cannot balloon the record.
const MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Exit code; -1 for spawn failure, timeout, or a signal death.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    fn failed(stderr: String) -> Self {
        Self {
            code: -1,
            stdout: String::new(),
            stderr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
    Macos,
    Other,
}

/// The seam between the engines and the machine they tune.
pub trait HostOps {
    fn os_family(&self) -> OsFamily;

    /// Effective-root (or admin) probe. Detection errors degrade to false.
    fn is_root(&self) -> bool;

    /// PATH lookup for an external tool.
    fn which(&self, tool: &str) -> Option<PathBuf>;

    /// Read a small text file (sysfs/procfs values). None on any error.
    fn read_file(&self, path: &Path) -> Option<String>;

    /// Run `argv` to completion under `timeout`.
    fn run(&self, argv: &[&str], timeout: Duration) -> CmdOutput;

    /// Current process nice value.
    fn current_nice(&self) -> Option<i64>;

    /// Set the process nice value (absolute).
    fn set_nice(&self, value: i64) -> Result<(), String>;

    /// Current RLIMIT_NOFILE (soft, hard).
    fn nofile_limits(&self) -> Option<(u64, u64)>;

    fn set_nofile_limits(&self, soft: u64, hard: u64) -> Result<(), String>;
}

/// The real machine.
#[derive(Debug, Default)]
pub struct RealHost;

impl RealHost {
    pub fn new() -> Self {
        Self
    }
}

impl HostOps for RealHost {
    fn os_family(&self) -> OsFamily {
        match env::consts::OS {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::Macos,
            _ => OsFamily::Other,
        }
    }

    #[cfg(unix)]
    fn is_root(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn is_root(&self) -> bool {
        false
    }

    fn which(&self, tool: &str) -> Option<PathBuf> {
        let path = env::var_os("PATH")?;
        for dir in env::split_paths(&path) {
            let candidate = dir.join(tool);
            if candidate.is_file() {
                return Some(candidate);
            }
            let exe = dir.join(format!("{tool}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn run(&self, argv: &[&str], timeout: Duration) -> CmdOutput {
        let Some((program, args)) = argv.split_first() else {
            return CmdOutput::failed("empty command".to_string());
        };
        debug!(command = %argv.join(" "), "running external command");

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => return CmdOutput::failed(format!("spawn failed: {err}")),
        };

        // Drain both pipes off-thread while polling for exit; a child
        // that fills an undrained pipe buffer would otherwise block and
        // mis-report as a timeout.
        let stdout_reader = drain_pipe(child.stdout.take());
        let stderr_reader = drain_pipe(child.stderr.take());

        // Poll until exit or deadline; no cancellation mid-command.
        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return CmdOutput::failed(format!(
                            "timed out after {}s",
                            timeout.as_secs()
                        ));
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                Err(err) => {
                    let _ = child.kill();
                    return CmdOutput::failed(format!("wait failed: {err}"));
                }
            }
        };

        CmdOutput {
            code: status.code().unwrap_or(-1),
            stdout: truncate_output(&stdout_reader.join().unwrap_or_default()),
            stderr: truncate_output(&stderr_reader.join().unwrap_or_default()),
        }
    }

    #[cfg(unix)]
    fn current_nice(&self) -> Option<i64> {
        // getpriority for the calling process cannot meaningfully fail;
        // -1 is a legitimate nice value.
        Some(unsafe { libc::getpriority(libc::PRIO_PROCESS as _, 0) } as i64)
    }

    #[cfg(not(unix))]
    fn current_nice(&self) -> Option<i64> {
        None
    }

    #[cfg(unix)]
    fn set_nice(&self, value: i64) -> Result<(), String> {
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, 0, value as libc::c_int) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error().to_string())
        }
    }

    #[cfg(not(unix))]
    fn set_nice(&self, _value: i64) -> Result<(), String> {
        Err("nice is not supported on this platform".to_string())
    }

    #[cfg(unix)]
    fn nofile_limits(&self) -> Option<(u64, u64)> {
        let mut limits = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE as _, &mut limits) };
        (rc == 0).then_some((limits.rlim_cur as u64, limits.rlim_max as u64))
    }

    #[cfg(not(unix))]
    fn nofile_limits(&self) -> Option<(u64, u64)> {
        None
    }

    #[cfg(unix)]
    fn set_nofile_limits(&self, soft: u64, hard: u64) -> Result<(), String> {
        let limits = libc::rlimit {
            rlim_cur: soft as libc::rlim_t,
            rlim_max: hard as libc::rlim_t,
        };
        let rc = unsafe { libc::setrlimit(libc::RLIMIT_NOFILE as _, &limits) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error().to_string())
        }
    }

    #[cfg(not(unix))]
    fn set_nofile_limits(&self, _soft: u64, _hard: u64) -> Result<(), String> {
        Err("rlimit is not supported on this platform".to_string())
    }
}

fn drain_pipe<R: std::io::Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn truncate_output(bytes: &[u8]) -> String {
    let slice = if bytes.len() > MAX_OUTPUT_BYTES {
        &bytes[..MAX_OUTPUT_BYTES]
    } else {
        bytes
    };
    String::from_utf8_lossy(slice).trim_end().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_exit_code_and_output() {
        let host = RealHost::new();
        let out = host.run(&["sh", "-c", "echo hello; echo oops >&2; exit 3"], COMMAND_TIMEOUT);
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "oops");
        assert!(!out.success());
    }

    #[test]
    fn run_folds_spawn_failure_into_output() {
        let host = RealHost::new();
        let out = host.run(&["definitely-not-a-real-binary-4242"], COMMAND_TIMEOUT);
        assert_eq!(out.code, -1);
        assert!(out.stderr.contains("spawn failed"));
    }

    #[test]
    fn run_enforces_timeout() {
        let host = RealHost::new();
        let out = host.run(&["sleep", "5"], Duration::from_millis(200));
        assert_eq!(out.code, -1);
        assert!(out.stderr.contains("timed out"));
    }

    #[test]
    fn run_drains_output_larger_than_a_pipe_buffer() {
        let host = RealHost::new();
        // 256 KiB of stdout; the child must not stall on a full pipe.
        let out = host.run(
            &["sh", "-c", "head -c 262144 /dev/zero | tr '\\0' 'a'"],
            Duration::from_secs(3),
        );
        assert_eq!(out.code, 0, "stderr: {}", out.stderr);
        assert_eq!(out.stdout.len(), MAX_OUTPUT_BYTES);
        assert!(out.stdout.bytes().all(|b| b == b'a'));
    }

    #[test]
    fn run_rejects_empty_argv() {
        let host = RealHost::new();
        let out = host.run(&[], COMMAND_TIMEOUT);
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[test]
    fn unix_probes_answer() {
        let host = RealHost::new();
        assert!(host.nofile_limits().is_some());
        assert!(host.current_nice().is_some());
        assert!(host.which("sh").is_some());
        assert!(host.which("definitely-not-a-real-binary-4242").is_none());
    }
}
