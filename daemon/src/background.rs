/// Run-in-background capability.
///
/// Daemon mode re-execs the current binary as a detached child — own
/// process group, null stdio — so its lifetime is independent of the
/// launching terminal. The child is marked with an environment variable and
/// enters the polling loop directly instead of spawning another copy. It is
/// tracked through the pid file, which external tooling can read to signal
/// or query the instance.
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::paths::{self, ControlPaths};

/// Set on the re-exec'd child so it runs the loop headless.
pub const DAEMON_CHILD_ENV: &str = "KEEP_ACTIVE_DAEMON_CHILD";

/// Whether this process is the re-exec'd daemon child.
pub fn running_as_child() -> bool {
    std::env::var_os(DAEMON_CHILD_ENV).is_some()
}

/// Spawns a detached copy of the current binary running the loop with
/// `interval_secs`. Returns the child's pid; the child writes its own pid
/// file once it starts.
pub fn spawn_detached(interval_secs: u64) -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to locate the current executable")?;
    let mut cmd = Command::new(exe);
    cmd.arg("--interval")
        .arg(interval_secs.to_string())
        .env(DAEMON_CHILD_ENV, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // New process group: the child outlives the launching session.
        cmd.process_group(0);
    }

    let child = cmd.spawn().context("Failed to spawn background process")?;
    Ok(child.id())
}

/// Pid record with guaranteed cleanup: written on acquisition, removed when
/// the guard drops, so a normally-exiting scope never leaves a stale pid
/// file behind. Write failures are warned and tolerated — the pid file is
/// advisory, not correctness-critical.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn acquire(paths: &ControlPaths) -> Self {
        let path = paths.pid();
        if let Err(e) = std::fs::write(&path, format!("{}\n", std::process::id())) {
            eprintln!("[pid] Failed to write pid file {}: {e}", path.display());
        }
        Self { path }
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        paths::remove_if_present(&self.path, "pid");
    }
}

/// Pid recorded by a detached instance, if any.
pub fn read_pid(paths: &ControlPaths) -> Option<u32> {
    std::fs::read_to_string(paths.pid())
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Whether `pid` refers to a live process.
pub fn is_alive(pid: u32) -> bool {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), false);
    sys.process(Pid::from_u32(pid)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_records_current_process_and_cleans_up_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());

        {
            let _guard = PidFile::acquire(&paths);
            assert_eq!(read_pid(&paths), Some(std::process::id()));
        }
        // Guard dropped: the record must be gone.
        assert!(!paths.pid().exists());
        assert_eq!(read_pid(&paths), None);
    }

    #[test]
    fn read_pid_rejects_garbage_content() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());
        std::fs::write(paths.pid(), "not a pid\n").unwrap();
        assert_eq!(read_pid(&paths), None);
    }

    #[test]
    fn read_pid_tolerates_surrounding_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());
        std::fs::write(paths.pid(), "  4321 \n").unwrap();
        assert_eq!(read_pid(&paths), Some(4321));
    }

    #[test]
    fn current_process_is_alive() {
        assert!(is_alive(std::process::id()));
    }

    #[test]
    fn nonexistent_pid_is_not_alive() {
        // Far above kernel.pid_max on any supported platform, but still a
        // valid pid value.
        assert!(!is_alive(999_999_999));
    }
}
