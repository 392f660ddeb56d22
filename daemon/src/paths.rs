/// Canonical file paths for the keep-active control files.
///
/// All three live under the shared OS temp directory (/tmp on Linux):
///   - stop_keep_active  Created to request a stop; consumed by the loop.
///   - keep_active.log   Timestamped activity log, rewritten on each start.
///   - keep_active.pid   Pid of a detached background instance.
///
/// The names are a compatibility contract: external scripts stop a running
/// instance by touching the sentinel path.
use std::io;
use std::path::{Path, PathBuf};

pub const SENTINEL_FILE_NAME: &str = "stop_keep_active";
pub const LOG_FILE_NAME: &str = "keep_active.log";
pub const PID_FILE_NAME: &str = "keep_active.pid";

/// The control-file set, rooted at a single directory.
///
/// Passed into the controller at construction rather than resolved from
/// globals, so tests (and parallel instances) can use isolated directories.
#[derive(Debug, Clone)]
pub struct ControlPaths {
    dir: PathBuf,
}

impl Default for ControlPaths {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
        }
    }
}

impl ControlPaths {
    /// Control files rooted at `dir` instead of the shared temp directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sentinel(&self) -> PathBuf {
        self.dir.join(SENTINEL_FILE_NAME)
    }

    pub fn log(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }

    pub fn pid(&self) -> PathBuf {
        self.dir.join(PID_FILE_NAME)
    }

    pub fn sentinel_exists(&self) -> bool {
        self.sentinel().exists()
    }

    /// Creates the stop sentinel so a running instance (this process or a
    /// detached one) observes it on its next cycle.
    pub fn create_sentinel(&self) -> io::Result<()> {
        std::fs::write(self.sentinel(), b"")
    }

    /// Removes the sentinel, tolerating its absence.
    pub fn consume_sentinel(&self) {
        remove_if_present(&self.sentinel(), "sentinel");
    }
}

/// Best-effort file removal. Absence is fine; any other failure is warned
/// on stderr and otherwise ignored.
pub fn remove_if_present(path: &Path, tag: &str) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => eprintln!("[{tag}] Failed to remove {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_live_in_temp_dir() {
        let paths = ControlPaths::default();
        let temp = std::env::temp_dir();
        assert!(paths.sentinel().starts_with(&temp));
        assert!(paths.log().starts_with(&temp));
        assert!(paths.pid().starts_with(&temp));
    }

    #[test]
    fn paths_use_well_known_file_names() {
        let paths = ControlPaths::default();
        assert_eq!(paths.sentinel().file_name().unwrap(), SENTINEL_FILE_NAME);
        assert_eq!(paths.log().file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(paths.pid().file_name().unwrap(), PID_FILE_NAME);
    }

    #[test]
    fn all_paths_share_the_same_parent_dir() {
        let paths = ControlPaths::default();
        assert_eq!(paths.sentinel().parent(), paths.log().parent());
        assert_eq!(paths.log().parent(), paths.pid().parent());
    }

    #[test]
    fn in_dir_roots_paths_at_the_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());
        assert_eq!(paths.sentinel().parent().unwrap(), dir.path());
    }

    #[test]
    fn create_then_consume_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());

        assert!(!paths.sentinel_exists());
        paths.create_sentinel().unwrap();
        assert!(paths.sentinel_exists());
        paths.consume_sentinel();
        assert!(!paths.sentinel_exists());
    }

    #[test]
    fn consume_sentinel_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ControlPaths::in_dir(dir.path());
        // Nothing was created; this must not panic or error.
        paths.consume_sentinel();
        assert!(!paths.sentinel_exists());
    }

    #[test]
    fn remove_if_present_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        remove_if_present(&dir.path().join("nope"), "test");
    }
}
