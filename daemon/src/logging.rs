/// Append-only activity log of timestamped lines.
///
/// Logging is observability, not correctness: every operation here is
/// best-effort. Write failures are warned on stderr and swallowed — a log
/// I/O problem must never crash the loop.
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LogStream {
    path: PathBuf,
}

impl LogStream {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Truncates the log. Called once when the loop starts, so each run
    /// begins with a fresh file.
    pub fn reinit(&self) {
        if let Err(e) = std::fs::write(&self.path, b"") {
            eprintln!("[log] Failed to initialize {}: {e}", self.path.display());
        }
    }

    /// Appends one line, prefixed with a local timestamp
    /// (`YYYY-MM-DD HH:MM:SS: message`).
    pub fn append(&self, message: &str) {
        let line = format!(
            "{}: {message}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            eprintln!("[log] Failed to append to {}: {e}", self.path.display());
        }
    }

    /// Current log contents. Read-only; an unreadable or missing file reads
    /// as empty rather than failing.
    pub fn tail(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap_or_default()
    }
}
