use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_WINDOW_TITLE: &str = "Microsoft Teams";
pub const DEFAULT_INTERVAL_SECS: i64 = 300;

/// The two in-window points visited on each active cycle. Two distinct
/// targets guarantee the pointer actually moves even if it already sits on
/// one of them.
pub const POINTER_TARGETS: [(i32, i32); 2] = [(100, 100), (200, 150)];

/// Optional operator configuration, read once at startup from
/// `$XDG_CONFIG_HOME/keep-active/config.toml` (falling back to
/// `~/.config/keep-active/config.toml`). The `--interval` CLI flag
/// overrides `interval_secs`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Title substring used to locate the target window.
    #[serde(default = "default_window_title")]
    pub window_title: String,
    /// Seconds between activity cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Validates an operator-supplied interval, returning the value as the
/// unsigned seconds the loop works with. Zero and negative values are
/// rejected and leave whatever interval was previously in effect unchanged.
pub fn validate_interval(secs: i64) -> Result<u64, Error> {
    if secs > 0 {
        Ok(secs as u64)
    } else {
        Err(Error::InvalidConfig(secs))
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the
/// file does not exist. Returns an error if the file exists but cannot be
/// read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Loads the config from its canonical location, or defaults when no
/// config directory can be resolved.
pub fn load() -> Result<Config> {
    match config_file_path() {
        Some(path) => load_or_default(&path),
        None => Ok(Config::default()),
    }
}

/// Resolves `$XDG_CONFIG_HOME/keep-active/config.toml`, falling back to
/// `$HOME/.config/keep-active/config.toml`. `None` when neither variable
/// is set.
pub fn config_file_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("keep-active").join("config.toml"))
}

fn default_window_title() -> String {
    DEFAULT_WINDOW_TITLE.to_string()
}

fn default_interval_secs() -> i64 {
    DEFAULT_INTERVAL_SECS
}
