/// Window lookup and pointer simulation, backed by `xdotool`.
///
/// Both capabilities sit behind the [`Desktop`] trait so the controller can
/// be driven in tests without an X server. The production implementation
/// shells out to `xdotool search --name` and `xdotool mousemove --window`,
/// the same invocations the tool has always used.
use std::fmt;
use std::future::Future;

use anyhow::{ensure, Context, Result};
use tokio::process::Command;

use crate::error::Error;

/// Opaque window identifier as reported by the window system
/// (an X11 window id in decimal, for xdotool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowId(pub String);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Desktop: Send + Sync {
    /// All windows whose title contains `title`, in the window system's
    /// natural order. Empty when nothing matches.
    fn find_windows(&self, title: &str) -> impl Future<Output = Result<Vec<WindowId>>> + Send;

    /// Moves the pointer to (`x`, `y`) relative to the window's origin.
    /// May fail if the window disappeared between lookup and move; callers
    /// must tolerate that.
    fn move_pointer(
        &self,
        window: &WindowId,
        x: i32,
        y: i32,
    ) -> impl Future<Output = Result<()>> + Send;
}

pub struct XdoTool;

impl XdoTool {
    /// Verifies `xdotool` is installed and runnable. Called once at startup;
    /// a failure here is fatal and the loop must not start.
    pub async fn check_available() -> Result<(), Error> {
        match Command::new("xdotool").arg("--version").output().await {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::CapabilityUnavailable(
                "xdotool is not installed. Install it with 'sudo apt-get install xdotool'"
                    .to_string(),
            )),
        }
    }
}

impl Desktop for XdoTool {
    async fn find_windows(&self, title: &str) -> Result<Vec<WindowId>> {
        let output = Command::new("xdotool")
            .args(["search", "--name", title])
            .output()
            .await
            .context("Failed to run xdotool search")?;

        // xdotool exits non-zero when nothing matches; that is an empty
        // result, not an error.
        if !output.status.success() {
            return Ok(Vec::new());
        }

        let ids = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| WindowId(line.to_string()))
            .collect();
        Ok(ids)
    }

    async fn move_pointer(&self, window: &WindowId, x: i32, y: i32) -> Result<()> {
        let status = Command::new("xdotool")
            .args(["mousemove", "--window", &window.0])
            .arg(x.to_string())
            .arg(y.to_string())
            .status()
            .await
            .context("Failed to run xdotool mousemove")?;
        ensure!(status.success(), "xdotool mousemove exited with {status}");
        Ok(())
    }
}
