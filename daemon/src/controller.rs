/// The activity loop controller.
///
/// One polling loop per running instance: each cycle checks the stop
/// sentinel, honors the pause flag, looks up the target window, nudges the
/// pointer inside it, then sleeps for the current interval. Control
/// operations (pause/resume, interval change, stop) go through a cloneable
/// [`ControllerHandle`]; out-of-process control goes through the sentinel
/// file, which is re-checked at the start of every cycle. Worst-case stop
/// latency for a sentinel-based request is therefore one full interval plus
/// the in-flight interaction — acceptable at the multi-minute default.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::config::{validate_interval, POINTER_TARGETS};
use crate::desktop::Desktop;
use crate::error::Error;
use crate::logging::LogStream;
use crate::paths::{self, ControlPaths};
use crate::sleeper::Sleeper;

/// Lifecycle of the polling loop.
///
/// Stopped → Running (start), Running ↔ Paused (pause/resume),
/// Running/Paused → Stopping (stop command, sentinel, or signal),
/// Stopping → Stopped (cleanup complete).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
    Stopping,
}

/// State shared between the loop and its control handles.
struct Shared {
    state: Mutex<RunState>,
    /// Seconds between cycles. Read fresh before every sleep, so a change
    /// applies to the next sleep, never retroactively.
    interval_secs: AtomicU64,
    /// Wakes a mid-sleep loop when an in-process stop is requested.
    stop_requested: Notify,
}

pub struct Controller<D, S> {
    window_title: String,
    paths: ControlPaths,
    log: LogStream,
    desktop: D,
    sleeper: S,
    shared: Arc<Shared>,
}

/// Cheap-to-clone control surface over a controller, usable from other
/// tasks while the loop runs.
#[derive(Clone)]
pub struct ControllerHandle {
    shared: Arc<Shared>,
    log: LogStream,
}

impl ControllerHandle {
    pub fn state(&self) -> RunState {
        *self.shared.state.lock().unwrap()
    }

    pub fn interval_secs(&self) -> u64 {
        self.shared.interval_secs.load(Ordering::Relaxed)
    }

    /// Updates the live interval. Takes effect on the next sleep. Rejects
    /// zero and negative values, leaving the previous interval in place.
    pub fn set_interval(&self, secs: i64) -> Result<(), Error> {
        let validated = validate_interval(secs)?;
        self.shared.interval_secs.store(validated, Ordering::Relaxed);
        Ok(())
    }

    /// Running → Paused. Returns false (and changes nothing) from any other
    /// state.
    pub fn pause(&self) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        if *state == RunState::Running {
            *state = RunState::Paused;
            true
        } else {
            false
        }
    }

    /// Paused → Running. Returns false (and changes nothing) from any other
    /// state.
    pub fn resume(&self) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        if *state == RunState::Paused {
            *state = RunState::Running;
            true
        } else {
            false
        }
    }

    /// Requests an in-process stop: transitions to Stopping immediately and
    /// wakes the loop if it is mid-sleep. Idempotent — stopping an
    /// already-Stopping or already-Stopped controller is a no-op.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock().unwrap();
        match *state {
            RunState::Running | RunState::Paused => {
                *state = RunState::Stopping;
                self.shared.stop_requested.notify_one();
            }
            RunState::Stopping | RunState::Stopped => {}
        }
    }

    /// Current log contents. Read-only.
    pub fn tail_log(&self) -> String {
        self.log.tail()
    }
}

impl<D: Desktop, S: Sleeper> Controller<D, S> {
    pub fn new(
        window_title: String,
        interval_secs: u64,
        paths: ControlPaths,
        desktop: D,
        sleeper: S,
    ) -> Self {
        let log = LogStream::new(paths.log());
        Self {
            window_title,
            paths,
            log,
            desktop,
            sleeper,
            shared: Arc::new(Shared {
                state: Mutex::new(RunState::Stopped),
                interval_secs: AtomicU64::new(interval_secs),
                stop_requested: Notify::new(),
            }),
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            shared: Arc::clone(&self.shared),
            log: self.log.clone(),
        }
    }

    pub fn state(&self) -> RunState {
        *self.shared.state.lock().unwrap()
    }

    /// Runs the polling loop until a stop is requested (sentinel file,
    /// in-process stop, or termination signal routed through
    /// [`ControllerHandle::stop`]), then cleans up. Returns immediately if
    /// the loop is already running.
    pub async fn run(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if *state != RunState::Stopped {
                return;
            }
            *state = RunState::Running;
        }

        self.log.reinit();
        self.log.append("starting keep-active loop");

        loop {
            self.poll_cycle().await;
            if self.state() == RunState::Stopping {
                break;
            }

            let interval =
                Duration::from_secs(self.shared.interval_secs.load(Ordering::Relaxed));
            tokio::select! {
                () = self.sleeper.sleep(interval) => {}
                () = self.shared.stop_requested.notified() => {}
            }
            if self.state() == RunState::Stopping {
                break;
            }
        }

        self.cleanup();
    }

    /// One unit of loop work: sentinel check, pause check, window lookup,
    /// pointer interaction. The inter-cycle sleep lives in [`Controller::run`].
    async fn poll_cycle(&self) {
        if self.paths.sentinel_exists() {
            self.log.append("stop file found, stopping");
            self.paths.consume_sentinel();
            *self.shared.state.lock().unwrap() = RunState::Stopping;
            return;
        }

        match self.state() {
            RunState::Stopping | RunState::Stopped => return,
            RunState::Paused => {
                self.log.append("paused");
                return;
            }
            RunState::Running => {}
        }

        match self.desktop.find_windows(&self.window_title).await {
            Ok(windows) => match windows.first() {
                // First match wins when several windows share the title.
                Some(window) => {
                    for (x, y) in POINTER_TARGETS {
                        if let Err(e) = self.desktop.move_pointer(window, x, y).await {
                            // The window can vanish between lookup and move.
                            self.log.append(&format!("pointer move failed: {e:#}"));
                        }
                    }
                    self.log.append(&format!("interacting with window {window}"));
                }
                None => self.log.append("window not found"),
            },
            Err(e) => self.log.append(&format!("window lookup failed: {e:#}")),
        }
    }

    /// Stopping → Stopped. Removes the sentinel and pid file if present;
    /// the log is retained so the final run remains inspectable.
    fn cleanup(&self) {
        self.paths.consume_sentinel();
        paths::remove_if_present(&self.paths.pid(), "pid");
        self.log.append("stopped");
        *self.shared.state.lock().unwrap() = RunState::Stopped;
    }
}
