/// Interactive control surface: a numbered text menu on stdin/stdout.
///
/// The polling loop runs as a background task while the menu stays
/// responsive; all control flows through the controller handle. Stopping a
/// *detached* instance goes through the sentinel file instead, since that
/// loop lives in another process.
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::background;
use crate::controller::{Controller, ControllerHandle, RunState};
use crate::desktop::XdoTool;
use crate::paths::ControlPaths;
use crate::sleeper::TokioSleeper;

struct Menu {
    controller: Arc<Controller<XdoTool, TokioSleeper>>,
    handle: ControllerHandle,
    paths: ControlPaths,
    loop_task: Option<tokio::task::JoinHandle<()>>,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

pub async fn run(window_title: String, interval_secs: u64, paths: ControlPaths) -> Result<()> {
    let controller = Arc::new(Controller::new(
        window_title,
        interval_secs,
        paths.clone(),
        XdoTool,
        TokioSleeper,
    ));
    let handle = controller.handle();

    // Ctrl+C takes the same cleanup path as a stop command, then exits.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.stop();
                for _ in 0..50 {
                    if handle.state() == RunState::Stopped {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                std::process::exit(0);
            }
        });
    }

    let mut menu = Menu {
        controller,
        handle,
        paths,
        loop_task: None,
        started_at: None,
        paused_at: None,
        paused_total: Duration::ZERO,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        menu.print_menu();
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break; // EOF: behave like exit without a running loop.
        };
        if !menu.dispatch(line.trim(), &mut lines).await? {
            break;
        }
    }
    Ok(())
}

impl Menu {
    fn print_menu(&self) {
        println!();
        println!("Choose an action:");
        println!("  1. Start            Begin keeping the window active");
        println!("  2. Stop             Request a stop");
        println!("  3. Pause/Resume     Suspend or resume interaction");
        println!("  4. Modify interval  Change the seconds between cycles");
        println!("  5. Show logs        Print the current log");
        println!("  6. Run in background  Detach a daemon instance");
        println!("  7. Exit");
        println!();
        println!("Current status: {}", self.status_line());
        println!("Current interval: {} seconds", self.handle.interval_secs());
        if let Some(elapsed) = self.elapsed() {
            println!("Elapsed time: {}", format_hms(elapsed));
        }
        print!("> ");
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }

    fn status_line(&self) -> &'static str {
        match self.handle.state() {
            RunState::Running => "Running",
            RunState::Paused => "Running (Paused)",
            RunState::Stopping => "Stopping",
            RunState::Stopped => "Stopped",
        }
    }

    /// Time since start, excluding time spent paused.
    fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at?;
        let mut elapsed = started.elapsed().saturating_sub(self.paused_total);
        if let Some(paused) = self.paused_at {
            elapsed = elapsed.saturating_sub(paused.elapsed());
        }
        Some(elapsed)
    }

    /// Handles one menu choice. Returns false when the menu should exit.
    async fn dispatch(&mut self, choice: &str, lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
        match choice {
            "1" => self.start(),
            "2" => self.stop().await,
            "3" => self.toggle_pause(),
            "4" => self.modify_interval(lines).await?,
            "5" => self.show_logs(),
            "6" => self.run_in_background(),
            "7" => return self.confirm_exit(lines).await,
            other => println!("Invalid choice '{other}'. Please try again."),
        }
        Ok(true)
    }

    fn start(&mut self) {
        if self.handle.state() != RunState::Stopped {
            println!("The loop is already running.");
            return;
        }
        let controller = Arc::clone(&self.controller);
        self.loop_task = Some(tokio::spawn(async move { controller.run().await }));
        self.started_at = Some(Instant::now());
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        println!("Started.");
    }

    async fn stop(&mut self) {
        match self.handle.state() {
            RunState::Running | RunState::Paused => {
                self.handle.stop();
                if let Some(task) = self.loop_task.take() {
                    let _ = task.await;
                }
                self.started_at = None;
                self.paused_at = None;
                println!("Stopped.");
            }
            RunState::Stopping | RunState::Stopped => {
                // Nothing in-process; maybe a detached instance is running.
                match background::read_pid(&self.paths) {
                    Some(pid) if background::is_alive(pid) => {
                        match self.paths.create_sentinel() {
                            Ok(()) => println!(
                                "Stop file created. The background instance (pid {pid}) \
                                 will stop within one interval."
                            ),
                            Err(e) => println!("Failed to create stop file: {e}"),
                        }
                    }
                    _ => println!("The loop is not running."),
                }
            }
        }
    }

    fn toggle_pause(&mut self) {
        match self.handle.state() {
            RunState::Running => {
                if self.handle.pause() {
                    self.paused_at = Some(Instant::now());
                    println!("Paused.");
                }
            }
            RunState::Paused => {
                if self.handle.resume() {
                    if let Some(paused) = self.paused_at.take() {
                        self.paused_total += paused.elapsed();
                    }
                    println!("Resumed.");
                }
            }
            RunState::Stopping | RunState::Stopped => {
                println!("The loop is not running. Cannot pause/resume.");
            }
        }
    }

    async fn modify_interval(&self, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
        print!("Enter new interval in seconds: ");
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            return Ok(());
        };
        match line.trim().parse::<i64>() {
            Ok(secs) => match self.handle.set_interval(secs) {
                Ok(()) => println!(
                    "Interval set to {secs} seconds (takes effect on the next cycle)."
                ),
                Err(e) => println!("{e}"),
            },
            Err(_) => println!("Invalid input. Interval not changed."),
        }
        Ok(())
    }

    fn show_logs(&self) {
        let log = self.handle.tail_log();
        if log.is_empty() {
            println!("No logs to display.");
        } else {
            print!("{log}");
        }
    }

    fn run_in_background(&self) {
        if self.handle.state() != RunState::Stopped {
            println!("Stop the foreground loop before detaching.");
            return;
        }
        if let Some(pid) = background::read_pid(&self.paths) {
            if background::is_alive(pid) {
                println!("A background instance is already running (pid {pid}).");
                return;
            }
        }
        match background::spawn_detached(self.handle.interval_secs()) {
            Ok(pid) => println!("Detached background instance started (pid {pid})."),
            Err(e) => println!("Failed to detach: {e:#}"),
        }
    }

    /// Exit path. Warns when the loop is still running and offers
    /// stop-and-exit. Returns false to leave the menu.
    async fn confirm_exit(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
        match self.handle.state() {
            RunState::Running | RunState::Paused => {
                print!("The loop is running. Enter 's' to stop and exit, anything else to return: ");
                use std::io::Write;
                let _ = std::io::stdout().flush();

                let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
                    // EOF while running: stop cleanly rather than abandoning the loop.
                    self.stop().await;
                    return Ok(false);
                };
                if line.trim().eq_ignore_ascii_case("s") {
                    self.stop().await;
                    println!("Exiting.");
                    return Ok(false);
                }
                Ok(true)
            }
            _ => {
                println!("Exiting.");
                Ok(false)
            }
        }
    }
}

/// Formats a duration as HH:MM:SS.
fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hms_zero() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
    }

    #[test]
    fn format_hms_rolls_minutes_and_hours() {
        assert_eq!(format_hms(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_hms(Duration::from_secs(3661)), "01:01:01");
        assert_eq!(format_hms(Duration::from_secs(25 * 3600)), "25:00:00");
    }
}
