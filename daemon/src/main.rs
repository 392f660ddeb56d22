mod background;
mod cli;
mod config;
mod controller;
mod desktop;
mod error;
mod logging;
mod menu;
mod paths;
mod sleeper;

use std::sync::Arc;

use clap::Parser;

use crate::controller::Controller;
use crate::desktop::XdoTool;
use crate::paths::ControlPaths;
use crate::sleeper::TokioSleeper;

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = config::load().unwrap_or_else(|e| {
        eprintln!("[config] Error (using defaults): {e:#}");
        config::Config::default()
    });

    let interval_secs =
        match config::validate_interval(args.interval.unwrap_or(config.interval_secs)) {
            Ok(secs) => secs,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        };

    // ── Capability check ──────────────────────────────────────────────────────
    // Fatal before the loop ever starts: without xdotool there is nothing
    // this tool can do.
    if let Err(e) = XdoTool::check_available().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let paths = ControlPaths::default();

    if background::running_as_child() {
        run_detached_loop(config.window_title, interval_secs, paths).await;
        return;
    }

    if args.daemon {
        match background::spawn_detached(interval_secs) {
            Ok(pid) => println!(
                "keep-active-daemon v{} detached (pid {pid})",
                env!("CARGO_PKG_VERSION")
            ),
            Err(e) => {
                eprintln!("Error: failed to detach: {e:#}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = menu::run(config.window_title, interval_secs, paths).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Headless loop for the re-exec'd daemon child: records its pid for the
/// lifetime of the run and routes the termination signal into the same stop
/// path as a stop command.
async fn run_detached_loop(window_title: String, interval_secs: u64, paths: ControlPaths) {
    let _pid_file = background::PidFile::acquire(&paths);
    let controller = Arc::new(Controller::new(
        window_title,
        interval_secs,
        paths,
        XdoTool,
        TokioSleeper,
    ));

    // Graceful shutdown on termination signal.
    {
        let handle = controller.handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.stop();
            }
        });
    }

    controller.run().await;
}
