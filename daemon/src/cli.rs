use clap::Parser;

/// Keeps a Microsoft Teams window active by periodically simulating
/// pointer movement inside it.
#[derive(Debug, Parser)]
#[command(name = "keep-active", version, about)]
pub struct Cli {
    /// Seconds between activity cycles (positive integer; default 300, or
    /// the value from the config file).
    #[arg(short, long, allow_negative_numbers = true)]
    pub interval: Option<i64>,

    /// Detach and run the loop in the background.
    #[arg(short, long)]
    pub daemon: bool,
}
