/// Sleep seam for the polling loop.
///
/// The loop reads its interval fresh before every sleep, so this trait takes
/// the concrete duration each time. Tests inject a recording sleeper to
/// verify exact sleep durations without waiting wall-clock time.
use std::future::Future;
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
