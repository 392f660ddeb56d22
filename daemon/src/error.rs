use thiserror::Error;

/// Operator-facing failure taxonomy.
///
/// Anything not covered here is either informational (a missing target
/// window) or a best-effort warning (log/pid write failures), neither of
/// which may stop the loop.
#[derive(Debug, Error)]
pub enum Error {
    /// The interval was zero or negative. The operation is rejected and the
    /// previous interval stays in effect.
    #[error("invalid interval {0}: must be a positive number of seconds")]
    InvalidConfig(i64),

    /// A required external tool is missing. Fatal at startup; the loop must
    /// never start without it.
    #[error("{0}")]
    CapabilityUnavailable(String),
}
