/// Failures of ledger operations. Every variant is reported back to the caller as a failed
/// request; none of them is fatal for the process.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The event was rejected before anything was changed.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Locking, reading or writing the store failed. The last committed state is kept.
    #[error("Ledger storage failed: {0:#}")]
    Persistence(#[from] anyhow::Error),

    #[error("Ledger service is not running")]
    Stopped,
}
