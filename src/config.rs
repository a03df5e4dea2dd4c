use std::time::Duration;

pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_TOP_DOMAINS: usize = 10;

/// Knobs of the tracker, gathered from command line arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Day records older than this many days are pruned.
    pub retention_days: u32,
    /// How often retention pruning runs in the host.
    pub prune_interval: Duration,
    /// Length of the top domain ranking in `getTimeStats`.
    pub top_domains: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
            top_domains: DEFAULT_TOP_DOMAINS,
        }
    }
}
