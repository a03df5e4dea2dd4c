use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::config::{
    TrackerConfig, DEFAULT_PRUNE_INTERVAL, DEFAULT_RETENTION_DAYS, DEFAULT_TOP_DOMAINS,
};

use super::protocol::Framing;

#[derive(Parser)]
pub struct HostArgs {
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Mirror logs to stderr. Stdout is reserved for messages.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
    #[arg(long = "retention-days", default_value_t = DEFAULT_RETENTION_DAYS)]
    pub retention_days: u32,
    #[arg(long = "prune-interval-secs", default_value_t = DEFAULT_PRUNE_INTERVAL.as_secs())]
    pub prune_interval_secs: u64,
    #[arg(long = "top", default_value_t = DEFAULT_TOP_DOMAINS)]
    pub top_domains: usize,
    #[arg(long, default_value_t = Framing::NativeMessaging)]
    pub framing: Framing,
    /// Browsers pass the caller's origin as a positional argument.
    #[arg(hide = true)]
    pub origin: Vec<String>,
    /// Passed by Chrome on Windows.
    #[arg(long = "parent-window", hide = true)]
    pub parent_window: Option<String>,
}

impl HostArgs {
    pub fn config(&self) -> TrackerConfig {
        TrackerConfig {
            retention_days: self.retention_days,
            prune_interval: Duration::from_secs(self.prune_interval_secs.max(1)),
            top_domains: self.top_domains,
        }
    }
}
