//! Command-line and environment options.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use autoresize_core::config::parse_trigger_percent;
use autoresize_core::{GuardPolicy, ResizeResult, ResizerConfig, parse_human_size};

#[derive(Debug, Parser)]
#[command(
    name = "autoresized",
    about = "Grow a managed database volume before it runs out of space",
    version
)]
pub struct Args {
    /// Disk usage percentage above which the volume is grown (80 ≤ p < 100).
    #[arg(long, env = "SCW_RDB_TRIGGER_PERCENTAGE", default_value = "90")]
    pub trigger_percentage: String,

    /// Largest volume size the daemon may resize to (e.g. "500GB").
    #[arg(long, env = "SCW_RDB_VOLUME_SIZE_LIMIT", default_value = "0GB")]
    pub volume_size_limit: String,

    /// Region of the managed instance.
    #[arg(long, env = "SCW_RDB_REGION")]
    pub region: String,

    /// ID of the managed instance.
    #[arg(long, env = "SCW_RDB_INSTANCE_ID")]
    pub instance_id: String,

    /// Seconds between two disk usage checks.
    #[arg(long, env = "SCW_RDB_POLL_INTERVAL", default_value = "300")]
    pub poll_interval_secs: u64,

    /// Seconds before a single provider call is abandoned.
    #[arg(long, env = "SCW_RDB_QUERY_TIMEOUT", default_value = "60")]
    pub query_timeout_secs: u64,

    /// What to do when a resize is refused: "skip" retries next cycle,
    /// "abort" exits with a failure status.
    #[arg(long, env = "SCW_RDB_ON_GUARD_VIOLATION", default_value = "skip")]
    pub on_guard_violation: GuardPolicy,

    /// Path to the `scw` client (looked up on `PATH` when unset).
    #[arg(long, env = "SCW_CLI_PATH")]
    pub scw_path: Option<PathBuf>,

    /// Use JSON format for logging.
    #[arg(long)]
    pub log_json: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Validate the options into a resizer configuration.
    pub fn config(&self) -> ResizeResult<ResizerConfig> {
        let trigger = parse_trigger_percent(&self.trigger_percentage)?;
        let limit = parse_human_size(&self.volume_size_limit)?;

        ResizerConfig::builder(trigger, limit)
            .poll_interval(Duration::from_secs(self.poll_interval_secs))
            .query_timeout(Duration::from_secs(self.query_timeout_secs))
            .guard_policy(self.on_guard_violation)
            .build()
    }
}
