//! Autoresizer configuration.
//!
//! A [`ResizerConfig`] is validated once at startup and is read-only from
//! then on. Components receive their own clone; nothing reads settings from
//! ambient global state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ResizeError, ResizeResult};

/// Fixed volume growth per resize: 5 GB.
pub const DEFAULT_INCREMENT_BYTES: u64 = 5_000_000_000;

/// Default time between two evaluation cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default bound on a single provider call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default disk usage percentage above which a resize is considered.
pub const DEFAULT_TRIGGER_PERCENT: f64 = 90.0;

/// Lowest accepted trigger percentage (inclusive).
pub const MIN_TRIGGER_PERCENT: f64 = 80.0;

/// Highest accepted trigger percentage (exclusive).
pub const MAX_TRIGGER_PERCENT: f64 = 100.0;

/// What to do when a resize is refused at decision time, either because the
/// instance is not eligible or because the target would exceed the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Log the refusal and retry on the next cycle.
    #[default]
    Skip,
    /// Stop the control loop and exit with a failure status.
    Abort,
}

impl FromStr for GuardPolicy {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(ResizeError::Config(format!(
                "unknown guard policy '{other}' (expected 'skip' or 'abort')"
            ))),
        }
    }
}

impl fmt::Display for GuardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Validated, immutable autoresizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizerConfig {
    trigger_percent: f64,
    size_limit_bytes: u64,
    increment_bytes: u64,
    poll_interval: Duration,
    query_timeout: Duration,
    guard_policy: GuardPolicy,
}

impl ResizerConfig {
    /// Start from defaults with the two settings that have none.
    pub fn builder(trigger_percent: f64, size_limit_bytes: u64) -> ConfigBuilder {
        ConfigBuilder {
            trigger_percent,
            size_limit_bytes,
            ..ConfigBuilder::default()
        }
    }

    pub fn trigger_percent(&self) -> f64 {
        self.trigger_percent
    }

    pub fn size_limit_bytes(&self) -> u64 {
        self.size_limit_bytes
    }

    pub fn increment_bytes(&self) -> u64 {
        self.increment_bytes
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        self.guard_policy
    }
}

/// Unvalidated settings; [`ConfigBuilder::build`] turns them into a
/// [`ResizerConfig`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    pub trigger_percent: f64,
    pub size_limit_bytes: u64,
    pub increment_bytes: u64,
    pub poll_interval: Duration,
    pub query_timeout: Duration,
    pub guard_policy: GuardPolicy,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            trigger_percent: DEFAULT_TRIGGER_PERCENT,
            size_limit_bytes: 0,
            increment_bytes: DEFAULT_INCREMENT_BYTES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            guard_policy: GuardPolicy::default(),
        }
    }
}

impl ConfigBuilder {
    pub fn increment_bytes(mut self, bytes: u64) -> Self {
        self.increment_bytes = bytes;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn guard_policy(mut self, policy: GuardPolicy) -> Self {
        self.guard_policy = policy;
        self
    }

    /// Validate every setting.
    pub fn build(self) -> ResizeResult<ResizerConfig> {
        // Written so that NaN fails too.
        if !(self.trigger_percent >= MIN_TRIGGER_PERCENT
            && self.trigger_percent < MAX_TRIGGER_PERCENT)
        {
            return Err(ResizeError::Config(format!(
                "trigger percent must be between {MIN_TRIGGER_PERCENT} and {MAX_TRIGGER_PERCENT}, got {}",
                self.trigger_percent
            )));
        }
        if self.size_limit_bytes == 0 {
            return Err(ResizeError::Config(
                "volume size limit is zero, no resize can happen".to_string(),
            ));
        }
        if self.increment_bytes == 0 {
            return Err(ResizeError::Config(
                "resize increment must be positive".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ResizeError::Config(
                "poll interval must be positive".to_string(),
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(ResizeError::Config(
                "query timeout must be positive".to_string(),
            ));
        }

        Ok(ResizerConfig {
            trigger_percent: self.trigger_percent,
            size_limit_bytes: self.size_limit_bytes,
            increment_bytes: self.increment_bytes,
            poll_interval: self.poll_interval,
            query_timeout: self.query_timeout,
            guard_policy: self.guard_policy,
        })
    }
}

/// Parse a trigger percentage from its textual form.
pub fn parse_trigger_percent(input: &str) -> ResizeResult<f64> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| ResizeError::Config(format!("invalid trigger percentage '{input}': {e}")))
}
