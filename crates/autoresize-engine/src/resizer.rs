//! Autoresizer — startup preflight and the periodic control loop.
//!
//! The loop is strictly sequential: one cycle at a time, each provider call
//! awaited (or timed out) before the next starts, so at most one resize is
//! ever in flight. Cycles are never interrupted by shutdown; the signal is
//! observed between cycles and takes precedence over a tick that is already due.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, info_span, warn};

use autoresize_core::{
    GuardPolicy, InstanceDescriptor, Provider, ResizeError, ResizeResult, ResizerConfig, human_size,
};

use crate::bounded::bounded;
use crate::decision::{CycleOutcome, exceeds_trigger, plan_resize};
use crate::sampler::sample_usage;
use crate::validator::check_preflight;

/// Drives one managed instance.
pub struct Autoresizer<P> {
    provider: Arc<P>,
    config: ResizerConfig,
}

impl<P: Provider> Autoresizer<P> {
    /// Create an autoresizer over `provider`.
    pub fn new(provider: Arc<P>, config: ResizerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ResizerConfig {
        &self.config
    }

    /// Check that the instance exists, is reachable and can ever be resized.
    ///
    /// Any error here means the process should exit.
    pub async fn preflight(&self) -> ResizeResult<InstanceDescriptor> {
        let instance = bounded(
            "fetch instance",
            self.config.query_timeout(),
            self.provider.fetch_instance(),
        )
        .await?;

        info!(
            instance.id = %instance.id,
            instance.name = %instance.name,
            instance.region = %instance.region,
            instance.status = %instance.status,
            volume.kind = %instance.volume.kind,
            volume.size = %human_size(instance.volume.size),
            "rdb instance found"
        );

        check_preflight(&instance, &self.config)?;
        Ok(instance)
    }

    /// Run a single sample → decide → act cycle.
    pub async fn run_cycle(&self) -> ResizeResult<CycleOutcome> {
        let timeout = self.config.query_timeout();

        let percent_used = sample_usage(&*self.provider, timeout).await?;
        info!(percent_used, "current disk usage");

        if !exceeds_trigger(percent_used, &self.config) {
            return Ok(CycleOutcome::BelowThreshold { percent_used });
        }

        warn!(
            percent_target = self.config.trigger_percent(),
            percent_used, "disk space is over max usage target"
        );

        // The preflight descriptor is stale by now.
        let instance = bounded("fetch instance", timeout, self.provider.fetch_instance()).await?;
        debug!(
            status = %instance.status,
            size = %human_size(instance.volume.size),
            "current volume size"
        );

        let plan = plan_resize(&instance, &self.config)?;

        warn!(
            current_size = %human_size(plan.current_size),
            target_size = %human_size(plan.target_size),
            "triggering resize"
        );

        let updated = bounded(
            "upgrade instance",
            timeout,
            self.provider.resize_volume(plan.target_size),
        )
        .await
        .map_err(|e| ResizeError::ResizeRequest {
            current: plan.current_size,
            target: plan.target_size,
            reason: e.to_string(),
        })?;

        info!(
            current_size = %human_size(plan.current_size),
            target_size = %human_size(plan.target_size),
            status = %updated.status,
            size = %human_size(updated.volume.size),
            "resize accepted"
        );

        Ok(CycleOutcome::Resized {
            percent_used,
            current_size: plan.current_size,
            target_size: plan.target_size,
            instance: updated,
        })
    }

    /// Run cycles every poll interval until `shutdown` flips.
    ///
    /// The first cycle runs immediately. Returns `Err` only when a guard
    /// rejection is fatal under [`GuardPolicy::Abort`].
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ResizeResult<()> {
        let interval = self.config.poll_interval();
        info!(
            interval_secs = interval.as_secs(),
            guard_policy = %self.config.guard_policy(),
            "entering control loop"
        );

        if *shutdown.borrow() {
            return Ok(());
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    info!(cycles = cycle, "control loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    cycle += 1;
                    let result = self
                        .run_cycle()
                        .instrument(info_span!("cycle", n = cycle))
                        .await;

                    if let Err(e) = result {
                        log_cycle_error(&e);
                        if self.is_fatal(&e) {
                            error!(error = %e, cycle, "aborting control loop");
                            return Err(e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn is_fatal(&self, err: &ResizeError) -> bool {
        err.is_guard_violation() && self.config.guard_policy() == GuardPolicy::Abort
    }
}

fn log_cycle_error(err: &ResizeError) {
    match err {
        ResizeError::LimitExceeded { target, limit } => error!(
            target_size = %human_size(*target),
            limit_size = %human_size(*limit),
            "new volume size is over limit"
        ),
        ResizeError::Precondition { field, value } => error!(
            field = *field,
            value = %value,
            "instance is not eligible for resize"
        ),
        ResizeError::ResizeRequest {
            current,
            target,
            reason,
        } => error!(
            current_size = %human_size(*current),
            target_size = %human_size(*target),
            error = %reason,
            "unable to resize instance"
        ),
        ResizeError::MalformedMetric(_) => {
            error!(error = %err, "error getting current disk usage")
        }
        other => error!(error = %other, kind = other.kind(), "cycle failed"),
    }
}
