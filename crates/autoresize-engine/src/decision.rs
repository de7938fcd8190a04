//! Resize decision — threshold test and target size computation.

use autoresize_core::{InstanceDescriptor, ResizeError, ResizeResult, ResizerConfig};

use crate::validator::check_eligible;

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Usage was at or under the trigger; nothing to do.
    BelowThreshold { percent_used: f64 },
    /// A resize was requested and acknowledged by the provider.
    Resized {
        percent_used: f64,
        current_size: u64,
        target_size: u64,
        instance: InstanceDescriptor,
    },
}

/// A validated resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub current_size: u64,
    pub target_size: u64,
}

/// Whether `percent_used` warrants a resize. Equal to the trigger does not.
pub fn exceeds_trigger(percent_used: f64, config: &ResizerConfig) -> bool {
    percent_used > config.trigger_percent()
}

/// Check eligibility and compute the next volume size.
///
/// The volume always grows by exactly one increment, however far usage is
/// over the trigger. A target above the size limit is refused.
pub fn plan_resize(
    instance: &InstanceDescriptor,
    config: &ResizerConfig,
) -> ResizeResult<ResizePlan> {
    check_eligible(instance)?;

    let current_size = instance.volume.size;
    let limit = config.size_limit_bytes();
    let target_size = current_size
        .checked_add(config.increment_bytes())
        .ok_or(ResizeError::LimitExceeded {
            target: u64::MAX,
            limit,
        })?;

    if target_size > limit {
        return Err(ResizeError::LimitExceeded {
            target: target_size,
            limit,
        });
    }

    Ok(ResizePlan {
        current_size,
        target_size,
    })
}
