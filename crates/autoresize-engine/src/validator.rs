//! Precondition checks run before any resize.

use autoresize_core::{InstanceDescriptor, ResizeError, ResizeResult, ResizerConfig, human_size};

/// Gate a resize on instance eligibility.
///
/// The instance must be `ready` or `disk_full` and sit on a volume class
/// that supports online resize. Call this on a freshly fetched descriptor
/// every time; state changes out of band between cycles.
pub fn check_eligible(instance: &InstanceDescriptor) -> ResizeResult<()> {
    if !instance.status.allows_resize() {
        return Err(ResizeError::Precondition {
            field: "status",
            value: instance.status.to_string(),
        });
    }
    if !instance.volume.kind.supports_online_resize() {
        return Err(ResizeError::Precondition {
            field: "volume.type",
            value: instance.volume.kind.to_string(),
        });
    }
    Ok(())
}

/// One-time startup checks: without these passing no resize could ever
/// happen, so the caller should exit.
///
/// Status is not checked here; a transient state at startup is fine.
pub fn check_preflight(instance: &InstanceDescriptor, config: &ResizerConfig) -> ResizeResult<()> {
    if !instance.volume.kind.supports_online_resize() {
        return Err(ResizeError::Preflight(format!(
            "unsupported volume type: {}",
            instance.volume.kind
        )));
    }
    if instance.volume.size >= config.size_limit_bytes() {
        return Err(ResizeError::Preflight(format!(
            "current volume size {} is not below the limit {}",
            human_size(instance.volume.size),
            human_size(config.size_limit_bytes())
        )));
    }
    Ok(())
}
