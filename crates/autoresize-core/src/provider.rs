//! Provider capability consumed by the control loop.
//!
//! The engine never talks to the managed-database provider directly; it is
//! handed something implementing [`Provider`]. Methods return boxed futures
//! so implementations can be swapped at runtime and mocked in tests.
//!
//! Implementations report transport and decoding failures as
//! [`ResizeError::ProviderQuery`](crate::ResizeError::ProviderQuery). They do
//! not enforce timeouts or resize eligibility; both are the caller's job.

use std::future::Future;
use std::pin::Pin;

use crate::error::ResizeResult;
use crate::types::{InstanceDescriptor, InstanceMetrics};

/// Boxed future alias for provider calls.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = ResizeResult<T>> + Send + 'a>>;

/// Operations available against the one managed instance.
pub trait Provider: Send + Sync {
    /// Fetch a fresh descriptor of the instance.
    fn fetch_instance(&self) -> ProviderFuture<'_, InstanceDescriptor>;

    /// Fetch the latest readings of a named metric.
    fn fetch_metrics<'a>(&'a self, metric_name: &'a str) -> ProviderFuture<'a, InstanceMetrics>;

    /// Request the volume be grown to `new_size_bytes`.
    ///
    /// Returns the updated descriptor as acknowledged by the provider.
    fn resize_volume(&self, new_size_bytes: u64) -> ProviderFuture<'_, InstanceDescriptor>;
}
