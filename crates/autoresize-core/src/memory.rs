//! In-process provider.
//!
//! [`MemoryProvider`] holds an instance descriptor and a scripted metrics
//! response. It records every resize request and applies successful ones to
//! the stored volume size, so a sequence of cycles behaves like the real
//! thing. Failures and latency can be injected per operation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::error::{ResizeError, ResizeResult};
use crate::provider::{Provider, ProviderFuture};
use crate::types::{InstanceDescriptor, InstanceMetrics, InstanceStatus, Volume, VolumeType};

#[derive(Debug)]
struct Inner {
    instance: InstanceDescriptor,
    metrics: InstanceMetrics,
    resize_requests: Vec<u64>,
    instance_fetches: u32,
    fail_instance: Option<String>,
    fail_metrics: Option<String>,
    fail_resize: Option<String>,
    latency: Duration,
    resize_latency: Duration,
}

/// Provider backed by process memory. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryProvider {
    /// Create a provider serving `instance` with no metrics yet.
    pub fn new(instance: InstanceDescriptor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                instance,
                metrics: InstanceMetrics::default(),
                resize_requests: Vec::new(),
                instance_fetches: 0,
                fail_instance: None,
                fail_metrics: None,
                fail_resize: None,
                latency: Duration::ZERO,
                resize_latency: Duration::ZERO,
            })),
        }
    }

    /// A ready instance on a resizable volume of `size` bytes.
    pub fn ready(size: u64) -> Self {
        Self::new(InstanceDescriptor {
            id: "00000000-0000-0000-0000-000000000000".to_string(),
            name: "memory-db".to_string(),
            region: "fr-par".to_string(),
            status: InstanceStatus::Ready,
            volume: Volume {
                kind: VolumeType::Bssd,
                size,
            },
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test thread panicked mid-update.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serve a single-point disk usage reading.
    pub fn set_usage(&self, percent_used: f64) {
        self.lock().metrics = InstanceMetrics::single("disk_usage_percent", percent_used);
    }

    /// Serve an arbitrary metrics response.
    pub fn set_metrics(&self, metrics: InstanceMetrics) {
        self.lock().metrics = metrics;
    }

    pub fn set_status(&self, status: InstanceStatus) {
        self.lock().instance.status = status;
    }

    pub fn set_volume_type(&self, kind: VolumeType) {
        self.lock().instance.volume.kind = kind;
    }

    pub fn set_volume_size(&self, size: u64) {
        self.lock().instance.volume.size = size;
    }

    /// Make every `fetch_instance` fail with `reason` (or succeed again on `None`).
    pub fn fail_instance(&self, reason: Option<&str>) {
        self.lock().fail_instance = reason.map(str::to_string);
    }

    /// Make every `fetch_metrics` fail with `reason` (or succeed again on `None`).
    pub fn fail_metrics(&self, reason: Option<&str>) {
        self.lock().fail_metrics = reason.map(str::to_string);
    }

    /// Make every `resize_volume` fail with `reason` (or succeed again on `None`).
    pub fn fail_resize(&self, reason: Option<&str>) {
        self.lock().fail_resize = reason.map(str::to_string);
    }

    /// Delay every call by `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Delay only `resize_volume`, on top of any general latency.
    pub fn set_resize_latency(&self, latency: Duration) {
        self.lock().resize_latency = latency;
    }

    /// Current descriptor, including applied resizes.
    pub fn instance(&self) -> InstanceDescriptor {
        self.lock().instance.clone()
    }

    /// Sizes passed to `resize_volume`, in call order, failed calls included.
    pub fn resize_requests(&self) -> Vec<u64> {
        self.lock().resize_requests.clone()
    }

    /// Number of `fetch_instance` calls served or failed so far.
    pub fn instance_fetches(&self) -> u32 {
        self.lock().instance_fetches
    }

    async fn delay(&self) {
        let latency = self.lock().latency;
        sleep_for(latency).await;
    }
}

async fn sleep_for(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

impl Provider for MemoryProvider {
    fn fetch_instance(&self) -> ProviderFuture<'_, InstanceDescriptor> {
        Box::pin(async move {
            self.delay().await;
            let mut inner = self.lock();
            inner.instance_fetches += 1;
            if let Some(reason) = &inner.fail_instance {
                return Err(ResizeError::query("fetch instance", reason.clone()));
            }
            Ok(inner.instance.clone())
        })
    }

    fn fetch_metrics<'a>(&'a self, metric_name: &'a str) -> ProviderFuture<'a, InstanceMetrics> {
        Box::pin(async move {
            self.delay().await;
            let inner = self.lock();
            if let Some(reason) = &inner.fail_metrics {
                return Err(ResizeError::query("fetch metrics", reason.clone()));
            }
            debug!(%metric_name, "serving in-memory metrics");
            Ok(inner.metrics.clone())
        })
    }

    fn resize_volume(&self, new_size_bytes: u64) -> ProviderFuture<'_, InstanceDescriptor> {
        Box::pin(async move {
            self.delay().await;
            let resize_latency = self.lock().resize_latency;
            sleep_for(resize_latency).await;
            let mut inner = self.lock();
            inner.resize_requests.push(new_size_bytes);
            if let Some(reason) = &inner.fail_resize {
                return Err(ResizeError::query("upgrade instance", reason.clone()));
            }
            inner.instance.volume.size = new_size_bytes;
            Ok(inner.instance.clone())
        })
    }
}
