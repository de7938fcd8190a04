//! Per-call timeout for provider operations.

use std::future::Future;
use std::time::Duration;

use autoresize_core::{ResizeError, ResizeResult};
use tracing::debug;

/// Await `call`, turning an elapsed `timeout` into a provider query error.
///
/// Dropping the timed-out future cancels the underlying call.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = ResizeResult<T>>,
) -> ResizeResult<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            debug!(operation, ?timeout, "provider call timed out");
            Err(ResizeError::query(
                operation,
                format!("timed out after {timeout:?}"),
            ))
        }
    }
}
