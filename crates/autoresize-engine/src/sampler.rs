//! Usage sampler — one disk usage reading per cycle.

use std::time::Duration;

use autoresize_core::{InstanceMetrics, Provider, ResizeError, ResizeResult};

use crate::bounded::bounded;

/// Provider metric reporting used disk space as a percentage.
pub const DISK_USAGE_METRIC: &str = "disk_usage_percent";

/// Extract the usage percentage from a metrics response.
///
/// The response must hold exactly one series with exactly one point. Any
/// other shape, or a non-finite value, is a malformed metric.
pub fn usage_from_metrics(metrics: &InstanceMetrics) -> ResizeResult<f64> {
    let [series] = metrics.timeseries.as_slice() else {
        return Err(ResizeError::MalformedMetric(format!(
            "expected 1 time series, got {}",
            metrics.timeseries.len()
        )));
    };
    let [point] = series.points.as_slice() else {
        return Err(ResizeError::MalformedMetric(format!(
            "expected 1 point in series '{}', got {}",
            series.name,
            series.points.len()
        )));
    };

    let value = point.value();
    if !value.is_finite() {
        return Err(ResizeError::MalformedMetric(format!(
            "non-finite value {value} in series '{}'",
            series.name
        )));
    }
    Ok(value)
}

/// Fetch and validate the current disk usage percentage.
pub async fn sample_usage<P: Provider + ?Sized>(
    provider: &P,
    timeout: Duration,
) -> ResizeResult<f64> {
    let metrics = bounded(
        "fetch metrics",
        timeout,
        provider.fetch_metrics(DISK_USAGE_METRIC),
    )
    .await?;
    usage_from_metrics(&metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use autoresize_core::{MemoryProvider, MetricPoint, TimeSeries};

    fn series(points: &[f64]) -> TimeSeries {
        TimeSeries {
            name: DISK_USAGE_METRIC.to_string(),
            points: points
                .iter()
                .map(|v| MetricPoint("2024-05-01T10:00:00Z".to_string(), *v))
                .collect(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn single_point_is_accepted() {
        let metrics = InstanceMetrics {
            timeseries: vec![series(&[91.25])],
        };
        assert_eq!(usage_from_metrics(&metrics).unwrap(), 91.25);
    }

    #[test]
    fn zero_series_is_malformed() {
        let err = usage_from_metrics(&InstanceMetrics::default()).unwrap_err();
        assert!(matches!(err, ResizeError::MalformedMetric(_)));
    }

    #[test]
    fn multiple_series_is_malformed() {
        let metrics = InstanceMetrics {
            timeseries: vec![series(&[50.0]), series(&[60.0])],
        };
        let err = usage_from_metrics(&metrics).unwrap_err();
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn zero_or_many_points_is_malformed() {
        for points in [&[][..], &[10.0, 20.0][..]] {
            let metrics = InstanceMetrics {
                timeseries: vec![series(points)],
            };
            assert!(matches!(
                usage_from_metrics(&metrics),
                Err(ResizeError::MalformedMetric(_))
            ));
        }
    }

    #[test]
    fn nan_is_malformed() {
        let metrics = InstanceMetrics {
            timeseries: vec![series(&[f64::NAN])],
        };
        assert!(matches!(
            usage_from_metrics(&metrics),
            Err(ResizeError::MalformedMetric(_))
        ));
    }

    #[tokio::test]
    async fn sample_reads_from_provider() {
        let provider = MemoryProvider::ready(80);
        provider.set_usage(72.5);

        let usage = sample_usage(&provider, Duration::from_secs(1)).await.unwrap();
        assert_eq!(usage, 72.5);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = MemoryProvider::ready(80);
        provider.set_usage(72.5);
        provider.set_latency(Duration::from_secs(120));

        let err = sample_usage(&provider, Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResizeError::ProviderQuery {
                operation: "fetch metrics",
                ..
            }
        ));
        assert!(err.to_string().contains("timed out"));
    }
}
