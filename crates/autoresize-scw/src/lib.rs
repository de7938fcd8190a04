//! autoresize-scw — provider adapter driving the `scw` command-line client.
//!
//! Each provider call runs one `scw rdb instance …` command with JSON output
//! and decodes stdout into the core types. Authentication and transport
//! stay with the vendor client: it reads `SCW_ACCESS_KEY`, `SCW_SECRET_KEY`
//! and its own profile files, the daemon never touches credentials.
//!
//! # Commands
//!
//! ```text
//! fetch_instance  → scw rdb instance get         instance-id=<id> region=<r> -o json
//! fetch_metrics   → scw rdb instance get-metrics instance-id=<id> region=<r> metric-name=<m> -o json
//! resize_volume   → scw rdb instance upgrade     instance-id=<id> region=<r> volume-size=<bytes> -o json
//! ```
//!
//! Children are spawned with `kill_on_drop`, so when the engine's per-call
//! timeout drops a pending call the command is killed with it.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::debug;

use autoresize_core::{
    InstanceDescriptor, InstanceMetrics, Provider, ProviderFuture, ResizeError, ResizeResult,
};

/// Environment variable overriding the location of the `scw` binary.
pub const PROGRAM_ENV: &str = "SCW_CLI_PATH";

/// Program looked up on `$PATH` when [`PROGRAM_ENV`] is unset.
pub const DEFAULT_PROGRAM: &str = "scw";

/// Provider for one RDB instance, backed by the `scw` CLI.
#[derive(Debug, Clone)]
pub struct ScwCliProvider {
    program: PathBuf,
    region: String,
    instance_id: String,
}

impl ScwCliProvider {
    /// Create a provider for `instance_id` in `region`.
    ///
    /// The program is taken from `$SCW_CLI_PATH`, falling back to `scw`.
    pub fn new(region: &str, instance_id: &str) -> ResizeResult<Self> {
        let region = region.trim();
        let instance_id = instance_id.trim();
        if region.is_empty() {
            return Err(ResizeError::Config("region is not set".to_string()));
        }
        if instance_id.is_empty() {
            return Err(ResizeError::Config("instance id is not set".to_string()));
        }

        Ok(Self {
            program: locate_program(),
            region: region.to_string(),
            instance_id: instance_id.to_string(),
        })
    }

    /// Use a specific `scw` binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Arguments for `scw rdb instance <verb>` on this instance.
    fn args(&self, verb: &str, extra: &[String]) -> Vec<String> {
        let mut args = vec![
            "rdb".to_string(),
            "instance".to_string(),
            verb.to_string(),
            format!("instance-id={}", self.instance_id),
            format!("region={}", self.region),
        ];
        args.extend_from_slice(extra);
        args.push("-o".to_string());
        args.push("json".to_string());
        args
    }

    async fn run<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: Vec<String>,
    ) -> ResizeResult<T> {
        debug!(program = %self.program.display(), ?args, "running scw");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ResizeError::query(
                    operation,
                    format!("failed to execute {}: {e}", self.program.display()),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            status = %output.status,
            %stdout,
            %stderr,
            "scw finished"
        );

        if !output.status.success() {
            return Err(ResizeError::query(
                operation,
                format!("scw exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        decode(operation, &output.stdout)
    }
}

impl Provider for ScwCliProvider {
    fn fetch_instance(&self) -> ProviderFuture<'_, InstanceDescriptor> {
        Box::pin(self.run("fetch instance", self.args("get", &[])))
    }

    fn fetch_metrics<'a>(&'a self, metric_name: &'a str) -> ProviderFuture<'a, InstanceMetrics> {
        let extra = [format!("metric-name={metric_name}")];
        Box::pin(self.run("fetch metrics", self.args("get-metrics", &extra)))
    }

    fn resize_volume(&self, new_size_bytes: u64) -> ProviderFuture<'_, InstanceDescriptor> {
        let extra = [format!("volume-size={new_size_bytes}")];
        Box::pin(self.run("upgrade instance", self.args("upgrade", &extra)))
    }
}

/// Resolve the `scw` program from the environment.
pub fn locate_program() -> PathBuf {
    match std::env::var(PROGRAM_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_PROGRAM),
    }
}

/// Decode the JSON printed by `scw … -o json`.
pub fn decode<T: DeserializeOwned>(operation: &'static str, stdout: &[u8]) -> ResizeResult<T> {
    serde_json::from_slice(stdout)
        .map_err(|e| ResizeError::query(operation, format!("cannot decode scw output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoresize_core::{InstanceStatus, VolumeType};

    const INSTANCE_JSON: &str = r#"{
        "created_at": "2024-01-10T08:00:00Z",
        "volume": { "type": "bssd", "size": 80000000000 },
        "region": "fr-par",
        "id": "9d1f6a8e-3f0b-4b5e-8a77-1c2d3e4f5a6b",
        "name": "orders-db",
        "organization_id": "org",
        "project_id": "proj",
        "status": "ready",
        "engine": "PostgreSQL-15",
        "tags": [],
        "is_ha_cluster": false,
        "node_type": "db-dev-s"
    }"#;

    const METRICS_JSON: &str = r#"{
        "timeseries": [{
            "name": "disk_usage_percent",
            "points": [["2024-05-01T10:00:00Z", 93.7]],
            "metadata": { "node": "0" }
        }]
    }"#;

    fn provider() -> ScwCliProvider {
        ScwCliProvider::new("fr-par", "9d1f6a8e").unwrap()
    }

    #[test]
    fn new_rejects_missing_identifiers() {
        assert!(matches!(
            ScwCliProvider::new("", "id"),
            Err(ResizeError::Config(_))
        ));
        assert!(matches!(
            ScwCliProvider::new("fr-par", "  "),
            Err(ResizeError::Config(_))
        ));
    }

    #[test]
    fn args_target_the_instance_with_json_output() {
        let args = provider().args("upgrade", &["volume-size=85000000000".to_string()]);
        assert_eq!(
            args,
            vec![
                "rdb",
                "instance",
                "upgrade",
                "instance-id=9d1f6a8e",
                "region=fr-par",
                "volume-size=85000000000",
                "-o",
                "json",
            ]
        );
    }

    #[test]
    fn decode_instance_output() {
        let instance: InstanceDescriptor = decode("fetch instance", INSTANCE_JSON.as_bytes()).unwrap();
        assert_eq!(instance.name, "orders-db");
        assert_eq!(instance.status, InstanceStatus::Ready);
        assert_eq!(instance.volume.kind, VolumeType::Bssd);
        assert_eq!(instance.volume.size, 80_000_000_000);
    }

    #[test]
    fn decode_metrics_output() {
        let metrics: InstanceMetrics = decode("fetch metrics", METRICS_JSON.as_bytes()).unwrap();
        assert_eq!(metrics.timeseries[0].points[0].value(), 93.7);
    }

    #[test]
    fn decode_garbage_is_a_query_error() {
        let err = decode::<InstanceDescriptor>("fetch instance", b"Error: unknown command")
            .unwrap_err();
        assert!(matches!(
            err,
            ResizeError::ProviderQuery {
                operation: "fetch instance",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_program_is_a_query_error() {
        let provider = provider().with_program("/nonexistent/bin/scw");
        let err = provider.fetch_instance().await.unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }

    #[cfg(unix)]
    mod fake_cli {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable `scw` stand-in that records its arguments
        /// and prints `response` (or fails when `exit_code` is non-zero).
        fn fake_scw(dir: &Path, response: &str, exit_code: i32) -> PathBuf {
            std::fs::write(dir.join("response.json"), response).unwrap();
            let script = format!(
                "#!/bin/sh\n\
                 dir=$(dirname \"$0\")\n\
                 printf '%s\\n' \"$@\" > \"$dir/args\"\n\
                 if [ {exit_code} -ne 0 ]; then echo 'scaleway-sdk-go: permission denied' >&2; exit {exit_code}; fi\n\
                 cat \"$dir/response.json\"\n"
            );
            let path = dir.join("scw");
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn resize_runs_upgrade_command() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_scw(dir.path(), INSTANCE_JSON, 0);
            let provider = provider().with_program(program);

            let instance = provider.resize_volume(85_000_000_000).await.unwrap();
            assert_eq!(instance.name, "orders-db");

            let args = std::fs::read_to_string(dir.path().join("args")).unwrap();
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(&args[..3], &["rdb", "instance", "upgrade"]);
            assert!(args.contains(&"volume-size=85000000000"));
        }

        #[tokio::test]
        async fn metrics_request_names_the_metric() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_scw(dir.path(), METRICS_JSON, 0);
            let provider = provider().with_program(program);

            let metrics = provider.fetch_metrics("disk_usage_percent").await.unwrap();
            assert_eq!(metrics.timeseries.len(), 1);

            let args = std::fs::read_to_string(dir.path().join("args")).unwrap();
            assert!(args.lines().any(|a| a == "metric-name=disk_usage_percent"));
        }

        #[tokio::test]
        async fn non_zero_exit_carries_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_scw(dir.path(), "", 1);
            let provider = provider().with_program(program);

            let err = provider.fetch_instance().await.unwrap_err();
            assert!(err.to_string().contains("permission denied"));
        }
    }
}
