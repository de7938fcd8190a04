//! autoresized — keeps a managed database volume from running out of space.
//!
//! Samples disk usage every poll interval and grows the volume by a fixed
//! increment when usage crosses the trigger percentage, never beyond the
//! configured size limit.
//!
//! # Usage
//!
//! ```text
//! SCW_ACCESS_KEY=… SCW_SECRET_KEY=… \
//! autoresized --region fr-par --instance-id <uuid> --volume-size-limit 500GB
//! ```
//!
//! Exits non-zero when the options are invalid, when the instance fails
//! its startup checks, or when a refused resize is fatal under
//! `--on-guard-violation abort`. Otherwise it runs until SIGINT/SIGTERM.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use autoresize_core::human_size;
use autoresize_engine::Autoresizer;
use autoresize_scw::ScwCliProvider;

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "rdb autoresizer failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.config().context("error parsing options")?;
    info!(
        volume_size_limit = %human_size(config.size_limit_bytes()),
        trigger_percentage = config.trigger_percent(),
        increment = %human_size(config.increment_bytes()),
        version = env!("CARGO_PKG_VERSION"),
        "rdb autoresizer started"
    );

    let mut provider = ScwCliProvider::new(&args.region, &args.instance_id)
        .context("error creating provider")?;
    if let Some(path) = &args.scw_path {
        provider = provider.with_program(path.clone());
    }
    debug!(program = %provider.program().display(), "using scw client");

    let resizer = Autoresizer::new(Arc::new(provider), config);
    resizer
        .preflight()
        .await
        .context("error during instance pre-checks")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_handle = tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let result = resizer.run(shutdown_rx).await;
    signal_handle.abort();
    result.context("control loop aborted")?;

    info!("rdb autoresizer stopped");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an `scw` stand-in that answers `get` and `get-metrics` from
    /// files next to it and records every verb it was called with.
    fn fake_scw(dir: &Path, status: &str, size: u64, percent_used: f64) -> PathBuf {
        let instance = format!(
            r#"{{"id":"9d1f6a8e","name":"orders-db","region":"fr-par","status":"{status}","volume":{{"type":"bssd","size":{size}}}}}"#
        );
        let metrics = format!(
            r#"{{"timeseries":[{{"name":"disk_usage_percent","points":[["2024-05-01T10:00:00Z",{percent_used}]]}}]}}"#
        );
        std::fs::write(dir.join("instance.json"), instance).unwrap();
        std::fs::write(dir.join("metrics.json"), metrics).unwrap();

        let script = "#!/bin/sh\n\
             dir=$(dirname \"$0\")\n\
             echo \"$3\" >> \"$dir/calls\"\n\
             case \"$3\" in\n\
               get) cat \"$dir/instance.json\" ;;\n\
               get-metrics) cat \"$dir/metrics.json\" ;;\n\
               upgrade) cat \"$dir/instance.json\" ;;\n\
               *) echo \"unexpected command: $*\" >&2; exit 1 ;;\n\
             esac\n";
        let path = dir.join("scw");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn calls(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn args(program: &Path, extra: &[&str]) -> Args {
        let mut argv = vec![
            "autoresized",
            "--region",
            "fr-par",
            "--instance-id",
            "9d1f6a8e",
            "--scw-path",
            program.to_str().unwrap(),
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn invalid_options_fail_before_calling_scw() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_scw(dir.path(), "ready", 80_000_000_000, 50.0);

        let err = run(args(
            &program,
            &["--trigger-percentage", "75", "--volume-size-limit", "100GB"],
        ))
        .await
        .unwrap_err();

        assert!(format!("{err:#}").starts_with("error parsing options"));
        assert!(calls(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn instance_at_the_limit_fails_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_scw(dir.path(), "ready", 100_000_000_000, 99.0);

        let err = run(args(&program, &["--volume-size-limit", "100GB"]))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").starts_with("error during instance pre-checks"));
        assert_eq!(calls(dir.path()), vec!["get"]);
    }

    #[tokio::test]
    async fn abort_policy_stops_the_daemon_on_refusal() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_scw(dir.path(), "backuping", 80_000_000_000, 99.0);

        let err = run(args(
            &program,
            &[
                "--volume-size-limit",
                "100GB",
                "--on-guard-violation",
                "abort",
            ],
        ))
        .await
        .unwrap_err();

        assert!(format!("{err:#}").starts_with("control loop aborted"));
        assert_eq!(calls(dir.path()), vec!["get", "get-metrics", "get"]);
    }
}
