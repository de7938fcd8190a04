//! Domain types for the managed database instance.
//!
//! These mirror the JSON the provider returns for an instance and for its
//! metrics. They are fetched fresh whenever needed and never persisted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Instance ──────────────────────────────────────────────────────

/// Snapshot of the managed database instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceDescriptor {
    pub id: String,
    pub name: String,
    pub region: String,
    pub status: InstanceStatus,
    pub volume: Volume,
}

/// Storage volume attached to the instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Volume {
    #[serde(rename = "type")]
    pub kind: VolumeType,
    /// Provisioned size in bytes.
    pub size: u64,
}

/// Lifecycle status of the instance as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Ready,
    DiskFull,
    Provisioning,
    Configuring,
    Deleting,
    Error,
    Autohealing,
    Locked,
    Initializing,
    Backuping,
    Snapshotting,
    Restarting,
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Only a ready or disk-full instance accepts a volume upgrade.
    pub fn allows_resize(self) -> bool {
        matches!(self, Self::Ready | Self::DiskFull)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::DiskFull => "disk_full",
            Self::Provisioning => "provisioning",
            Self::Configuring => "configuring",
            Self::Deleting => "deleting",
            Self::Error => "error",
            Self::Autohealing => "autohealing",
            Self::Locked => "locked",
            Self::Initializing => "initializing",
            Self::Backuping => "backuping",
            Self::Snapshotting => "snapshotting",
            Self::Restarting => "restarting",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage class of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeType {
    #[serde(rename = "lssd")]
    Lssd,
    #[serde(rename = "bssd")]
    Bssd,
    #[serde(rename = "sbs_5k")]
    Sbs5k,
    #[serde(rename = "sbs_15k")]
    Sbs15k,
    #[serde(other)]
    Unknown,
}

impl VolumeType {
    /// Whether the volume can be grown while the instance stays online.
    pub fn supports_online_resize(self) -> bool {
        self == Self::Bssd
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lssd => "lssd",
            Self::Bssd => "bssd",
            Self::Sbs5k => "sbs_5k",
            Self::Sbs15k => "sbs_15k",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Metrics ───────────────────────────────────────────────────────

/// Raw metrics response for one instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InstanceMetrics {
    #[serde(default)]
    pub timeseries: Vec<TimeSeries>,
}

/// A named series of timestamped values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    #[serde(default)]
    pub points: Vec<MetricPoint>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A `[timestamp, value]` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricPoint(pub String, pub f64);

impl MetricPoint {
    pub fn value(&self) -> f64 {
        self.1
    }
}

impl InstanceMetrics {
    /// A response with exactly one series holding exactly one point.
    pub fn single(name: &str, value: f64) -> Self {
        Self {
            timeseries: vec![TimeSeries {
                name: name.to_string(),
                points: vec![MetricPoint("1970-01-01T00:00:00Z".to_string(), value)],
                metadata: HashMap::new(),
            }],
        }
    }
}
