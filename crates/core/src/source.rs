//! Capabilities the engine consumes from the host.
//!
//! Each trait covers one OS subsystem. Implementations report failures as
//! `Err`; the collectors turn those into empty results so a missing
//! subsystem never aborts a run.

use crate::model::{DiskId, MetricKind};
use anyhow::Result;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingWindow {
    pub sample_count: u32,
    pub interval: Duration,
}

impl SamplingWindow {
    pub fn new(sample_count: u32, interval: Duration) -> Self {
        Self {
            sample_count: sample_count.max(1),
            interval,
        }
    }

    /// Approximate time the caller is blocked while sampling. Saturates.
    pub fn duration(&self) -> Duration {
        self.interval
            .checked_mul(self.sample_count)
            .unwrap_or(Duration::MAX)
    }
}

/// One raw counter value for one instance at one sample point.
///
/// `value` is in source units: seconds for latencies, bytes per second for
/// throughput, operations per second for IOPS.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterReading {
    pub instance: String,
    pub metric: MetricKind,
    pub value: f64,
}

pub trait CounterSource {
    fn sample(&self, window: &SamplingWindow) -> Result<Vec<CounterReading>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub log_name: String,
    pub event_ids: Vec<u32>,
    pub since: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub event_id: u32,
    pub provider: Option<String>,
    pub message: String,
}

pub trait EventLogSource {
    fn query(&self, query: &EventQuery) -> Result<Vec<LogEvent>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeInfo {
    pub drive_letter: Option<char>,
    pub label: Option<String>,
    pub file_system: Option<String>,
    pub size_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
    pub allocation_unit_bytes: Option<u64>,
    pub health_status: Option<String>,
    pub operational_status: Option<String>,
}

pub trait VolumeSource {
    fn volumes(&self) -> Result<Vec<VolumeInfo>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskInfo {
    pub number: u32,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub firmware: Option<String>,
    pub size_bytes: Option<u64>,
    pub health_status: Option<String>,
    pub media_type: Option<String>,
    pub partition_style: Option<String>,
    pub bus_type: Option<String>,
}

pub trait DiskSource {
    /// `Ok(None)` when the volume has no single backing disk
    /// (spanned or virtual volumes).
    fn disk_for_volume(&self, drive_letter: char) -> Result<Option<DiskInfo>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReliabilityInfo {
    pub temperature_c: Option<u32>,
    pub wear_percent: Option<u32>,
}

pub trait ReliabilitySource {
    fn reliability(&self, disk: DiskId) -> Result<ReliabilityInfo>;
}

/// The full set of capabilities a diagnostics run reads from.
#[derive(Clone, Copy)]
pub struct SystemSources<'a> {
    pub counters: &'a dyn CounterSource,
    pub events: &'a dyn EventLogSource,
    pub volumes: &'a dyn VolumeSource,
    pub disks: &'a dyn DiskSource,
    pub reliability: &'a dyn ReliabilitySource,
}

impl<'a> SystemSources<'a> {
    /// Uses one value that implements every capability.
    pub fn from_host<H>(host: &'a H) -> Self
    where
        H: CounterSource + EventLogSource + VolumeSource + DiskSource + ReliabilitySource,
    {
        Self {
            counters: host,
            events: host,
            volumes: host,
            disks: host,
            reliability: host,
        }
    }
}
