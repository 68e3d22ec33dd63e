use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Marker written wherever a field has no authoritative value.
pub const UNAVAILABLE: &str = "unavailable";

/// Physical disk ordinal, the single join key shared by the sampler,
/// the error correlator and the volume resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DiskId(u32);

impl DiskId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(DiskId)
    }
}

/// A value that may not have been obtainable during collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Available(T),
    Unavailable,
}

impl<T> Default for Reading<T> {
    fn default() -> Self {
        Reading::Unavailable
    }
}

impl<T> Reading<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }

    pub fn as_ref(&self) -> Reading<&T> {
        match self {
            Reading::Available(value) => Reading::Available(value),
            Reading::Unavailable => Reading::Unavailable,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Available(value) => Reading::Available(f(value)),
            Reading::Unavailable => Reading::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Reading::Available(value),
            None => Reading::Unavailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Reading<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Available(value) => value.fmt(f),
            Reading::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl<T: Serialize> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Available(value) => value.serialize(serializer),
            Reading::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

/// Health status as reported by the storage stack for a disk or a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    /// Accepts both the display names and the raw CIM codes (0, 1, 2, 5).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "healthy" | "0" => Some(HealthStatus::Healthy),
            "warning" | "1" => Some(HealthStatus::Warning),
            "unhealthy" | "2" => Some(HealthStatus::Unhealthy),
            _ => Some(HealthStatus::Unknown),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Warning => "Warning",
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a volume. Anything other than `OK` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationalStatus {
    Ok,
    Other(String),
}

impl OperationalStatus {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.eq_ignore_ascii_case("ok") || value == "2" {
            Some(OperationalStatus::Ok)
        } else {
            Some(OperationalStatus::Other(value.to_string()))
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, OperationalStatus::Ok)
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalStatus::Ok => f.write_str("OK"),
            OperationalStatus::Other(value) => f.write_str(value),
        }
    }
}

impl Serialize for OperationalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaType {
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "SCM")]
    Scm,
    Unspecified,
}

impl MediaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "hdd" | "3" => Some(MediaType::Hdd),
            "ssd" | "4" => Some(MediaType::Ssd),
            "scm" | "5" => Some(MediaType::Scm),
            _ => Some(MediaType::Unspecified),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Hdd => "HDD",
            MediaType::Ssd => "SSD",
            MediaType::Scm => "SCM",
            MediaType::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartitionStyle {
    #[serde(rename = "RAW")]
    Raw,
    #[serde(rename = "MBR")]
    Mbr,
    #[serde(rename = "GPT")]
    Gpt,
}

impl PartitionStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" | "0" => Some(PartitionStyle::Raw),
            "mbr" | "1" => Some(PartitionStyle::Mbr),
            "gpt" | "2" => Some(PartitionStyle::Gpt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionStyle::Raw => "RAW",
            PartitionStyle::Mbr => "MBR",
            PartitionStyle::Gpt => "GPT",
        }
    }
}

impl fmt::Display for PartitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-disk I/O metrics, already in report units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MetricKind {
    ReadLatencyMs,
    WriteLatencyMs,
    QueueLength,
    ReadIops,
    WriteIops,
    ReadMbps,
    WriteMbps,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::ReadLatencyMs,
        MetricKind::WriteLatencyMs,
        MetricKind::QueueLength,
        MetricKind::ReadIops,
        MetricKind::WriteIops,
        MetricKind::ReadMbps,
        MetricKind::WriteMbps,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::ReadLatencyMs => "Read latency (ms)",
            MetricKind::WriteLatencyMs => "Write latency (ms)",
            MetricKind::QueueLength => "Queue length",
            MetricKind::ReadIops => "Read IOPS",
            MetricKind::WriteIops => "Write IOPS",
            MetricKind::ReadMbps => "Read MB/s",
            MetricKind::WriteMbps => "Write MB/s",
        }
    }
}

/// Rounded window means keyed by disk and metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceTable {
    values: BTreeMap<(DiskId, MetricKind), f64>,
}

impl PerformanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, disk: DiskId, kind: MetricKind, value: f64) {
        self.values.insert((disk, kind), value);
    }

    pub fn get(&self, disk: DiskId, kind: MetricKind) -> Option<f64> {
        self.values.get(&(disk, kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn disks(&self) -> Vec<DiskId> {
        let mut disks: Vec<DiskId> = self.values.keys().map(|(disk, _)| *disk).collect();
        disks.dedup();
        disks
    }

    pub fn metrics_for(&self, disk: DiskId) -> DiskMetrics {
        let read = |kind| Reading::from(self.get(disk, kind));
        DiskMetrics {
            read_latency_ms: read(MetricKind::ReadLatencyMs),
            write_latency_ms: read(MetricKind::WriteLatencyMs),
            queue_length: read(MetricKind::QueueLength),
            read_iops: read(MetricKind::ReadIops),
            write_iops: read(MetricKind::WriteIops),
            read_mbps: read(MetricKind::ReadMbps),
            write_mbps: read(MetricKind::WriteMbps),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DiskMetrics {
    pub read_latency_ms: Reading<f64>,
    pub write_latency_ms: Reading<f64>,
    pub queue_length: Reading<f64>,
    pub read_iops: Reading<f64>,
    pub write_iops: Reading<f64>,
    pub read_mbps: Reading<f64>,
    pub write_mbps: Reading<f64>,
}

impl DiskMetrics {
    pub fn get(&self, kind: MetricKind) -> Reading<f64> {
        match kind {
            MetricKind::ReadLatencyMs => self.read_latency_ms,
            MetricKind::WriteLatencyMs => self.write_latency_ms,
            MetricKind::QueueLength => self.queue_length,
            MetricKind::ReadIops => self.read_iops,
            MetricKind::WriteIops => self.write_iops,
            MetricKind::ReadMbps => self.read_mbps,
            MetricKind::WriteMbps => self.write_mbps,
        }
    }
}

/// Qualifying error events per disk. A disk without an entry has zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    counts: BTreeMap<DiskId, u32>,
}

impl ErrorTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, disk: DiskId) {
        let count = self.counts.entry(disk).or_insert(0);
        *count = count.saturating_add(1);
    }

    pub fn count(&self, disk: DiskId) -> u32 {
        self.counts.get(&disk).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DiskId, u32)> + '_ {
        self.counts.iter().map(|(disk, count)| (*disk, *count))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRecord {
    pub drive_letter: char,
    pub label: Reading<String>,
    pub file_system: Reading<String>,
    pub total_gb: Reading<f64>,
    pub free_gb: Reading<f64>,
    pub free_percent: Reading<f64>,
    pub allocation_unit_bytes: Reading<u64>,
    pub health: Reading<HealthStatus>,
    pub operational: Reading<OperationalStatus>,
}

impl VolumeRecord {
    pub fn unavailable(drive_letter: char) -> Self {
        Self {
            drive_letter,
            label: Reading::Unavailable,
            file_system: Reading::Unavailable,
            total_gb: Reading::Unavailable,
            free_gb: Reading::Unavailable,
            free_percent: Reading::Unavailable,
            allocation_unit_bytes: Reading::Unavailable,
            health: Reading::Unavailable,
            operational: Reading::Unavailable,
        }
    }

    pub fn mount_point(&self) -> String {
        format!("{}:", self.drive_letter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRecord {
    pub id: DiskId,
    pub model: Reading<String>,
    pub serial: Reading<String>,
    pub firmware: Reading<String>,
    pub capacity_gb: Reading<f64>,
    pub health: Reading<HealthStatus>,
    pub media_type: Reading<MediaType>,
    pub partition_style: Reading<PartitionStyle>,
    pub bus_type: Reading<String>,
    pub temperature_c: Reading<u32>,
    pub wear_percent: Reading<u32>,
}

/// Composite per-row verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthClassification {
    Healthy,
    Warning,
    Failed,
    Offline,
    Errors,
    Unknown,
}

impl HealthClassification {
    /// `Offline` and `Errors` are reported as failed states alongside `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            HealthClassification::Failed
                | HealthClassification::Offline
                | HealthClassification::Errors
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthClassification::Healthy => "Healthy",
            HealthClassification::Warning => "Warning",
            HealthClassification::Failed => "Failed",
            HealthClassification::Offline => "Offline",
            HealthClassification::Errors => "Errors",
            HealthClassification::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Unavailable,
}

impl PerformanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Fair => "Fair",
            PerformanceTier::Poor => "Poor",
            PerformanceTier::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveReportRow {
    pub volume: VolumeRecord,
    pub disk: Reading<DiskRecord>,
    pub metrics: DiskMetrics,
    pub error_count: u32,
    pub health: HealthClassification,
    /// Name of the grading rule that produced `health`.
    pub health_basis: &'static str,
    pub performance: PerformanceTier,
}

impl DriveReportRow {
    pub fn disk_id(&self) -> Option<DiskId> {
        self.disk.as_option().map(|disk| disk.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    Available { records: usize },
    Unavailable { reason: String },
}

impl SourceStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SourceStatus::Available { .. })
    }
}

/// Output of one collector plus how its backing source behaved.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub data: T,
    pub status: SourceStatus,
}

impl<T: Default> Collected<T> {
    pub fn unavailable(reason: impl fmt::Display) -> Self {
        Self {
            data: T::default(),
            status: SourceStatus::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub performance: SourceStatus,
    pub events: SourceStatus,
    pub volumes: SourceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    pub os: String,
    pub machine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub report_id: Uuid,
    pub schema_version: String,
    pub generated_at_utc: String,
    pub host: HostInfo,
    pub sampling_seconds: f64,
    pub lookback_hours: u32,
    pub sources: SourceReport,
    pub rows: Vec<DriveReportRow>,
}

impl HealthReport {
    pub fn count_where(&self, predicate: impl Fn(&DriveReportRow) -> bool) -> usize {
        self.rows.iter().filter(|row| predicate(row)).count()
    }
}
