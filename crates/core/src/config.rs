use crate::source::{EventQuery, SamplingWindow};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use time::OffsetDateTime;

pub const DEFAULT_SAMPLE_COUNT: u32 = 5;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;
pub const DEFAULT_LOG_NAME: &str = "System";

pub const MAX_SAMPLE_COUNT: u32 = 3600;
pub const MAX_SAMPLE_INTERVAL_SECS: u64 = 3600;
/// One year.
pub const MAX_LOOKBACK_HOURS: u32 = 8760;

/// System log event ids that indicate a storage fault.
pub const DISK_BAD_BLOCK: u32 = 7;
pub const DISK_CONTROLLER_TIMEOUT: u32 = 9;
pub const DISK_CONTROLLER_ERROR: u32 = 11;
pub const DISK_NOT_READY: u32 = 15;
pub const DISK_PAGING_ERROR: u32 = 51;
pub const DISK_FAILURE_PREDICTED: u32 = 52;
pub const NTFS_CORRUPTION: u32 = 55;
pub const DISK_RESET: u32 = 129;
pub const DISK_IO_RETRIED: u32 = 153;
pub const DISK_SURPRISE_REMOVED: u32 = 157;

pub const DEFAULT_EVENT_IDS: [u32; 10] = [
    DISK_BAD_BLOCK,
    DISK_CONTROLLER_TIMEOUT,
    DISK_CONTROLLER_ERROR,
    DISK_NOT_READY,
    DISK_PAGING_ERROR,
    DISK_FAILURE_PREDICTED,
    NTFS_CORRUPTION,
    DISK_RESET,
    DISK_IO_RETRIED,
    DISK_SURPRISE_REMOVED,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub sample_count: u32,
    pub sample_interval_secs: u64,
    pub lookback_hours: u32,
    pub log_name: String,
    pub event_ids: Vec<u32>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            log_name: DEFAULT_LOG_NAME.to_string(),
            event_ids: DEFAULT_EVENT_IDS.to_vec(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SAMPLE_COUNT).contains(&self.sample_count) {
            return Err(anyhow!("sample_count must be in 1..={}", MAX_SAMPLE_COUNT));
        }
        if !(1..=MAX_SAMPLE_INTERVAL_SECS).contains(&self.sample_interval_secs) {
            return Err(anyhow!(
                "sample_interval_secs must be in 1..={}",
                MAX_SAMPLE_INTERVAL_SECS
            ));
        }
        if !(1..=MAX_LOOKBACK_HOURS).contains(&self.lookback_hours) {
            return Err(anyhow!("lookback_hours must be in 1..={}", MAX_LOOKBACK_HOURS));
        }
        if self.log_name.trim().is_empty() {
            return Err(anyhow!("log_name must not be empty"));
        }
        if self.event_ids.is_empty() {
            return Err(anyhow!("event_ids must list at least one event id"));
        }
        Ok(())
    }

    pub fn sampling_window(&self) -> SamplingWindow {
        SamplingWindow::new(
            self.sample_count,
            Duration::from_secs(self.sample_interval_secs),
        )
    }

    /// A lookback reaching past the representable range starts at the epoch.
    pub fn event_query(&self, now: OffsetDateTime) -> EventQuery {
        let lookback = time::Duration::hours(i64::from(self.lookback_hours));
        EventQuery {
            log_name: self.log_name.clone(),
            event_ids: self.event_ids.clone(),
            since: now
                .checked_sub(lookback)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<DiagnosticsConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: DiagnosticsConfig = serde_json::from_str(&data)
        .with_context(|| format!("parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
