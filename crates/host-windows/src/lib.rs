//! Windows implementations of the drivepulse collection capabilities.
//!
//! Storage, counter and event queries go through PowerShell and come back
//! as JSON. The volume-to-disk mapping uses `IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS`.
//! On other platforms both the PowerShell runner and the extent query are
//! stubbed, so every capability fails and the run degrades to an empty report.

use anyhow::Result;
use drivepulse_core::source::{
    CounterReading, CounterSource, DiskInfo, DiskSource, EventLogSource, EventQuery, LogEvent,
    ReliabilityInfo, ReliabilitySource, SamplingWindow, VolumeInfo, VolumeSource,
};
use drivepulse_core::{DiskId, HostInfo};

mod counters;
mod events;
mod powershell;
mod storage;

#[cfg(windows)]
mod extents;
#[cfg(not(windows))]
#[path = "extents_stub.rs"]
mod extents;

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHost;

impl WindowsHost {
    pub fn new() -> Self {
        Self
    }
}

impl CounterSource for WindowsHost {
    fn sample(&self, window: &SamplingWindow) -> Result<Vec<CounterReading>> {
        counters::sample_counters(window)
    }
}

impl EventLogSource for WindowsHost {
    fn query(&self, query: &EventQuery) -> Result<Vec<LogEvent>> {
        events::query_events(query)
    }
}

impl VolumeSource for WindowsHost {
    fn volumes(&self) -> Result<Vec<VolumeInfo>> {
        storage::list_volumes()
    }
}

impl DiskSource for WindowsHost {
    fn disk_for_volume(&self, drive_letter: char) -> Result<Option<DiskInfo>> {
        storage::disk_for_drive(drive_letter)
    }
}

impl ReliabilitySource for WindowsHost {
    fn reliability(&self, disk: DiskId) -> Result<ReliabilityInfo> {
        storage::reliability_for(disk)
    }
}

pub fn host_info() -> HostInfo {
    HostInfo {
        os: std::env::consts::OS.to_string(),
        machine: std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "unknown".to_string()),
    }
}
