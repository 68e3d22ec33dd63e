use crate::model::{
    Collected, DiskId, DiskRecord, HealthStatus, MediaType, OperationalStatus, PartitionStyle,
    Reading, SourceStatus, VolumeRecord,
};
use crate::source::{DiskInfo, DiskSource, ReliabilitySource, VolumeInfo, VolumeSource};
use crate::units::{bytes_to_gib, free_percent};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A lettered volume and, when it could be resolved, its backing disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVolume {
    pub volume: VolumeRecord,
    pub disk: Reading<DiskRecord>,
}

pub fn resolve_volumes(
    volumes: &dyn VolumeSource,
    disks: &dyn DiskSource,
    reliability: &dyn ReliabilitySource,
) -> Collected<Vec<ResolvedVolume>> {
    let infos = match volumes.volumes() {
        Ok(infos) => infos,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "volume enumeration unavailable");
            return Collected::unavailable(format!("{err:#}"));
        }
    };

    let mut seen = BTreeSet::new();
    let mut resolved = Vec::new();
    for info in &infos {
        let Some(letter) = info.drive_letter.filter(char::is_ascii_alphabetic) else {
            debug!(label = ?info.label, "skipping volume without a drive letter");
            continue;
        };
        let letter = letter.to_ascii_uppercase();
        if !seen.insert(letter) {
            debug!(drive = %letter, "duplicate volume entry ignored");
            continue;
        }
        let volume = volume_record(letter, info);
        let disk = resolve_disk(letter, disks, reliability);
        resolved.push(ResolvedVolume { volume, disk });
    }

    info!(
        volumes = resolved.len(),
        resolved = resolved.iter().filter(|entry| entry.disk.is_available()).count(),
        "volume resolution complete"
    );
    Collected {
        status: SourceStatus::Available {
            records: resolved.len(),
        },
        data: resolved,
    }
}

pub fn volume_record(letter: char, info: &VolumeInfo) -> VolumeRecord {
    let free_pct = match (info.free_bytes, info.size_bytes) {
        (Some(free), Some(total)) => Reading::Available(free_percent(free, total)),
        _ => Reading::Unavailable,
    };
    VolumeRecord {
        drive_letter: letter,
        label: text(&info.label),
        file_system: text(&info.file_system),
        total_gb: info.size_bytes.map(bytes_to_gib).into(),
        free_gb: info.free_bytes.map(bytes_to_gib).into(),
        free_percent: free_pct,
        allocation_unit_bytes: info.allocation_unit_bytes.into(),
        health: parsed(&info.health_status, HealthStatus::parse),
        operational: parsed(&info.operational_status, OperationalStatus::parse),
    }
}

fn resolve_disk(
    letter: char,
    disks: &dyn DiskSource,
    reliability: &dyn ReliabilitySource,
) -> Reading<DiskRecord> {
    match disks.disk_for_volume(letter) {
        Ok(Some(info)) => {
            let mut record = disk_record(&info);
            match reliability.reliability(record.id) {
                Ok(counters) => {
                    record.temperature_c = counters.temperature_c.into();
                    record.wear_percent = counters.wear_percent.into();
                }
                Err(err) => {
                    debug!(disk = %record.id, error = %format!("{err:#}"), "reliability counters unavailable");
                }
            }
            Reading::Available(record)
        }
        Ok(None) => {
            info!(drive = %letter, "volume has no single backing disk");
            Reading::Unavailable
        }
        Err(err) => {
            info!(drive = %letter, error = %format!("{err:#}"), "disk resolution failed");
            Reading::Unavailable
        }
    }
}

pub fn disk_record(info: &DiskInfo) -> DiskRecord {
    DiskRecord {
        id: DiskId::new(info.number),
        model: text(&info.model),
        serial: text(&info.serial),
        firmware: text(&info.firmware),
        capacity_gb: info.size_bytes.map(bytes_to_gib).into(),
        health: parsed(&info.health_status, HealthStatus::parse),
        media_type: parsed(&info.media_type, MediaType::parse),
        partition_style: parsed(&info.partition_style, PartitionStyle::parse),
        bus_type: text(&info.bus_type),
        temperature_c: Reading::Unavailable,
        wear_percent: Reading::Unavailable,
    }
}

fn text(value: &Option<String>) -> Reading<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .into()
}

fn parsed<T>(value: &Option<String>, parse: fn(&str) -> Option<T>) -> Reading<T> {
    value.as_deref().and_then(parse).into()
}
