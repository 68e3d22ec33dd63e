use crate::extents::disk_number_for_drive;
use crate::powershell::run_json;
use anyhow::{anyhow, Result};
use drivepulse_core::source::{DiskInfo, ReliabilityInfo, VolumeInfo};
use drivepulse_core::DiskId;
use serde::Deserialize;
use tracing::debug;

const VOLUME_SCRIPT: &str = r#"
    $ErrorActionPreference = "Stop";
    Get-Volume | ForEach-Object {
      [pscustomobject]@{
        DriveLetter = "$($_.DriveLetter)".Trim([char]0).Trim();
        FileSystemLabel = $_.FileSystemLabel;
        FileSystem = $_.FileSystem;
        Size = $_.Size;
        SizeRemaining = $_.SizeRemaining;
        AllocationUnitSize = $_.AllocationUnitSize;
        HealthStatus = "$($_.HealthStatus)";
        OperationalStatus = "$($_.OperationalStatus)"
      }
    } | ConvertTo-Json -Depth 2 -Compress
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VolumeRow {
    drive_letter: Option<String>,
    file_system_label: Option<String>,
    file_system: Option<String>,
    size: Option<u64>,
    size_remaining: Option<u64>,
    allocation_unit_size: Option<u64>,
    health_status: Option<String>,
    operational_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DiskRow {
    number: u32,
    model: Option<String>,
    serial_number: Option<String>,
    firmware_version: Option<String>,
    size: Option<u64>,
    health_status: Option<String>,
    media_type: Option<String>,
    partition_style: Option<String>,
    bus_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ReliabilityRow {
    temperature: Option<u32>,
    wear: Option<u32>,
}

pub fn list_volumes() -> Result<Vec<VolumeInfo>> {
    let rows: Vec<VolumeRow> = run_json(VOLUME_SCRIPT)?;
    Ok(rows.into_iter().map(volume_info).collect())
}

pub fn disk_for_drive(drive_letter: char) -> Result<Option<DiskInfo>> {
    let Some(number) = disk_number_for_drive(drive_letter)? else {
        debug!(drive = %drive_letter, "volume spans zero or several disks");
        return Ok(None);
    };
    let rows: Vec<DiskRow> = run_json(&disk_script(number))?;
    Ok(rows.into_iter().next().map(disk_info))
}

pub fn reliability_for(disk: DiskId) -> Result<ReliabilityInfo> {
    let rows: Vec<ReliabilityRow> = run_json(&reliability_script(disk))?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no reliability counters for disk {}", disk))?;
    Ok(reliability_info(row))
}

fn disk_script(number: u32) -> String {
    // Health and media type come from the physical disk when the storage
    // stack exposes one for this ordinal.
    format!(
        r#"
        $ErrorActionPreference = "Stop";
        $d = Get-Disk -Number {number};
        $p = Get-PhysicalDisk | Where-Object {{ $_.DeviceId -eq '{number}' }} | Select-Object -First 1;
        [pscustomobject]@{{
          Number = $d.Number;
          Model = $d.FriendlyName;
          SerialNumber = $d.SerialNumber;
          FirmwareVersion = $d.FirmwareVersion;
          Size = $d.Size;
          HealthStatus = if ($p) {{ "$($p.HealthStatus)" }} else {{ "$($d.HealthStatus)" }};
          MediaType = if ($p) {{ "$($p.MediaType)" }} else {{ $null }};
          PartitionStyle = "$($d.PartitionStyle)";
          BusType = "$($d.BusType)"
        }} | ConvertTo-Json -Depth 2 -Compress
        "#,
        number = number,
    )
}

fn reliability_script(disk: DiskId) -> String {
    format!(
        r#"
        $ErrorActionPreference = "Stop";
        Get-PhysicalDisk | Where-Object {{ $_.DeviceId -eq '{number}' }} |
          Get-StorageReliabilityCounter |
          Select-Object Temperature, Wear |
          ConvertTo-Json -Depth 2 -Compress
        "#,
        number = disk.number(),
    )
}

fn volume_info(row: VolumeRow) -> VolumeInfo {
    VolumeInfo {
        drive_letter: row
            .drive_letter
            .as_deref()
            .and_then(|letter| letter.chars().next())
            .filter(char::is_ascii_alphabetic),
        label: row.file_system_label,
        file_system: row.file_system,
        size_bytes: row.size,
        free_bytes: row.size_remaining,
        allocation_unit_bytes: row.allocation_unit_size,
        health_status: row.health_status,
        operational_status: row.operational_status,
    }
}

fn disk_info(row: DiskRow) -> DiskInfo {
    DiskInfo {
        number: row.number,
        model: row.model,
        serial: row.serial_number,
        firmware: row.firmware_version,
        size_bytes: row.size,
        health_status: row.health_status,
        media_type: row.media_type,
        partition_style: row.partition_style,
        bus_type: row.bus_type,
    }
}

/// Drives without a thermal sensor report 0 °C.
fn reliability_info(row: ReliabilityRow) -> ReliabilityInfo {
    ReliabilityInfo {
        temperature_c: row.temperature.filter(|celsius| *celsius > 0),
        wear_percent: row.wear,
    }
}
