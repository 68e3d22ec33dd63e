use crate::model::{Collected, DiskId, MetricKind, PerformanceTable, SourceStatus};
use crate::source::{CounterReading, CounterSource, SamplingWindow};
use crate::units::{bytes_per_sec_to_mbps, round_to, seconds_to_ms};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Blocks for the sampling window and returns per-disk window means.
pub fn sample_performance(
    source: &dyn CounterSource,
    window: &SamplingWindow,
) -> Collected<PerformanceTable> {
    info!(
        samples = window.sample_count,
        interval_ms = window.interval.as_millis() as u64,
        "sampling disk performance counters"
    );
    match source.sample(window) {
        Ok(readings) => {
            let table = aggregate_readings(&readings);
            info!(
                readings = readings.len(),
                disks = table.disks().len(),
                "performance sampling complete"
            );
            Collected {
                status: SourceStatus::Available {
                    records: table.len(),
                },
                data: table,
            }
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "performance counters unavailable");
            Collected::unavailable(format!("{err:#}"))
        }
    }
}

/// Averages raw readings per disk and metric, then converts to report units.
pub fn aggregate_readings(readings: &[CounterReading]) -> PerformanceTable {
    let mut sums: BTreeMap<(DiskId, MetricKind), (f64, u32)> = BTreeMap::new();
    for reading in readings {
        let Some(disk) = disk_id_from_instance(&reading.instance) else {
            debug!(instance = %reading.instance, "counter instance has no disk ordinal");
            continue;
        };
        if !reading.value.is_finite() {
            continue;
        }
        let entry = sums.entry((disk, reading.metric)).or_insert((0.0, 0));
        entry.0 += reading.value;
        entry.1 += 1;
    }

    let mut table = PerformanceTable::new();
    for ((disk, metric), (sum, count)) in sums {
        let mean = sum / f64::from(count);
        table.insert(disk, metric, convert(metric, mean));
    }
    table
}

/// Counter instances look like `0 C:` or `1 D: E:`; the leading ordinal is
/// the disk number and the mount letters that follow are dropped. Instances
/// without an ordinal (`_Total`) yield `None`.
pub fn disk_id_from_instance(instance: &str) -> Option<DiskId> {
    let trimmed = instance.trim();
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn convert(metric: MetricKind, raw: f64) -> f64 {
    match metric {
        MetricKind::ReadLatencyMs | MetricKind::WriteLatencyMs => seconds_to_ms(raw),
        MetricKind::ReadMbps | MetricKind::WriteMbps => bytes_per_sec_to_mbps(raw),
        MetricKind::ReadIops | MetricKind::WriteIops => raw.round(),
        MetricKind::QueueLength => round_to(raw, 2),
    }
}
