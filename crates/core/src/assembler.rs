use crate::grader::{classify_health, grade_performance, HealthSignals};
use crate::model::{DriveReportRow, ErrorTally, PerformanceTable};
use crate::resolver::ResolvedVolume;

/// Joins each resolved volume with the performance and error tables by disk
/// id, grades it, and orders the rows by drive letter.
pub fn assemble_rows(
    resolved: Vec<ResolvedVolume>,
    performance: &PerformanceTable,
    errors: &ErrorTally,
) -> Vec<DriveReportRow> {
    let mut rows: Vec<DriveReportRow> = resolved
        .into_iter()
        .map(|entry| grade_row(entry, performance, errors))
        .collect();
    rows.sort_by_key(|row| row.volume.drive_letter);
    rows
}

pub fn grade_row(
    entry: ResolvedVolume,
    performance: &PerformanceTable,
    errors: &ErrorTally,
) -> DriveReportRow {
    let disk_id = entry.disk.as_option().map(|disk| disk.id);
    let metrics = disk_id
        .map(|id| performance.metrics_for(id))
        .unwrap_or_default();
    let error_count = disk_id.map(|id| errors.count(id)).unwrap_or(0);

    let signals = HealthSignals::from_row(&entry.volume, &entry.disk, error_count);
    let (health, health_basis) = classify_health(&signals);
    let tier = grade_performance(&metrics);

    DriveReportRow {
        volume: entry.volume,
        disk: entry.disk,
        metrics,
        error_count,
        health,
        health_basis,
        performance: tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DiskId, DiskMetrics, DiskRecord, HealthClassification, HealthStatus, MetricKind,
        OperationalStatus, PerformanceTier, Reading, VolumeRecord,
    };

    fn healthy_volume(letter: char) -> VolumeRecord {
        VolumeRecord {
            health: Reading::Available(HealthStatus::Healthy),
            operational: Reading::Available(OperationalStatus::Ok),
            ..VolumeRecord::unavailable(letter)
        }
    }

    fn healthy_disk(number: u32) -> DiskRecord {
        DiskRecord {
            id: DiskId::new(number),
            model: Reading::Available("WDC WD40EFRX".to_string()),
            serial: Reading::Unavailable,
            firmware: Reading::Unavailable,
            capacity_gb: Reading::Available(3726.02),
            health: Reading::Available(HealthStatus::Healthy),
            media_type: Reading::Unavailable,
            partition_style: Reading::Unavailable,
            bus_type: Reading::Unavailable,
            temperature_c: Reading::Unavailable,
            wear_percent: Reading::Unavailable,
        }
    }

    #[test]
    fn resolved_healthy_fast_disk_is_healthy_and_excellent() {
        let mut performance = PerformanceTable::new();
        performance.insert(DiskId::new(0), MetricKind::ReadLatencyMs, 0.4);
        performance.insert(DiskId::new(0), MetricKind::WriteLatencyMs, 0.8);
        let entry = ResolvedVolume {
            volume: healthy_volume('C'),
            disk: Reading::Available(healthy_disk(0)),
        };

        let row = grade_row(entry, &performance, &ErrorTally::new());
        assert_eq!(row.health, HealthClassification::Healthy);
        assert_eq!(row.performance, PerformanceTier::Excellent);
        assert_eq!(row.error_count, 0);
        assert_eq!(row.disk_id(), Some(DiskId::new(0)));
    }

    #[test]
    fn unresolved_volume_has_no_joined_data() {
        let mut performance = PerformanceTable::new();
        performance.insert(DiskId::new(0), MetricKind::ReadLatencyMs, 0.4);
        performance.insert(DiskId::new(0), MetricKind::WriteLatencyMs, 0.8);
        let mut errors = ErrorTally::new();
        errors.record(DiskId::new(0));
        let entry = ResolvedVolume {
            volume: VolumeRecord::unavailable('D'),
            disk: Reading::Unavailable,
        };

        let row = grade_row(entry, &performance, &errors);
        assert_eq!(row.disk, Reading::Unavailable);
        assert_eq!(row.metrics, DiskMetrics::default());
        assert_eq!(row.error_count, 0);
        assert_eq!(row.performance, PerformanceTier::Unavailable);
        assert_eq!(row.health, HealthClassification::Unknown);
    }

    #[test]
    fn unresolved_volume_keeps_its_own_warning() {
        let entry = ResolvedVolume {
            volume: VolumeRecord {
                health: Reading::Available(HealthStatus::Warning),
                ..VolumeRecord::unavailable('E')
            },
            disk: Reading::Unavailable,
        };
        let row = grade_row(entry, &PerformanceTable::new(), &ErrorTally::new());
        assert_eq!(row.health, HealthClassification::Warning);
    }

    #[test]
    fn errors_join_by_disk_id() {
        let mut errors = ErrorTally::new();
        errors.record(DiskId::new(1));
        errors.record(DiskId::new(1));
        let entry = ResolvedVolume {
            volume: healthy_volume('F'),
            disk: Reading::Available(healthy_disk(1)),
        };
        let row = grade_row(entry, &PerformanceTable::new(), &errors);
        assert_eq!(row.error_count, 2);
        assert_eq!(row.health, HealthClassification::Errors);
        assert_eq!(row.health_basis, "errors-logged");
    }

    #[test]
    fn rows_are_ordered_by_drive_letter() {
        let entries = ['F', 'C', 'E', 'D']
            .into_iter()
            .map(|letter| ResolvedVolume {
                volume: healthy_volume(letter),
                disk: Reading::Unavailable,
            })
            .collect();
        let rows = assemble_rows(entries, &PerformanceTable::new(), &ErrorTally::new());
        let letters: Vec<char> = rows.iter().map(|row| row.volume.drive_letter).collect();
        assert_eq!(letters, vec!['C', 'D', 'E', 'F']);
    }
}
