use anyhow::Result;
use drivepulse_core::{
    DiskRecord, DriveReportRow, HealthClassification, HealthReport, PerformanceTier, Reading,
    SourceStatus, UNAVAILABLE,
};
use std::fmt::Write as _;

pub const COLUMNS: [&str; 29] = [
    "Drive",
    "Label",
    "File system",
    "Cluster (B)",
    "Size (GB)",
    "Free (GB)",
    "Free %",
    "Volume health",
    "Operational",
    "Disk",
    "Model",
    "Serial",
    "Firmware",
    "Capacity (GB)",
    "Media",
    "Partition",
    "Bus",
    "Temp (C)",
    "Wear %",
    "Errors",
    "Read ms",
    "Write ms",
    "Queue",
    "Read IOPS",
    "Write IOPS",
    "Read MB/s",
    "Write MB/s",
    "Health",
    "Performance",
];

fn fixed(reading: &Reading<f64>, decimals: usize) -> String {
    match reading {
        Reading::Available(value) => format!("{:.*}", decimals, value),
        Reading::Unavailable => UNAVAILABLE.to_string(),
    }
}

fn disk_field<T: ToString>(row: &DriveReportRow, field: impl Fn(&DiskRecord) -> Reading<T>) -> String {
    match row.disk.as_option() {
        Some(disk) => match field(disk) {
            Reading::Available(value) => value.to_string(),
            Reading::Unavailable => UNAVAILABLE.to_string(),
        },
        None => UNAVAILABLE.to_string(),
    }
}

/// One display string per column of `COLUMNS`.
pub fn row_cells(row: &DriveReportRow) -> Vec<String> {
    let volume = &row.volume;
    let metrics = &row.metrics;
    vec![
        volume.mount_point(),
        volume.label.to_string(),
        volume.file_system.to_string(),
        volume.allocation_unit_bytes.to_string(),
        fixed(&volume.total_gb, 2),
        fixed(&volume.free_gb, 2),
        fixed(&volume.free_percent, 1),
        volume.health.to_string(),
        volume.operational.to_string(),
        disk_field(row, |disk| Reading::Available(disk.id)),
        disk_field(row, |disk| disk.model.clone()),
        disk_field(row, |disk| disk.serial.clone()),
        disk_field(row, |disk| disk.firmware.clone()),
        disk_field(row, |disk| disk.capacity_gb.map(|gb| format!("{:.2}", gb))),
        disk_field(row, |disk| disk.media_type),
        disk_field(row, |disk| disk.partition_style),
        disk_field(row, |disk| disk.bus_type.clone()),
        disk_field(row, |disk| disk.temperature_c),
        disk_field(row, |disk| disk.wear_percent),
        row.error_count.to_string(),
        fixed(&metrics.read_latency_ms, 2),
        fixed(&metrics.write_latency_ms, 2),
        fixed(&metrics.queue_length, 2),
        fixed(&metrics.read_iops, 0),
        fixed(&metrics.write_iops, 0),
        fixed(&metrics.read_mbps, 2),
        fixed(&metrics.write_mbps, 2),
        row.health.to_string(),
        row.performance.to_string(),
    ]
}

pub fn render_json(report: &HealthReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn source_line(name: &str, status: &SourceStatus) -> String {
    match status {
        SourceStatus::Available { records } => format!("{}: {} records", name, records),
        SourceStatus::Unavailable { reason } => format!("{}: unavailable ({})", name, reason),
    }
}

fn source_lines(report: &HealthReport) -> [String; 3] {
    [
        source_line("performance counters", &report.sources.performance),
        source_line("event log", &report.sources.events),
        source_line("volumes", &report.sources.volumes),
    ]
}

pub fn render_text(report: &HealthReport) -> String {
    let rows: Vec<Vec<String>> = report.rows.iter().map(row_cells).collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|name| name.len()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Drive health report for {} ({})",
        report.host.machine, report.generated_at_utc
    );
    for source in source_lines(report) {
        let _ = writeln!(out, "  {}", source);
    }
    out.push('\n');
    let header: Vec<String> = COLUMNS.iter().map(|name| name.to_string()).collect();
    let _ = writeln!(out, "{}", line(&header));
    for cells in &rows {
        let _ = writeln!(out, "{}", line(cells));
    }
    if rows.is_empty() {
        out.push_str("(no lettered volumes found)\n");
    }
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn health_class(health: HealthClassification) -> &'static str {
    match health {
        HealthClassification::Healthy => "healthy",
        HealthClassification::Warning => "warning",
        HealthClassification::Unknown => "unknown",
        _ => "failed",
    }
}

fn tier_class(tier: PerformanceTier) -> &'static str {
    match tier {
        PerformanceTier::Excellent | PerformanceTier::Good => "healthy",
        PerformanceTier::Fair => "warning",
        PerformanceTier::Poor => "failed",
        PerformanceTier::Unavailable => "unknown",
    }
}

const STYLE: &str = "body{font-family:Segoe UI,Arial,sans-serif;margin:24px}\
table{border-collapse:collapse}th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f0f0f0}.healthy{color:#1a7f37}.warning{color:#9a6700}\
.failed{color:#cf222e;font-weight:bold}.unknown{color:#6e7781}";

pub fn render_html(report: &HealthReport) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    let _ = write!(
        out,
        "<title>Drive health - {}</title><style>{}</style></head><body>\n",
        escape_html(&report.host.machine),
        STYLE
    );
    let _ = writeln!(
        out,
        "<h1>Drive health - {}</h1>\n<p>Generated {} &middot; sampled {:.0}s &middot; events from the last {}h</p>",
        escape_html(&report.host.machine),
        escape_html(&report.generated_at_utc),
        report.sampling_seconds,
        report.lookback_hours
    );

    out.push_str("<ul>\n");
    for source in source_lines(report) {
        let _ = writeln!(out, "<li>{}</li>", escape_html(&source));
    }
    out.push_str("</ul>\n<table>\n<tr>");
    for name in COLUMNS {
        let _ = write!(out, "<th>{}</th>", escape_html(name));
    }
    out.push_str("</tr>\n");

    let health_column = COLUMNS.len() - 2;
    let tier_column = COLUMNS.len() - 1;
    for row in &report.rows {
        out.push_str("<tr>");
        for (index, cell) in row_cells(row).iter().enumerate() {
            let class = if index == health_column {
                Some(health_class(row.health))
            } else if index == tier_column {
                Some(tier_class(row.performance))
            } else {
                None
            };
            match class {
                Some(class) => {
                    let _ = write!(
                        out,
                        "<td class=\"{}\" title=\"{}\">{}</td>",
                        class,
                        escape_html(if index == health_column { row.health_basis } else { "" }),
                        escape_html(cell)
                    );
                }
                None => {
                    let _ = write!(out, "<td>{}</td>", escape_html(cell));
                }
            }
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    if report.rows.is_empty() {
        out.push_str("<p>No lettered volumes found.</p>\n");
    }
    out.push_str(
        "<p>Health: Healthy, Warning, Failed, Offline, Errors, Unknown. \
         Performance by mean read/write latency: Excellent &lt;1 ms, Good &lt;5 ms, \
         Fair &lt;15 ms, Poor otherwise.</p>\n</body></html>\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivepulse_core::{
        DiskId, DiskMetrics, HealthStatus, HostInfo, MediaType, OperationalStatus, SourceReport,
        VolumeRecord,
    };
    use uuid::Uuid;

    fn sample_report() -> HealthReport {
        let c = DriveReportRow {
            volume: VolumeRecord {
                file_system: Reading::Available("NTFS".to_string()),
                total_gb: Reading::Available(475.69),
                free_gb: Reading::Available(111.79),
                free_percent: Reading::Available(23.5),
                allocation_unit_bytes: Reading::Available(4096),
                health: Reading::Available(HealthStatus::Healthy),
                operational: Reading::Available(OperationalStatus::Ok),
                ..VolumeRecord::unavailable('C')
            },
            disk: Reading::Available(DiskRecord {
                id: DiskId::new(0),
                model: Reading::Available("Samsung <SSD> 970".to_string()),
                serial: Reading::Unavailable,
                firmware: Reading::Unavailable,
                capacity_gb: Reading::Available(476.94),
                health: Reading::Available(HealthStatus::Healthy),
                media_type: Reading::Available(MediaType::Ssd),
                partition_style: Reading::Unavailable,
                bus_type: Reading::Unavailable,
                temperature_c: Reading::Available(39),
                wear_percent: Reading::Unavailable,
            }),
            metrics: DiskMetrics {
                read_latency_ms: Reading::Available(0.4),
                write_latency_ms: Reading::Available(0.8),
                queue_length: Reading::Available(0.25),
                read_iops: Reading::Available(182.0),
                write_iops: Reading::Available(47.0),
                read_mbps: Reading::Available(12.5),
                write_mbps: Reading::Available(3.75),
            },
            error_count: 0,
            health: HealthClassification::Healthy,
            health_basis: "healthy-and-error-free",
            performance: PerformanceTier::Excellent,
        };
        let d = DriveReportRow {
            volume: VolumeRecord::unavailable('D'),
            disk: Reading::Unavailable,
            metrics: DiskMetrics::default(),
            error_count: 0,
            health: HealthClassification::Unknown,
            health_basis: "no-signal",
            performance: PerformanceTier::Unavailable,
        };
        HealthReport {
            report_id: Uuid::nil(),
            schema_version: "1.0.0".to_string(),
            generated_at_utc: "2026-10-19T08:00:00Z".to_string(),
            host: HostInfo {
                os: "windows".to_string(),
                machine: "WORKSTATION".to_string(),
            },
            sampling_seconds: 5.0,
            lookback_hours: 24,
            sources: SourceReport {
                performance: SourceStatus::Available { records: 14 },
                events: SourceStatus::Unavailable {
                    reason: "access denied".to_string(),
                },
                volumes: SourceStatus::Available { records: 2 },
            },
            rows: vec![c, d],
        }
    }

    fn cell<'a>(cells: &'a [String], column: &str) -> &'a str {
        let index = COLUMNS
            .iter()
            .position(|name| *name == column)
            .unwrap();
        &cells[index]
    }

    #[test]
    fn cells_mark_missing_disk_fields_unavailable() {
        let report = sample_report();
        let cells = row_cells(&report.rows[1]);
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cell(&cells, "Drive"), "D:");
        for column in [
            "Cluster (B)",
            "Volume health",
            "Operational",
            "Disk",
            "Model",
            "Serial",
            "Capacity (GB)",
            "Queue",
            "Read IOPS",
            "Write MB/s",
        ] {
            assert_eq!(cell(&cells, column), UNAVAILABLE, "{}", column);
        }
        assert_eq!(cell(&cells, "Errors"), "0");
        assert_eq!(cell(&cells, "Health"), "Unknown");
        assert_eq!(cell(&cells, "Performance"), "Unavailable");
    }

    #[test]
    fn cells_format_resolved_disk() {
        let report = sample_report();
        let cells = row_cells(&report.rows[0]);
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cell(&cells, "Cluster (B)"), "4096");
        assert_eq!(cell(&cells, "Size (GB)"), "475.69");
        assert_eq!(cell(&cells, "Free %"), "23.5");
        assert_eq!(cell(&cells, "Volume health"), "Healthy");
        assert_eq!(cell(&cells, "Operational"), "OK");
        assert_eq!(cell(&cells, "Disk"), "0");
        assert_eq!(cell(&cells, "Capacity (GB)"), "476.94");
        assert_eq!(cell(&cells, "Serial"), UNAVAILABLE);
        assert_eq!(cell(&cells, "Media"), "SSD");
        assert_eq!(cell(&cells, "Temp (C)"), "39");
        assert_eq!(cell(&cells, "Read ms"), "0.40");
        assert_eq!(cell(&cells, "Queue"), "0.25");
        assert_eq!(cell(&cells, "Read IOPS"), "182");
        assert_eq!(cell(&cells, "Write IOPS"), "47");
        assert_eq!(cell(&cells, "Read MB/s"), "12.50");
        assert_eq!(cell(&cells, "Write MB/s"), "3.75");
    }

    #[test]
    fn html_shows_cluster_size_column() {
        let html = render_html(&sample_report());
        assert!(html.contains("<th>Cluster (B)</th>"));
        assert!(html.contains("<td>4096</td>"));
    }

    #[test]
    fn text_report_lists_every_row_and_source() {
        let text = render_text(&sample_report());
        assert!(text.contains("event log: unavailable (access denied)"));
        assert!(text.lines().any(|line| line.starts_with("C:")));
        assert!(text.lines().any(|line| line.starts_with("D:")));
    }

    #[test]
    fn html_escapes_cell_text() {
        let html = render_html(&sample_report());
        assert!(html.contains("Samsung &lt;SSD&gt; 970"));
        assert!(!html.contains("<SSD>"));
        assert!(html.contains("class=\"healthy\""));
        assert!(html.contains("class=\"unknown\""));
    }

    #[test]
    fn json_keeps_unavailable_markers() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][1]["disk"], "unavailable");
        assert_eq!(value["sources"]["events"]["state"], "unavailable");
    }
}
