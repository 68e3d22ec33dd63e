use crate::powershell::{parse_rows, run_script};
use anyhow::Result;
use drivepulse_core::source::{CounterReading, SamplingWindow};
use drivepulse_core::MetricKind;
use serde::Deserialize;
use tracing::debug;

/// `PhysicalDisk` counters and the metric each one feeds.
const COUNTERS: [(&str, MetricKind); 7] = [
    ("avg. disk sec/read", MetricKind::ReadLatencyMs),
    ("avg. disk sec/write", MetricKind::WriteLatencyMs),
    ("current disk queue length", MetricKind::QueueLength),
    ("disk reads/sec", MetricKind::ReadIops),
    ("disk writes/sec", MetricKind::WriteIops),
    ("disk read bytes/sec", MetricKind::ReadMbps),
    ("disk write bytes/sec", MetricKind::WriteMbps),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CounterRow {
    path: String,
    instance_name: Option<String>,
    cooked_value: Option<f64>,
}

pub fn sample_counters(window: &SamplingWindow) -> Result<Vec<CounterReading>> {
    let raw = run_script(&counter_script(window))?;
    let rows: Vec<CounterRow> = parse_rows(&raw)?;
    Ok(readings_from_rows(rows))
}

fn counter_script(window: &SamplingWindow) -> String {
    let paths = COUNTERS
        .iter()
        .map(|(name, _)| format!("'\\PhysicalDisk(*)\\{}'", name))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"
        $ErrorActionPreference = "Stop";
        Get-Counter -Counter @({paths}) -SampleInterval {interval} -MaxSamples {count} |
          ForEach-Object {{ $_.CounterSamples }} |
          Select-Object Path, InstanceName, CookedValue |
          ConvertTo-Json -Depth 3 -Compress
        "#,
        paths = paths,
        interval = window.interval.as_secs().max(1),
        count = window.sample_count,
    )
}

fn readings_from_rows(rows: Vec<CounterRow>) -> Vec<CounterReading> {
    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(metric) = metric_for_path(&row.path) else {
            debug!(path = %row.path, "unrecognised counter path");
            continue;
        };
        let (Some(instance), Some(value)) = (row.instance_name, row.cooked_value) else {
            continue;
        };
        readings.push(CounterReading {
            instance,
            metric,
            value,
        });
    }
    readings
}

/// Counter paths look like `\\host\physicaldisk(0 c:)\avg. disk sec/read`.
fn metric_for_path(path: &str) -> Option<MetricKind> {
    let path = path.to_ascii_lowercase();
    let name = path.rsplit_once(")\\").map(|(_, name)| name)?;
    COUNTERS
        .iter()
        .find(|(counter, _)| *counter == name)
        .map(|(_, metric)| *metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn maps_counter_paths_to_metrics() {
        assert_eq!(
            metric_for_path(r"\\DESKTOP-01\physicaldisk(0 c:)\avg. disk sec/read"),
            Some(MetricKind::ReadLatencyMs)
        );
        assert_eq!(
            metric_for_path(r"\\desktop-01\physicaldisk(_total)\Disk Write Bytes/sec"),
            Some(MetricKind::WriteMbps)
        );
        assert_eq!(metric_for_path(r"\\desktop-01\processor(_total)\% processor time"), None);
        assert_eq!(metric_for_path("garbage"), None);
    }

    #[test]
    fn keeps_instance_names_verbatim() {
        let raw = r#"[
            {"Path":"\\\\pc\\physicaldisk(0 c:)\\avg. disk sec/read","InstanceName":"0 c:","CookedValue":0.0005},
            {"Path":"\\\\pc\\physicaldisk(1 d: e:)\\disk reads/sec","InstanceName":"1 d: e:","CookedValue":12.5},
            {"Path":"\\\\pc\\physicaldisk(_total)\\disk reads/sec","InstanceName":"_total","CookedValue":null}
        ]"#;
        let rows: Vec<CounterRow> = parse_rows(raw).unwrap();
        let readings = readings_from_rows(rows);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].instance, "0 c:");
        assert_eq!(readings[0].metric, MetricKind::ReadLatencyMs);
        assert_eq!(readings[1].instance, "1 d: e:");
        assert_eq!(readings[1].value, 12.5);
    }

    #[test]
    fn script_requests_every_counter_for_the_window() {
        let script = counter_script(&SamplingWindow::new(5, Duration::from_secs(1)));
        assert!(script.contains("-SampleInterval 1 -MaxSamples 5"));
        for (name, _) in COUNTERS {
            assert!(script.contains(name));
        }
    }
}
