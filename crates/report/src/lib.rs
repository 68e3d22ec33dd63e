use anyhow::{Context, Result};
use drivepulse_core::{now_utc_rfc3339, HealthReport, REPORT_SCHEMA_VERSION};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod render;

pub use render::{render_html, render_json, render_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Json,
    Text,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Text => "txt",
        }
    }

    pub fn render(self, report: &HealthReport) -> Result<String> {
        match self {
            ReportFormat::Html => Ok(render_html(report)),
            ReportFormat::Json => render_json(report),
            ReportFormat::Text => Ok(render_text(report)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(format!("unknown report format '{}' (html, json, text)", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportPaths {
    pub run_id: String,
    pub root: PathBuf,
    pub document: PathBuf,
    pub run_json: PathBuf,
}

#[derive(Debug, Serialize)]
struct RunMetadata {
    run_id: String,
    created_at_utc: String,
    report_schema_version: String,
    format: ReportFormat,
    rows: usize,
    failed_rows: usize,
}

/// Writes `<base>/reports/<report_id>/` holding the rendered document and `run.json`.
pub fn create_report_bundle(
    base: impl AsRef<Path>,
    report: &HealthReport,
    format: ReportFormat,
) -> Result<ReportPaths> {
    let run_id = report.report_id.to_string();
    let root = base.as_ref().join("reports").join(&run_id);
    std::fs::create_dir_all(&root)
        .with_context(|| format!("create report directory {}", root.display()))?;

    let document = root.join(format!("drive-health.{}", format.extension()));
    let run_json = root.join("run.json");

    std::fs::write(&document, format.render(report)?)
        .with_context(|| format!("write {}", document.display()))?;

    let run_meta = RunMetadata {
        run_id: run_id.clone(),
        created_at_utc: now_utc_rfc3339(),
        report_schema_version: REPORT_SCHEMA_VERSION.to_string(),
        format,
        rows: report.rows.len(),
        failed_rows: report.count_where(|row| row.health.is_failed()),
    };
    std::fs::write(&run_json, serde_json::to_string_pretty(&run_meta)?)
        .with_context(|| format!("write {}", run_json.display()))?;

    Ok(ReportPaths {
        run_id,
        root,
        document,
        run_json,
    })
}
