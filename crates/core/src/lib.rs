use time::format_description::well_known::Rfc3339;

pub mod assembler;
pub mod config;
pub mod correlator;
pub mod grader;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod sampler;
pub mod source;
pub mod units;

pub use config::{load_config, DiagnosticsConfig};
pub use correlator::{DiskIdExtractor, PatternExtractor};
pub use model::{
    DiskId, DiskMetrics, DiskRecord, DriveReportRow, ErrorTally, HealthClassification,
    HealthReport, HealthStatus, HostInfo, MediaType, MetricKind, OperationalStatus,
    PartitionStyle, PerformanceTable, PerformanceTier, Reading, SourceReport, SourceStatus,
    VolumeRecord, UNAVAILABLE,
};
pub use pipeline::run_diagnostics;
pub use source::SystemSources;

pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
