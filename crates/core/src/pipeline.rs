use crate::assembler::assemble_rows;
use crate::config::DiagnosticsConfig;
use crate::correlator::{correlate_errors, DiskIdExtractor};
use crate::model::{HealthReport, HostInfo, SourceReport};
use crate::resolver::resolve_volumes;
use crate::sampler::sample_performance;
use crate::source::SystemSources;
use crate::{now_utc_rfc3339, REPORT_SCHEMA_VERSION};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

/// Runs every collector in order and grades the joined result.
///
/// Blocks for the sampling window first. Never fails: each unavailable
/// source degrades to an empty result recorded in `HealthReport::sources`.
pub fn run_diagnostics(
    sources: &SystemSources<'_>,
    config: &DiagnosticsConfig,
    extractor: &dyn DiskIdExtractor,
    host: HostInfo,
) -> HealthReport {
    let window = config.sampling_window();
    let performance = sample_performance(sources.counters, &window);

    let query = config.event_query(OffsetDateTime::now_utc());
    let errors = correlate_errors(sources.events, &query, extractor);

    let resolved = resolve_volumes(sources.volumes, sources.disks, sources.reliability);

    let rows = assemble_rows(resolved.data, &performance.data, &errors.data);
    info!(
        rows = rows.len(),
        failed = rows.iter().filter(|row| row.health.is_failed()).count(),
        "diagnostics complete"
    );

    HealthReport {
        report_id: Uuid::new_v4(),
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at_utc: now_utc_rfc3339(),
        host,
        sampling_seconds: window.duration().as_secs_f64(),
        lookback_hours: config.lookback_hours,
        sources: SourceReport {
            performance: performance.status,
            events: errors.status,
            volumes: resolved.status,
        },
        rows,
    }
}
