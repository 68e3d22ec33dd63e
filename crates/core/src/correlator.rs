use crate::model::{Collected, DiskId, ErrorTally, SourceStatus};
use crate::source::{EventLogSource, EventQuery, LogEvent};
use regex::Regex;
use tracing::{debug, info, warn};

/// Phrases that name a physical disk inside an event message, tried in order.
pub const DISK_ID_PATTERNS: [&str; 2] = [r"(?i)\bdisk\s+(\d+)\b", r"(?i)PhysicalDrive(\d+)"];

/// Attributes free-text event messages to a physical disk.
pub trait DiskIdExtractor {
    fn extract_disk_id(&self, message: &str) -> Option<DiskId>;
}

/// Regex-driven extractor. The first capture group of the first matching
/// pattern is the disk ordinal.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    patterns: Vec<Regex>,
}

impl PatternExtractor {
    pub fn new(patterns: &[&str]) -> anyhow::Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn standard() -> Self {
        Self {
            patterns: DISK_ID_PATTERNS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

impl DiskIdExtractor for PatternExtractor {
    fn extract_disk_id(&self, message: &str) -> Option<DiskId> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(message)
                .and_then(|caps| caps.get(1))
                .and_then(|ordinal| ordinal.as_str().parse().ok())
        })
    }
}

/// Scans the lookback window and counts attributable events per disk.
pub fn correlate_errors(
    source: &dyn EventLogSource,
    query: &EventQuery,
    extractor: &dyn DiskIdExtractor,
) -> Collected<ErrorTally> {
    info!(
        log = %query.log_name,
        event_ids = ?query.event_ids,
        "scanning storage error events"
    );
    match source.query(query) {
        Ok(events) => {
            let tally = tally_events(&events, extractor);
            info!(
                events = events.len(),
                attributed = tally.total(),
                "error correlation complete"
            );
            Collected {
                status: SourceStatus::Available {
                    records: events.len(),
                },
                data: tally,
            }
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "event log unavailable");
            Collected::unavailable(format!("{err:#}"))
        }
    }
}

pub fn tally_events(events: &[LogEvent], extractor: &dyn DiskIdExtractor) -> ErrorTally {
    let mut tally = ErrorTally::new();
    for event in events {
        match extractor.extract_disk_id(&event.message) {
            Some(disk) => tally.record(disk),
            None => debug!(event_id = event.event_id, "event does not name a disk"),
        }
    }
    tally
}
