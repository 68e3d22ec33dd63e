use crate::powershell::{quote, run_json};
use anyhow::{Context, Result};
use drivepulse_core::source::{EventQuery, LogEvent};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EventRow {
    id: u32,
    provider_name: Option<String>,
    message: Option<String>,
}

pub fn query_events(query: &EventQuery) -> Result<Vec<LogEvent>> {
    let rows: Vec<EventRow> = run_json(&event_script(query)?)?;
    Ok(rows.into_iter().map(log_event).collect())
}

fn event_script(query: &EventQuery) -> Result<String> {
    let since = query.since.format(&Rfc3339).context("format event start time")?;
    let ids = query
        .event_ids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    // Get-WinEvent reports an empty result as an error; only that one is swallowed.
    Ok(format!(
        r#"
        $ErrorActionPreference = "Stop";
        $filter = @{{ LogName = {log}; Id = @({ids}); StartTime = [datetime]::Parse({since}) }};
        try {{
          $events = Get-WinEvent -FilterHashtable $filter
        }} catch {{
          if ($_.FullyQualifiedErrorId -like 'NoMatchingEventsFound*') {{ $events = @() }} else {{ throw }}
        }}
        $events | Select-Object Id, ProviderName, Message | ConvertTo-Json -Depth 2 -Compress
        "#,
        log = quote(&query.log_name),
        ids = ids,
        since = quote(&since),
    ))
}

fn log_event(row: EventRow) -> LogEvent {
    LogEvent {
        event_id: row.id,
        provider: row.provider_name,
        message: row.message.unwrap_or_default(),
    }
}
