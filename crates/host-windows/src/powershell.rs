use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
#[cfg(windows)]
use std::process::Command;
#[cfg(windows)]
use tracing::debug;

const POWERSHELL: &str = "powershell";

#[cfg(windows)]
pub fn run_script(script: &str) -> Result<String> {
    debug!(bytes = script.len(), "running powershell query");
    let output = Command::new(POWERSHELL)
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            script,
        ])
        .output()
        .with_context(|| format!("run {}", POWERSHELL))?;
    if !output.status.success() {
        return Err(anyhow!(
            "{} failed: {}",
            POWERSHELL,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(not(windows))]
pub fn run_script(_script: &str) -> Result<String> {
    Err(anyhow!("{} queries require Windows", POWERSHELL))
}

/// `ConvertTo-Json` emits a bare object for one row, an array for several,
/// and nothing at all for none.
pub fn parse_rows<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let raw = raw.trim_start_matches('\u{feff}').trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.starts_with('[') {
        serde_json::from_str(raw).context("parse powershell JSON array")
    } else {
        Ok(vec![serde_json::from_str(raw).context("parse powershell JSON object")?])
    }
}

pub fn run_json<T: DeserializeOwned>(script: &str) -> Result<Vec<T>> {
    parse_rows(&run_script(script)?)
}

/// Single-quoted PowerShell string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
