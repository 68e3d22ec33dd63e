use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use drivepulse_core::{
    load_config, run_diagnostics, DiagnosticsConfig, HealthReport, PatternExtractor,
    SystemSources,
};
use drivepulse_host_windows::{host_info, WindowsHost};
use drivepulse_report::{create_report_bundle, render_json, render_text, ReportFormat};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "drivepulse", about = "Storage health diagnostics for local drives")]
struct Cli {
    /// JSON file with sampling and event log settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Number of performance counter samples.
    #[arg(long, global = true)]
    samples: Option<u32>,
    /// Seconds between samples.
    #[arg(long, global = true)]
    interval: Option<u64>,
    /// How far back to read the event log.
    #[arg(long, global = true)]
    lookback_hours: Option<u32>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a report bundle under <base>/reports/<run id>/.
    Report {
        #[arg(long, default_value = ".")]
        base: PathBuf,
        #[arg(long, default_value = "html")]
        format: ReportFormat,
    },
    /// Print the report to stdout.
    Show {
        #[arg(long, value_enum, default_value_t = ShowFormat::Text)]
        format: ShowFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShowFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let report = collect(&config);

    match cli.command {
        Command::Report { base, format } => {
            let paths = create_report_bundle(base, &report, format)?;
            info!(run_id = %paths.run_id, %format, "report bundle written");
            println!("report_root: {}", paths.root.display());
            println!("document: {}", paths.document.display());
            println!("run_json: {}", paths.run_json.display());
        }
        Command::Show { format } => match format {
            ShowFormat::Text => print!("{}", render_text(&report)),
            ShowFormat::Json => println!("{}", render_json(&report)?),
        },
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<DiagnosticsConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DiagnosticsConfig::default(),
    };
    if let Some(samples) = cli.samples {
        config.sample_count = samples;
    }
    if let Some(interval) = cli.interval {
        config.sample_interval_secs = interval;
    }
    if let Some(hours) = cli.lookback_hours {
        config.lookback_hours = hours;
    }
    config.validate()?;
    Ok(config)
}

fn collect(config: &DiagnosticsConfig) -> HealthReport {
    let host = WindowsHost::new();
    run_diagnostics(
        &SystemSources::from_host(&host),
        config,
        &PatternExtractor::standard(),
        host_info(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "drivepulse",
            "show",
            "--samples",
            "3",
            "--lookback-hours",
            "48",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.sample_count, 3);
        assert_eq!(config.lookback_hours, 48);
        assert_eq!(config.sample_interval_secs, 1);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cli = Cli::try_parse_from(["drivepulse", "show", "--interval", "0"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn report_format_parses() {
        let cli = Cli::try_parse_from(["drivepulse", "report", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Report {
                format: ReportFormat::Json,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["drivepulse", "report", "--format", "pdf"]).is_err());
        assert!(Cli::try_parse_from(["drivepulse", "show", "--format", "html"]).is_err());
    }
}
