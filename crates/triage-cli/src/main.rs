//! Campaign triage CLI
//!
//! The `triage` command builds the four campaign lists from local JSON
//! exports or from the live case-management API.
//!
//! ## Commands
//!
//! - `partition`: triage local exports
//! - `fetch`: triage a campaign through the API
//! - `normalize`: show how raw decision strings are read
//! - `classify`: show how raw reception statuses are read

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

use triage_core::{
    classify, normalize, parse_today, render_summary_md, write_report_json, TriageReport,
    TriageService, METRICS,
};
use triage_sources::{ApiConfig, HttpSource, JsonFileSource, RecordId};

#[derive(Parser)]
#[command(name = "triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Campaign beneficiary triage", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a campaign from local JSON exports
    Partition {
        /// Campaign identifier
        #[arg(short, long)]
        campaign: String,

        /// Beneficiary export (JSON array or {"data": [...]})
        #[arg(short, long)]
        beneficiaries: PathBuf,

        /// Reception export; a missing or unreadable file makes the run partial
        #[arg(short, long)]
        reception: Option<PathBuf>,

        /// Campaign metadata export; without it the campaign is not auditive
        #[arg(long)]
        campaign_info: Option<PathBuf>,

        /// Triage date used for ages (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<String>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a markdown summary
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Triage a campaign through the case-management API
    Fetch {
        /// Campaign identifier
        #[arg(short, long)]
        campaign: String,

        /// TOML API configuration (default: TRIAGE_API_* environment)
        #[arg(long, env = "TRIAGE_CONFIG")]
        config: Option<PathBuf>,

        /// Triage date used for ages (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<String>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a markdown summary
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Show the canonical decision for raw decision strings
    Normalize {
        /// Raw decision values
        #[arg(required = true)]
        raw: Vec<String>,
    },

    /// Show the canonical reception status for raw status strings
    Classify {
        /// Raw reception statuses
        #[arg(required = true)]
        raw: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    triage_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Partition {
            campaign,
            beneficiaries,
            reception,
            campaign_info,
            today,
            output,
            summary,
        } => {
            let today = resolve_today(today.as_deref())?;
            let report = cmd_partition(
                &campaign,
                &beneficiaries,
                reception.as_deref(),
                campaign_info.as_deref(),
                today,
            )
            .await?;
            write_outputs(&report, output.as_deref(), summary.as_deref())
        }
        Commands::Fetch {
            campaign,
            config,
            today,
            output,
            summary,
        } => {
            let today = resolve_today(today.as_deref())?;
            let report = cmd_fetch(&campaign, config.as_deref(), today).await?;
            write_outputs(&report, output.as_deref(), summary.as_deref())
        }
        Commands::Normalize { raw } => print_json(&cmd_normalize(&raw)),
        Commands::Classify { raw } => print_json(&cmd_classify(&raw)),
    }
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(parse_today(raw)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn campaign_id(raw: &str) -> Result<RecordId> {
    RecordId::parse(raw).context("Campaign identifier must not be empty")
}

/// Triage local exports
async fn cmd_partition(
    campaign: &str,
    beneficiaries: &Path,
    reception: Option<&Path>,
    campaign_info: Option<&Path>,
    today: NaiveDate,
) -> Result<TriageReport> {
    let campaign_id = campaign_id(campaign)?;
    ensure!(
        beneficiaries.is_file(),
        "Beneficiary export not found: {:?}",
        beneficiaries
    );

    let mut source = JsonFileSource::new(beneficiaries);
    if let Some(path) = reception {
        source = source.with_reception(path);
    }
    if let Some(path) = campaign_info {
        source = source.with_campaign(path);
    }

    let source = Arc::new(source);
    let service = TriageService::new(source.clone(), source.clone(), source);
    Ok(service.run(&campaign_id, today).await)
}

/// Triage through the API
async fn cmd_fetch(campaign: &str, config: Option<&Path>, today: NaiveDate) -> Result<TriageReport> {
    let campaign_id = campaign_id(campaign)?;
    let config = match config {
        Some(path) => ApiConfig::from_file(path)
            .with_context(|| format!("Failed to load API configuration from {:?}", path))?,
        None => ApiConfig::from_env().context("Invalid TRIAGE_API_* environment")?,
    };
    let source = Arc::new(HttpSource::new(config).context("Failed to create API client")?);
    info!(base_url = %source.config().base_url, "fetching campaign {}", campaign_id);

    let service = TriageService::new(source.clone(), source.clone(), source);
    Ok(service.run(&campaign_id, today).await)
}

fn write_outputs(report: &TriageReport, output: Option<&Path>, summary: Option<&Path>) -> Result<()> {
    let c = &report.outcome.counters;
    info!(
        "campaign {}: {} listed, {} unclassified, {} excluded, {} skipped of {} records",
        report.campaign_id,
        report.outcome.lists.len(),
        c.unclassified,
        c.excluded_count,
        c.skipped + c.collapsed + c.out_of_scope,
        c.total
    );
    for failure in &report.failures {
        warn!("partial result: {} source failed: {}", failure.source, failure.message);
    }
    METRICS.flush();

    match output {
        Some(path) => {
            write_report_json(path, report)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            println!("Report written to {:?}", path);
        }
        None => print_json(report)?,
    }

    if let Some(path) = summary {
        std::fs::write(path, render_summary_md(report))
            .with_context(|| format!("Failed to write summary to {:?}", path))?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct DecisionLine {
    raw: String,
    decision: triage_core::DecisionValue,
    display: &'static str,
    persisted: &'static str,
}

fn cmd_normalize(raw: &[String]) -> Vec<DecisionLine> {
    raw.iter()
        .map(|r| {
            let value = normalize(Some(r.as_str()));
            DecisionLine {
                raw: r.clone(),
                decision: value,
                display: value.to_display_form(),
                persisted: value.to_persisted_form(),
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct StatusLine {
    raw: String,
    status: triage_core::ReceptionStatus,
    label: &'static str,
}

fn cmd_classify(raw: &[String]) -> Vec<StatusLine> {
    raw.iter()
        .map(|r| {
            let status = classify(Some(r.as_str()));
            StatusLine {
                raw: r.clone(),
                status,
                label: status.label(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{DecisionValue, ListKind, ReceptionStatus};
    use triage_sources::SourceKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn parses_partition_arguments() {
        let cli = Cli::try_parse_from([
            "triage",
            "--verbose",
            "partition",
            "--campaign",
            "12",
            "--beneficiaries",
            "b.json",
            "--reception",
            "r.json",
            "--today",
            "2024-06-15",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Partition {
                campaign,
                reception,
                campaign_info,
                ..
            } => {
                assert_eq!(campaign, "12");
                assert_eq!(reception, Some(PathBuf::from("r.json")));
                assert!(campaign_info.is_none());
            }
            _ => panic!("expected partition"),
        }
    }

    #[test]
    fn normalize_requires_a_value() {
        assert!(Cli::try_parse_from(["triage", "normalize"]).is_err());
    }

    #[test]
    fn blank_campaign_is_rejected() {
        assert!(campaign_id("  ").is_err());
        assert_eq!(campaign_id(" 7 ").unwrap(), RecordId::from(7));
    }

    #[test]
    fn normalize_reports_all_forms() {
        let lines = cmd_normalize(&["Accepté".to_string(), "bof".to_string()]);
        assert_eq!(lines[0].decision, DecisionValue::Accepted);
        assert_eq!(lines[0].display, "Accepté");
        assert_eq!(lines[0].persisted, "accepte");
        assert_eq!(lines[1].decision, DecisionValue::Undefined);
    }

    #[test]
    fn classify_reports_status() {
        let lines = cmd_classify(&["Ne répond pas".to_string()]);
        assert_eq!(lines[0].status, ReceptionStatus::NoResponse);
    }

    #[tokio::test]
    async fn partition_over_local_exports() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(
            dir.path(),
            "beneficiaires.json",
            r#"[{"id": 1, "decision": "accepté", "cote": "gauche"},
                {"id": 2, "decision": "refuse"}]"#,
        );
        let r = write(
            dir.path(),
            "reception.json",
            r#"{"data": [{"id": 2, "statut": "oui"}, {"id": 3, "statut": "en_attente"}]}"#,
        );
        let c = write(
            dir.path(),
            "campagne.json",
            r#"{"data": {"id": 5, "nom": "Audition", "type_assistance": "auditive"}}"#,
        );

        let report = cmd_partition("5", &b, Some(r.as_path()), Some(c.as_path()), today())
            .await
            .unwrap();
        assert!(!report.partial);
        assert!(report.is_auditive);
        let lists = &report.outcome.lists;
        assert_eq!(lists.list(ListKind::Principal).len(), 1);
        assert_eq!(lists.list(ListKind::Participants).len(), 1);
        assert_eq!(lists.list(ListKind::Waitlist).len(), 1);
        assert!(lists.list(ListKind::Rejected).is_empty());

        let out = dir.path().join("report.json");
        let md = dir.path().join("summary.md");
        write_outputs(&report, Some(out.as_path()), Some(md.as_path())).unwrap();
        assert!(std::fs::read_to_string(&out).unwrap().contains("\"Principal\""));
        assert!(std::fs::read_to_string(&md).unwrap().contains("# Campagne 5"));
    }

    #[tokio::test]
    async fn missing_reception_file_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(dir.path(), "b.json", r#"[{"id": 1, "decision": "en_attente"}]"#);
        let missing = dir.path().join("absent.json");

        let report = cmd_partition("5", &b, Some(missing.as_path()), None, today())
            .await
            .unwrap();
        assert!(report.partial);
        assert!(report.failed(SourceKind::Reception));
        assert!(report.failed(SourceKind::Campaign));
        assert_eq!(report.outcome.lists.waitlist.len(), 1);
    }

    #[tokio::test]
    async fn missing_beneficiary_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = cmd_partition("5", &dir.path().join("none.json"), None, None, today()).await;
        assert!(result.is_err());
    }
}
