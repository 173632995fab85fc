use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{ListKind, Result, TriageError};
use crate::enrich::parse_date;
use crate::service::TriageReport;

/// Write the report as pretty JSON.
pub fn write_report_json(path: &Path, report: &TriageReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn list_title(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Participants => "Participants",
        ListKind::Principal => "Liste principale",
        ListKind::Waitlist => "Liste d'attente",
        ListKind::Rejected => "Refusés",
    }
}

/// Render a markdown summary of a run.
pub fn render_summary_md(report: &TriageReport) -> String {
    let outcome = &report.outcome;
    let c = &outcome.counters;
    let mut out = String::new();

    let name = report.campaign.nom.as_deref().unwrap_or("sans nom");
    out.push_str(&format!(
        "# Campagne {} ({})\n\n",
        report.campaign_id, name
    ));
    if report.partial {
        out.push_str("**Résultat partiel**\n\n");
        for f in &report.failures {
            out.push_str(&format!("- source `{}`: {}\n", f.source, f.message));
        }
        out.push('\n');
    }

    out.push_str("## Listes\n");
    for kind in ListKind::ALL {
        out.push_str(&format!(
            "- {}: {}\n",
            list_title(kind),
            outcome.lists.list(kind).len()
        ));
    }
    out.push('\n');

    out.push_str("## Comptage\n");
    out.push_str(&format!(
        "- total: {}\n- exclus (doublon réception): {}\n- sans identifiant: {}\n- répétés: {}\n- hors campagne: {}\n- non classés: {}\n- convertis automatiquement: {}\n",
        c.total,
        c.excluded_count,
        c.skipped,
        c.collapsed,
        c.out_of_scope,
        c.unclassified,
        c.auto_converted
    ));
    out
}

/// Parse a `--today` argument. Accepts the same shapes as record dates.
pub fn parse_today(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| TriageError::InvalidInput(format!("invalid date: {:?}", raw)))
}
