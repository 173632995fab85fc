//! Async triage shell.
//!
//! `TriageService` fetches the three inputs of a campaign concurrently,
//! substitutes empty data for any source that fails, and hands everything to
//! the pure [`partition`]. A run always produces a report; failed sources are
//! listed in it and make it `partial`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use triage_sources::{
    BeneficiarySource, CampaignInfo, CampaignSource, ReceptionSource, RecordId, SourceError,
    SourceKind,
};

use crate::campaign_gate::is_auditive;
use crate::domain::{ListKind, TriageOutcome};
use crate::metrics::METRICS;
use crate::obs::{
    emit_record_skipped, emit_source_failed, emit_triage_finished, emit_triage_started, triage_span,
};
use crate::partition::partition;

/// A source that could not be read during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub message: String,
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub campaign_id: RecordId,
    /// Campaign metadata used for the run (fallback when its fetch failed).
    pub campaign: CampaignInfo,
    pub is_auditive: bool,
    pub outcome: TriageOutcome,
    pub failures: Vec<SourceFailure>,
    /// At least one source failed.
    pub partial: bool,
}

impl TriageReport {
    pub fn failed(&self, kind: SourceKind) -> bool {
        self.failures.iter().any(|f| f.source == kind)
    }
}

pub struct TriageService<B, R, C> {
    beneficiaries: B,
    reception: R,
    campaigns: C,
}

impl<B, R, C> TriageService<B, R, C>
where
    B: BeneficiarySource,
    R: ReceptionSource,
    C: CampaignSource,
{
    pub fn new(beneficiaries: B, reception: R, campaigns: C) -> Self {
        Self {
            beneficiaries,
            reception,
            campaigns,
        }
    }

    /// Run the triage for `campaign_id` as of `today`.
    pub async fn run(&self, campaign_id: &RecordId, today: NaiveDate) -> TriageReport {
        let span = triage_span(campaign_id.as_str());
        let (beneficiaries, reception, campaign) = async {
            emit_triage_started(campaign_id.as_str(), &today.to_string());
            tokio::join!(
                self.beneficiaries.fetch_beneficiaries(campaign_id),
                self.reception.fetch_reception(campaign_id),
                self.campaigns.fetch_campaign(campaign_id),
            )
        }
        .instrument(span.clone())
        .await;
        let _entered = span.entered();

        let mut failures = Vec::new();
        let beneficiaries = recover(beneficiaries, SourceKind::Beneficiary, &mut failures)
            .unwrap_or_default();
        let reception =
            recover(reception, SourceKind::Reception, &mut failures).unwrap_or_default();
        let campaign = recover(campaign, SourceKind::Campaign, &mut failures)
            .unwrap_or_else(|| CampaignInfo::fallback(campaign_id.clone()));

        let outcome = partition(&beneficiaries, &reception, &campaign, today);
        for anomaly in &outcome.anomalies {
            emit_record_skipped(anomaly);
        }

        let partial = !failures.is_empty();
        let sizes = ListKind::ALL.map(|kind| outcome.lists.list(kind).len());
        emit_triage_finished(campaign_id.as_str(), sizes, &outcome.counters, partial);

        METRICS.inc_runs();
        METRICS.add_records_skipped(outcome.anomalies.len() as u64);
        METRICS.add_auto_converted(outcome.counters.auto_converted as u64);

        TriageReport {
            campaign_id: campaign_id.clone(),
            is_auditive: is_auditive(&campaign),
            campaign,
            outcome,
            failures,
            partial,
        }
    }
}

fn recover<T>(
    result: Result<T, SourceError>,
    kind: SourceKind,
    failures: &mut Vec<SourceFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            emit_source_failed(kind, &e);
            METRICS.inc_source_failures();
            failures.push(SourceFailure {
                source: kind,
                message: e.to_string(),
            });
            None
        }
    }
}
