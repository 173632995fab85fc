//! List partitioner.
//!
//! Builds the four campaign lists from already-fetched inputs. The function
//! is pure: the same inputs and triage date always give the same outcome.
//!
//! Steps:
//! 1. Screen both sources: records without an id, attached to another
//!    campaign, or repeating an id already seen in the same source are set
//!    aside as anomalies.
//! 2. Every remaining reception id is excluded from beneficiary-derived lists.
//! 3. Reception records split on status: waiting ones are auto-converted
//!    into the waitlist, the others form `Participants`.
//! 4. Remaining beneficiaries go to `Principal`, `Waitlist` or `Rejected` by
//!    decision; pre-selection and undefined decisions stay unclassified.

use std::collections::HashSet;

use chrono::NaiveDate;
use triage_sources::{
    BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId, SourceKind,
};

use crate::decision::{normalize, DecisionValue};
use crate::dedup::excluded_ids;
use crate::domain::{AnomalyKind, RecordAnomaly, TriageCounters, TriageLists, TriageOutcome};
use crate::enrich::{enrich_beneficiary, enrich_participant, EnrichContext};
use crate::reclassify::{extract_waiting, is_waiting};

/// Identity and scope of a source record.
trait Scoped {
    fn record_id(&self) -> Option<&RecordId>;
    fn record_campaign(&self) -> Option<&RecordId>;
}

impl Scoped for BeneficiaryRecord {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn record_campaign(&self) -> Option<&RecordId> {
        self.campaign_id.as_ref()
    }
}

impl Scoped for ReceptionParticipantRecord {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn record_campaign(&self) -> Option<&RecordId> {
        self.campaign_id.as_ref()
    }
}

/// Keep records with an id, in this campaign, first occurrence only.
fn screen<'a, T: Scoped>(
    records: &'a [T],
    origin: SourceKind,
    campaign_id: &RecordId,
    anomalies: &mut Vec<RecordAnomaly>,
) -> Vec<(RecordId, &'a T)> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let mut flag = |id: Option<&RecordId>, kind| {
            anomalies.push(RecordAnomaly {
                origin,
                position,
                id: id.cloned(),
                kind,
            })
        };

        let Some(id) = record.record_id() else {
            flag(None, AnomalyKind::MissingId);
            continue;
        };
        if record.record_campaign().is_some_and(|c| c != campaign_id) {
            flag(Some(id), AnomalyKind::OutOfScope);
            continue;
        }
        if !seen.insert(id.clone()) {
            flag(Some(id), AnomalyKind::Repeated);
            continue;
        }
        kept.push((id.clone(), record));
    }
    kept
}

/// Partition both sources into the four lists for `campaign`.
pub fn partition(
    beneficiaries: &[BeneficiaryRecord],
    reception: &[ReceptionParticipantRecord],
    campaign: &CampaignInfo,
    today: NaiveDate,
) -> TriageOutcome {
    let ctx = EnrichContext::new(campaign, today);
    let total = beneficiaries.len() + reception.len();
    let mut anomalies = Vec::new();
    let reception = screen(reception, SourceKind::Reception, &campaign.id, &mut anomalies);
    let beneficiaries = screen(
        beneficiaries,
        SourceKind::Beneficiary,
        &campaign.id,
        &mut anomalies,
    );

    let excluded = excluded_ids(reception.iter().map(|(_, r)| *r));
    let (waiting, others): (Vec<_>, Vec<_>) =
        reception.into_iter().partition(|(_, r)| is_waiting(r));

    let mut lists = TriageLists {
        participants: others
            .into_iter()
            .map(|(id, r)| enrich_participant(id, r, &ctx))
            .collect(),
        ..TriageLists::default()
    };
    let converted = extract_waiting(waiting.iter().map(|(_, r)| *r), &ctx);

    let mut unclassified = Vec::new();
    let mut excluded_count = 0;
    for (id, record) in beneficiaries {
        if excluded.contains(&id) {
            excluded_count += 1;
            continue;
        }
        match normalize(record.decision.as_deref()) {
            DecisionValue::Accepted => lists.principal.push(enrich_beneficiary(id, record, &ctx)),
            DecisionValue::Waiting => lists.waitlist.push(enrich_beneficiary(id, record, &ctx)),
            DecisionValue::Rejected => lists.rejected.push(enrich_beneficiary(id, record, &ctx)),
            DecisionValue::PreselectionYes
            | DecisionValue::PreselectionNo
            | DecisionValue::Undefined => unclassified.push(id),
        }
    }

    let counters = TriageCounters {
        total,
        excluded_count,
        skipped: count(&anomalies, AnomalyKind::MissingId),
        collapsed: count(&anomalies, AnomalyKind::Repeated),
        out_of_scope: count(&anomalies, AnomalyKind::OutOfScope),
        unclassified: unclassified.len(),
        auto_converted: converted.len(),
    };
    lists.waitlist.extend(converted);

    TriageOutcome {
        lists,
        unclassified,
        anomalies,
        counters,
    }
}

fn count(anomalies: &[RecordAnomaly], kind: AnomalyKind) -> usize {
    anomalies.iter().filter(|a| a.kind == kind).count()
}
