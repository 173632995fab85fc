//! Partition output: the four lists plus accounting.

use serde::{Deserialize, Serialize};
use triage_sources::{RecordId, SourceKind};

use super::record::EnrichedRecord;

/// The four campaign-scoped lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Participants,
    Principal,
    Waitlist,
    Rejected,
}

impl ListKind {
    pub const ALL: [ListKind; 4] = [
        ListKind::Participants,
        ListKind::Principal,
        ListKind::Waitlist,
        ListKind::Rejected,
    ];
}

/// Mutually exclusive lists produced by one partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageLists {
    /// Reception participants not waiting.
    #[serde(rename = "Participants")]
    pub participants: Vec<EnrichedRecord>,
    /// Accepted beneficiaries.
    #[serde(rename = "Principal")]
    pub principal: Vec<EnrichedRecord>,
    /// Waiting beneficiaries, then auto-converted reception participants.
    #[serde(rename = "Waitlist")]
    pub waitlist: Vec<EnrichedRecord>,
    /// Rejected beneficiaries.
    #[serde(rename = "Rejected")]
    pub rejected: Vec<EnrichedRecord>,
}

impl TriageLists {
    pub fn list(&self, kind: ListKind) -> &[EnrichedRecord] {
        match kind {
            ListKind::Participants => &self.participants,
            ListKind::Principal => &self.principal,
            ListKind::Waitlist => &self.waitlist,
            ListKind::Rejected => &self.rejected,
        }
    }

    /// Total number of records across the four lists.
    pub fn len(&self) -> usize {
        ListKind::ALL.iter().map(|k| self.list(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record tagged with the list holding it.
    pub fn iter(&self) -> impl Iterator<Item = (ListKind, &EnrichedRecord)> {
        ListKind::ALL
            .into_iter()
            .flat_map(move |kind| self.list(kind).iter().map(move |r| (kind, r)))
    }

    /// The list holding `id`, if any.
    pub fn find(&self, id: &RecordId) -> Option<(ListKind, &EnrichedRecord)> {
        self.iter().find(|(_, r)| &r.id == id)
    }
}

/// Why an input record was kept out of every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// No usable identifier.
    MissingId,
    /// Attached to another campaign.
    OutOfScope,
    /// Identifier already seen earlier in the same source.
    Repeated,
}

/// An input record dropped before partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAnomaly {
    pub origin: SourceKind,
    /// Index in the source list.
    pub position: usize,
    pub id: Option<RecordId>,
    pub kind: AnomalyKind,
}

/// Observability counters for one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageCounters {
    /// Input records across both sources.
    pub total: usize,
    /// Beneficiaries dropped because reception represents the same id.
    pub excluded_count: usize,
    /// Records without an identifier.
    pub skipped: usize,
    /// Later occurrences of an id already seen in the same source.
    pub collapsed: usize,
    /// Records attached to another campaign.
    pub out_of_scope: usize,
    /// Beneficiaries whose decision is not accepted/waiting/rejected.
    pub unclassified: usize,
    /// Reception participants moved to the waitlist.
    pub auto_converted: usize,
}

/// Result of [`partition`](crate::partition::partition).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub lists: TriageLists,
    /// Beneficiaries left out of every list (pre-selection or no decision).
    pub unclassified: Vec<RecordId>,
    pub anomalies: Vec<RecordAnomaly>,
    pub counters: TriageCounters,
}

impl TriageOutcome {
    /// Every input record is accounted for exactly once.
    pub fn is_balanced(&self) -> bool {
        let c = &self.counters;
        self.lists.len()
            + self.unclassified.len()
            + c.excluded_count
            + c.skipped
            + c.collapsed
            + c.out_of_scope
            == c.total
    }
}
