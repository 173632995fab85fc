//! Enriched records: the presentation copy of a source record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use triage_sources::RecordId;

use crate::decision::DecisionValue;
use crate::reception_status::ReceptionStatus;

/// Where an enriched record's list placement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSource {
    /// Beneficiary placed by its formal decision.
    #[serde(rename = "decision")]
    Decision,
    /// Reception participant shown as-is.
    #[serde(rename = "reception")]
    Reception,
    /// Reception participant whose waiting status moved it to the waitlist.
    #[serde(rename = "auto-converted")]
    AutoConverted,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Decision => "decision",
            RecordSource::Reception => "reception",
            RecordSource::AutoConverted => "auto-converted",
        }
    }
}

/// A beneficiary or reception record prepared for display.
///
/// # Invariants
///
/// `cote` is `Some` exactly when the owning campaign is auditive, for every
/// record kind; it is omitted from serialized output otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: RecordId,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub sexe: Option<String>,
    #[serde(default)]
    pub date_naissance: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<RecordId>,
    /// Age in whole years at the triage date, when the birth date parses.
    #[serde(default)]
    pub age: Option<u32>,
    /// `age < 18`; false when the age is unknown.
    #[serde(rename = "isMinor", default)]
    pub is_minor: bool,
    #[serde(default)]
    pub decision: DecisionValue,
    #[serde(rename = "decisionLabel", default)]
    pub decision_label: String,
    /// Raw decision before an automatic conversion overwrote it.
    #[serde(rename = "decisionOriginal", default, skip_serializing_if = "Option::is_none")]
    pub decision_original: Option<String>,
    /// Canonical contact outcome, reception-origin records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statut: Option<ReceptionStatus>,
    pub source: RecordSource,
    #[serde(rename = "conversionReason", default, skip_serializing_if = "Option::is_none")]
    pub conversion_reason: Option<String>,
    /// Beneficiary-origin records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a_beneficie: Option<bool>,
    #[serde(default)]
    pub created_at_formatted: Option<String>,
    #[serde(default)]
    pub updated_at_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cote: Option<String>,
    /// Remaining source fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys owned by [`EnrichedRecord`]; source fields with these names are not
/// passed through `extra`.
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "nom",
    "prenom",
    "sexe",
    "date_naissance",
    "campaign_id",
    "age",
    "isMinor",
    "decision",
    "decisionLabel",
    "decisionOriginal",
    "statut",
    "source",
    "conversionReason",
    "a_beneficie",
    "created_at_formatted",
    "updated_at_formatted",
    "cote",
];
