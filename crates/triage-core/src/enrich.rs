//! Record enrichment: age, minor flag, formatted dates, and the side field.
//!
//! Everything here depends on an injected triage date; nothing reads the
//! system clock.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use triage_sources::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};

use crate::campaign_gate;
use crate::decision::{normalize, DecisionValue};
use crate::domain::{EnrichedRecord, RecordSource, RESERVED_KEYS};
use crate::reception_status::classify;

/// Age of majority.
pub const MAJORITY_AGE: u32 = 18;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const DISPLAY_DATETIME: &str = "%d/%m/%Y %H:%M";
const DISPLAY_DATE: &str = "%d/%m/%Y";

/// Per-campaign inputs shared by every enrichment in one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichContext {
    pub today: NaiveDate,
    pub auditive: bool,
}

impl EnrichContext {
    pub fn new(campaign: &CampaignInfo, today: NaiveDate) -> Self {
        EnrichContext {
            today,
            auditive: campaign_gate::is_auditive(campaign),
        }
    }

    /// The side value to expose, `Some` iff the campaign is auditive.
    fn side(&self, cote: Option<&str>) -> Option<String> {
        self.auditive
            .then(|| cote.map(|c| c.trim().to_string()).unwrap_or_default())
    }
}

enum Parsed {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

fn parse_lenient(raw: &str) -> Option<Parsed> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Parsed::DateTime(dt.naive_local()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Parsed::DateTime(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Parsed::Date(d));
        }
    }
    // "2024-03-01 whatever": trust a leading ISO date.
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .map(Parsed::Date)
}

/// Parse a birth date or timestamp down to its calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    match parse_lenient(raw)? {
        Parsed::Date(d) => Some(d),
        Parsed::DateTime(dt) => Some(dt.date()),
    }
}

/// `DD/MM/YYYY HH:MM`, or `DD/MM/YYYY` for date-only input.
pub fn format_timestamp(raw: &str) -> Option<String> {
    match parse_lenient(raw)? {
        Parsed::Date(d) => Some(d.format(DISPLAY_DATE).to_string()),
        Parsed::DateTime(dt) => Some(dt.format(DISPLAY_DATETIME).to_string()),
    }
}

/// Whole years between `birth` and `today`; `None` for a future birth date.
pub fn age_at(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

fn age_from(raw: Option<&str>, today: NaiveDate) -> Option<u32> {
    raw.and_then(parse_date).and_then(|birth| age_at(birth, today))
}

fn passthrough(extra: &Map<String, Value>) -> Map<String, Value> {
    extra
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn keep_raw(map: &mut Map<String, Value>, key: &str, value: Option<&String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

/// Presentation copy of a beneficiary, placed by its own decision.
pub fn enrich_beneficiary(
    id: RecordId,
    record: &BeneficiaryRecord,
    ctx: &EnrichContext,
) -> EnrichedRecord {
    let decision = normalize(record.decision.as_deref());
    let age = age_from(record.date_naissance.as_deref(), ctx.today);

    let mut extra = passthrough(&record.extra);
    keep_raw(&mut extra, "statut_preselection", record.statut_preselection.as_ref());
    keep_raw(&mut extra, "created_at", record.created_at.as_ref());
    keep_raw(&mut extra, "updated_at", record.updated_at.as_ref());

    EnrichedRecord {
        id,
        nom: record.nom.clone(),
        prenom: record.prenom.clone(),
        sexe: record.sexe.clone(),
        date_naissance: record.date_naissance.clone(),
        campaign_id: record.campaign_id.clone(),
        age,
        is_minor: age.is_some_and(|a| a < MAJORITY_AGE),
        decision,
        decision_label: decision.to_display_form().to_string(),
        decision_original: None,
        statut: None,
        source: RecordSource::Decision,
        conversion_reason: None,
        a_beneficie: Some(record.a_beneficie),
        created_at_formatted: record.created_at.as_deref().and_then(format_timestamp),
        updated_at_formatted: record.updated_at.as_deref().and_then(format_timestamp),
        cote: ctx.side(record.cote.as_deref()),
        extra,
    }
}

/// Presentation copy of a reception participant, as shown in `Participants`.
pub fn enrich_participant(
    id: RecordId,
    record: &ReceptionParticipantRecord,
    ctx: &EnrichContext,
) -> EnrichedRecord {
    let decision = normalize(record.decision.as_deref());
    let age = age_from(record.date_naissance.as_deref(), ctx.today);

    let mut extra = passthrough(&record.extra);
    keep_raw(&mut extra, "date_contact", record.date_contact.as_ref());
    keep_raw(&mut extra, "created_at", record.created_at.as_ref());
    keep_raw(&mut extra, "updated_at", record.updated_at.as_ref());

    EnrichedRecord {
        id,
        nom: record.nom.clone(),
        prenom: record.prenom.clone(),
        sexe: record.sexe.clone(),
        date_naissance: record.date_naissance.clone(),
        campaign_id: record.campaign_id.clone(),
        age,
        is_minor: age.is_some_and(|a| a < MAJORITY_AGE),
        decision,
        decision_label: decision.to_display_form().to_string(),
        decision_original: None,
        statut: Some(classify(record.statut.as_deref())),
        source: RecordSource::Reception,
        conversion_reason: None,
        a_beneficie: None,
        created_at_formatted: record
            .created_at
            .as_deref()
            .or(record.date_contact.as_deref())
            .and_then(format_timestamp),
        updated_at_formatted: record.updated_at.as_deref().and_then(format_timestamp),
        cote: ctx.side(record.cote.as_deref()),
        extra,
    }
}

/// Overwrite the decision of an enriched record, keeping the raw original.
pub(crate) fn force_decision(record: &mut EnrichedRecord, decision: DecisionValue, raw: Option<&str>) {
    record.decision_original = raw.map(str::to_string);
    record.decision = decision;
    record.decision_label = decision.to_display_form().to_string();
}
