//! Automatic reclassification of waiting reception participants.
//!
//! A participant who was contacted and told to wait joins the same waitlist
//! as beneficiaries whose formal decision is "waiting", even though the two
//! come from different tables. The reception status always wins: whatever
//! `decision` the reception record carries is kept only as
//! `decisionOriginal`.

use triage_sources::{ReceptionParticipantRecord, RecordId};

use crate::decision::DecisionValue;
use crate::domain::{EnrichedRecord, RecordSource};
use crate::enrich::{enrich_participant, force_decision, EnrichContext};
use crate::reception_status::{classify, ReceptionStatus};

/// Human-readable reason attached to converted records.
pub fn conversion_reason(raw_statut: &str) -> String {
    format!(
        "Statut réception « {} » : converti automatiquement en liste d'attente",
        raw_statut.trim()
    )
}

/// Whether a reception record is to be moved to the waitlist.
pub fn is_waiting(record: &ReceptionParticipantRecord) -> bool {
    classify(record.statut.as_deref()) == ReceptionStatus::Waiting
}

/// Convert every waiting reception record (with an id) into a waitlist entry.
pub fn extract_waiting<'a, I>(reception: I, ctx: &EnrichContext) -> Vec<EnrichedRecord>
where
    I: IntoIterator<Item = &'a ReceptionParticipantRecord>,
{
    reception
        .into_iter()
        .filter(|r| is_waiting(r))
        .filter_map(|r| r.id.clone().map(|id| convert(id, r, ctx)))
        .collect()
}

fn convert(id: RecordId, record: &ReceptionParticipantRecord, ctx: &EnrichContext) -> EnrichedRecord {
    let mut enriched = enrich_participant(id, record, ctx);
    force_decision(&mut enriched, DecisionValue::Waiting, record.decision.as_deref());
    enriched.source = RecordSource::AutoConverted;
    enriched.conversion_reason = record.statut.as_deref().map(conversion_reason);
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ctx() -> EnrichContext {
        EnrichContext {
            today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            auditive: false,
        }
    }

    fn participant(value: serde_json::Value) -> ReceptionParticipantRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn waiting_status_overrides_decision() {
        let records = vec![participant(json!({
            "id": 2, "statut": "en_attente", "decision": "accepte"
        }))];

        let converted = extract_waiting(&records, &ctx());
        assert_eq!(converted.len(), 1);
        let e = &converted[0];
        assert_eq!(e.decision, DecisionValue::Waiting);
        assert_eq!(e.decision_label, "En attente");
        assert_eq!(e.decision_original.as_deref(), Some("accepte"));
        assert_eq!(e.source, RecordSource::AutoConverted);
        assert_eq!(e.statut, Some(ReceptionStatus::Waiting));
        assert!(e.conversion_reason.as_deref().unwrap().contains("en_attente"));
    }

    #[test]
    fn missing_decision_leaves_no_original() {
        let records = vec![participant(json!({"id": 3, "statut": "En attente"}))];
        let converted = extract_waiting(&records, &ctx());
        assert_eq!(converted.len(), 1);
        assert!(converted[0].decision_original.is_none());
    }

    #[test]
    fn other_statuses_are_left_alone() {
        let records = vec![
            participant(json!({"id": 1, "statut": "oui"})),
            participant(json!({"id": 2, "statut": "ne repond pas", "decision": "en_attente"})),
            participant(json!({"id": 3})),
        ];
        assert!(extract_waiting(&records, &ctx()).is_empty());
    }

    #[test]
    fn waiting_record_without_id_is_dropped() {
        let records = vec![participant(json!({"statut": "en_attente"}))];
        assert!(extract_waiting(&records, &ctx()).is_empty());
    }
}
