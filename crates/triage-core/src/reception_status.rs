//! Reception contact-outcome classification.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fold::fold_key;

/// Canonical outcome of contacting a reception participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReceptionStatus {
    Waiting,
    ConfirmedYes,
    ConfirmedNo,
    Responded,
    NoResponse,
    NotContacted,
    Undefined,
}

impl ReceptionStatus {
    pub const ALL: [ReceptionStatus; 7] = [
        ReceptionStatus::Waiting,
        ReceptionStatus::ConfirmedYes,
        ReceptionStatus::ConfirmedNo,
        ReceptionStatus::Responded,
        ReceptionStatus::NoResponse,
        ReceptionStatus::NotContacted,
        ReceptionStatus::Undefined,
    ];

    /// Stable code used in serialized output.
    pub fn as_code(self) -> &'static str {
        match self {
            ReceptionStatus::Waiting => "en_attente",
            ReceptionStatus::ConfirmedYes => "oui",
            ReceptionStatus::ConfirmedNo => "non",
            ReceptionStatus::Responded => "repondu",
            ReceptionStatus::NoResponse => "ne_repond_pas",
            ReceptionStatus::NotContacted => "non_contacte",
            ReceptionStatus::Undefined => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReceptionStatus::Waiting => "En attente",
            ReceptionStatus::ConfirmedYes => "Oui",
            ReceptionStatus::ConfirmedNo => "Non",
            ReceptionStatus::Responded => "Répondu",
            ReceptionStatus::NoResponse => "Ne répond pas",
            ReceptionStatus::NotContacted => "Non contacté",
            ReceptionStatus::Undefined => "Non défini",
        }
    }
}

impl std::fmt::Display for ReceptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a raw `statut`. Total: unknown, empty or missing input is `Undefined`.
pub fn classify(raw: Option<&str>) -> ReceptionStatus {
    let Some(raw) = raw else {
        return ReceptionStatus::Undefined;
    };

    match fold_key(raw, ' ').as_str() {
        "en attente" | "attente" => ReceptionStatus::Waiting,
        "oui" | "confirme" => ReceptionStatus::ConfirmedYes,
        "non" | "refuse" => ReceptionStatus::ConfirmedNo,
        "repondu" => ReceptionStatus::Responded,
        "ne repond pas" | "pas de reponse" | "injoignable" => ReceptionStatus::NoResponse,
        "non contacte" => ReceptionStatus::NotContacted,
        _ => ReceptionStatus::Undefined,
    }
}

impl Serialize for ReceptionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> Deserialize<'de> for ReceptionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(classify(raw.as_deref()))
    }
}
