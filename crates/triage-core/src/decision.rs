//! Decision normalization.
//!
//! Beneficiary decisions are typed by hand in the case-management UI and
//! arrive with or without accents (`"accepté"`, `"accepte"`, `"Refusé"`).
//! [`normalize`] folds every spelling onto a [`DecisionValue`]; it is total,
//! anything it does not recognise becomes [`DecisionValue::Undefined`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fold::fold_key;

/// Canonical decision attached to a beneficiary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecisionValue {
    Accepted,
    Waiting,
    Rejected,
    PreselectionYes,
    PreselectionNo,
    #[default]
    Undefined,
}

impl DecisionValue {
    pub const ALL: [DecisionValue; 6] = [
        DecisionValue::Accepted,
        DecisionValue::Waiting,
        DecisionValue::Rejected,
        DecisionValue::PreselectionYes,
        DecisionValue::PreselectionNo,
        DecisionValue::Undefined,
    ];

    /// Accented label shown to case workers.
    pub fn to_display_form(self) -> &'static str {
        match self {
            DecisionValue::Accepted => "Accepté",
            DecisionValue::Waiting => "En attente",
            DecisionValue::Rejected => "Refusé",
            DecisionValue::PreselectionYes => "Présélection oui",
            DecisionValue::PreselectionNo => "Présélection non",
            DecisionValue::Undefined => "Non défini",
        }
    }

    /// Unaccented code written back to the API.
    pub fn to_persisted_form(self) -> &'static str {
        match self {
            DecisionValue::Accepted => "accepte",
            DecisionValue::Waiting => "en_attente",
            DecisionValue::Rejected => "refuse",
            DecisionValue::PreselectionYes => "preselection_oui",
            DecisionValue::PreselectionNo => "preselection_non",
            DecisionValue::Undefined => "",
        }
    }
}

impl std::fmt::Display for DecisionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_display_form())
    }
}

/// Fold a raw decision string onto its canonical value.
pub fn normalize(raw: Option<&str>) -> DecisionValue {
    let Some(raw) = raw else {
        return DecisionValue::Undefined;
    };

    match fold_key(raw, '_').as_str() {
        "accepte" => DecisionValue::Accepted,
        "en_attente" | "attente" => DecisionValue::Waiting,
        "refuse" => DecisionValue::Rejected,
        "preselection_oui" => DecisionValue::PreselectionYes,
        "preselection_non" => DecisionValue::PreselectionNo,
        _ => DecisionValue::Undefined,
    }
}

/// `normalize` applied to the persisted form of `normalize(raw)`.
pub fn round_trip(raw: Option<&str>) -> DecisionValue {
    normalize(Some(normalize(raw).to_persisted_form()))
}

impl Serialize for DecisionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_persisted_form())
    }
}

impl<'de> Deserialize<'de> for DecisionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(normalize(raw.as_deref()))
    }
}
