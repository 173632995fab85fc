//! Raw record schema as served by the case-management API.
//!
//! The API is loosely typed: identifiers arrive as integers or strings,
//! booleans as `0`/`1`, and most fields may be missing or `null`. Records are
//! therefore deserialized leniently: text fields accept numbers, flags accept
//! `0`/`1`/`"oui"`, and a value of an unexpected type reads as missing. A
//! JSON object always decodes; a record without a usable identifier keeps
//! `id == None` and is left for the triage engine to skip.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier shared by beneficiary and reception records.
///
/// Integer identifiers are stored in their decimal form so `7` and `"7"`
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Build an identifier, returning `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(RecordId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.trim().to_string())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
    Other(Value),
}

impl RawId {
    fn into_id(self) -> Option<RecordId> {
        match self {
            RawId::Int(n) => Some(RecordId::from(n)),
            RawId::Str(s) => RecordId::parse(&s),
            RawId::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer)?
            .into_id()
            .ok_or_else(|| serde::de::Error::custom("identifier must be a non-empty string or an integer"))
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(RawId::into_id))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Str(String),
    Other(Value),
}

impl RawFlag {
    fn into_flag(self) -> Option<bool> {
        match self {
            RawFlag::Bool(b) => Some(b),
            RawFlag::Int(n) => Some(n != 0),
            RawFlag::Str(s) => match s.trim().to_lowercase().as_str() {
                "1" | "true" | "oui" | "yes" => Some(true),
                "0" | "false" | "non" | "no" => Some(false),
                _ => None,
            },
            RawFlag::Other(_) => None,
        }
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawFlag> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(RawFlag::into_flag))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_flag(deserializer)?.unwrap_or(false))
}

/// Text field that also accepts numbers and booleans; any other JSON type
/// reads as missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A beneficiary as recorded by the decision workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBeneficiary")]
pub struct BeneficiaryRecord {
    pub id: Option<RecordId>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    /// Free-form decision, possibly accented (`"accepté"`, `"refuse"`, ...).
    pub decision: Option<String>,
    pub statut_preselection: Option<String>,
    pub date_naissance: Option<String>,
    pub sexe: Option<String>,
    /// Affected side for hearing-aid campaigns.
    pub cote: Option<String>,
    pub campaign_id: Option<RecordId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Whether the beneficiary already received the assistance.
    pub a_beneficie: bool,
    /// Every other field returned by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of [`BeneficiaryRecord`]. Both campaign keys are accepted;
/// `campaign_id` wins when both are present.
#[derive(Deserialize)]
struct RawBeneficiary {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    prenom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    decision: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    statut_preselection: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    date_naissance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    sexe: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    cote: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    campaign_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_id")]
    campagne_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    a_beneficie: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawBeneficiary> for BeneficiaryRecord {
    fn from(raw: RawBeneficiary) -> Self {
        BeneficiaryRecord {
            id: raw.id,
            nom: raw.nom,
            prenom: raw.prenom,
            decision: raw.decision,
            statut_preselection: raw.statut_preselection,
            date_naissance: raw.date_naissance,
            sexe: raw.sexe,
            cote: raw.cote,
            campaign_id: raw.campaign_id.or(raw.campagne_id),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            a_beneficie: raw.a_beneficie,
            extra: raw.extra,
        }
    }
}

/// A person reached through the reception (intake) channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParticipant")]
pub struct ReceptionParticipantRecord {
    pub id: Option<RecordId>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    /// Contact outcome (`"en_attente"`, `"oui"`, `"ne repond pas"`, ...).
    pub statut: Option<String>,
    /// Provisional decision, only filled by some campaigns.
    pub decision: Option<String>,
    pub date_naissance: Option<String>,
    pub sexe: Option<String>,
    pub cote: Option<String>,
    pub campaign_id: Option<RecordId>,
    pub date_contact: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawParticipant {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    prenom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    statut: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    decision: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    date_naissance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    sexe: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    cote: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    campaign_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_id")]
    campagne_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    date_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    updated_at: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawParticipant> for ReceptionParticipantRecord {
    fn from(raw: RawParticipant) -> Self {
        ReceptionParticipantRecord {
            id: raw.id,
            nom: raw.nom,
            prenom: raw.prenom,
            statut: raw.statut,
            decision: raw.decision,
            date_naissance: raw.date_naissance,
            sexe: raw.sexe,
            cote: raw.cote,
            campaign_id: raw.campaign_id.or(raw.campagne_id),
            date_contact: raw.date_contact,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            extra: raw.extra,
        }
    }
}

/// Campaign metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCampaign")]
pub struct CampaignInfo {
    pub id: RecordId,
    pub nom: Option<String>,
    pub type_assistance: Option<String>,
    /// Explicit flag, when the API provides one.
    pub is_auditive: Option<bool>,
}

#[derive(Deserialize)]
struct RawCampaign {
    id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    type_assistance: Option<String>,
    #[serde(default, rename = "typeAssistance", deserialize_with = "lenient_string")]
    type_assistance_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    is_auditive: Option<bool>,
}

impl From<RawCampaign> for CampaignInfo {
    fn from(raw: RawCampaign) -> Self {
        CampaignInfo {
            id: raw.id,
            nom: raw.nom,
            type_assistance: raw.type_assistance.or(raw.type_assistance_camel),
            is_auditive: raw.is_auditive,
        }
    }
}

impl CampaignInfo {
    /// Metadata substituted when the campaign itself cannot be fetched.
    pub fn fallback(id: RecordId) -> Self {
        CampaignInfo {
            id,
            nom: None,
            type_assistance: None,
            is_auditive: Some(false),
        }
    }
}
