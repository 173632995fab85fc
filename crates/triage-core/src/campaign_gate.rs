//! Campaign type gate.
//!
//! Hearing-aid campaigns record which ear is concerned (`cote`). Whether a
//! campaign is one of them is read from its `type_assistance`; the explicit
//! `is_auditive` flag is only consulted when the type is missing. The gate
//! controls field exposure on enriched records and nothing else.

use triage_sources::CampaignInfo;

use crate::fold::fold_key;

const AUDITIVE_MARKER: &str = "auditi";

/// Whether `campaign` is audio-assistance typed.
pub fn is_auditive(campaign: &CampaignInfo) -> bool {
    match campaign.type_assistance.as_deref() {
        Some(kind) if !kind.trim().is_empty() => fold_key(kind, ' ').contains(AUDITIVE_MARKER),
        _ => campaign.is_auditive.unwrap_or(false),
    }
}
