//! Source trait definitions for campaign triage
//!
//! These traits define where the triage engine's inputs come from:
//! - `BeneficiarySource`: beneficiaries recorded by the decision workflow
//! - `ReceptionSource`: participants tracked by the reception channel
//! - `CampaignSource`: campaign metadata
//!
//! All traits are async and backend-agnostic. Retry and route fallback are
//! the backend's business; callers only see a list or an error. In-memory
//! fakes are provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::records::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};

/// Result type for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Which of the three inputs a fetch concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Beneficiary,
    Reception,
    Campaign,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Beneficiary => "beneficiary",
            SourceKind::Reception => "reception",
            SourceKind::Campaign => "campaign",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Beneficiaries of a campaign.
#[async_trait]
pub trait BeneficiarySource: Send + Sync {
    /// Fetch every beneficiary record attached to `campaign_id`.
    async fn fetch_beneficiaries(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<BeneficiaryRecord>>;
}

/// Reception participants of a campaign.
#[async_trait]
pub trait ReceptionSource: Send + Sync {
    /// Fetch every reception participant attached to `campaign_id`.
    async fn fetch_reception(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<ReceptionParticipantRecord>>;
}

/// Campaign metadata lookup.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Fetch metadata for `campaign_id`.
    async fn fetch_campaign(&self, campaign_id: &RecordId) -> SourceResult<CampaignInfo>;
}

#[async_trait]
impl<T: BeneficiarySource + ?Sized> BeneficiarySource for std::sync::Arc<T> {
    async fn fetch_beneficiaries(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<BeneficiaryRecord>> {
        (**self).fetch_beneficiaries(campaign_id).await
    }
}

#[async_trait]
impl<T: ReceptionSource + ?Sized> ReceptionSource for std::sync::Arc<T> {
    async fn fetch_reception(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<ReceptionParticipantRecord>> {
        (**self).fetch_reception(campaign_id).await
    }
}

#[async_trait]
impl<T: CampaignSource + ?Sized> CampaignSource for std::sync::Arc<T> {
    async fn fetch_campaign(&self, campaign_id: &RecordId) -> SourceResult<CampaignInfo> {
        (**self).fetch_campaign(campaign_id).await
    }
}
