//! In-memory fakes for source traits (testing only)
//!
//! Provides `MemorySource`, which serves preloaded records for any campaign,
//! and `FailingSource`, which fails every fetch. Both implement all three
//! source traits.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::records::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};
use crate::source_traits::*;

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CampaignData {
    info: Option<CampaignInfo>,
    beneficiaries: Vec<BeneficiaryRecord>,
    reception: Vec<ReceptionParticipantRecord>,
}

/// In-memory source backed by a `HashMap<campaign id, data>`.
///
/// Unknown campaigns yield empty record lists; the campaign lookup fails with
/// `SourceError::Unavailable` when no metadata was inserted.
#[derive(Debug, Default)]
pub struct MemorySource {
    campaigns: Mutex<HashMap<RecordId, CampaignData>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_campaign(&self, info: CampaignInfo) {
        let id = info.id.clone();
        let mut campaigns = self.campaigns.lock().unwrap();
        campaigns.entry(id).or_default().info = Some(info);
    }

    pub fn insert_beneficiaries(&self, campaign_id: &RecordId, records: Vec<BeneficiaryRecord>) {
        let mut campaigns = self.campaigns.lock().unwrap();
        campaigns
            .entry(campaign_id.clone())
            .or_default()
            .beneficiaries
            .extend(records);
    }

    pub fn insert_reception(
        &self,
        campaign_id: &RecordId,
        records: Vec<ReceptionParticipantRecord>,
    ) {
        let mut campaigns = self.campaigns.lock().unwrap();
        campaigns
            .entry(campaign_id.clone())
            .or_default()
            .reception
            .extend(records);
    }
}

#[async_trait]
impl BeneficiarySource for MemorySource {
    async fn fetch_beneficiaries(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<BeneficiaryRecord>> {
        let campaigns = self.campaigns.lock().unwrap();
        Ok(campaigns
            .get(campaign_id)
            .map(|c| c.beneficiaries.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ReceptionSource for MemorySource {
    async fn fetch_reception(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<ReceptionParticipantRecord>> {
        let campaigns = self.campaigns.lock().unwrap();
        Ok(campaigns
            .get(campaign_id)
            .map(|c| c.reception.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CampaignSource for MemorySource {
    async fn fetch_campaign(&self, campaign_id: &RecordId) -> SourceResult<CampaignInfo> {
        let campaigns = self.campaigns.lock().unwrap();
        campaigns
            .get(campaign_id)
            .and_then(|c| c.info.clone())
            .ok_or_else(|| SourceError::Unavailable {
                kind: SourceKind::Campaign,
                reason: format!("campaign {} not found", campaign_id),
            })
    }
}

// ---------------------------------------------------------------------------
// FailingSource
// ---------------------------------------------------------------------------

/// Source whose every fetch fails with `SourceError::Unavailable`.
#[derive(Debug, Clone)]
pub struct FailingSource {
    reason: String,
}

impl FailingSource {
    pub fn new(reason: &str) -> Self {
        FailingSource {
            reason: reason.to_string(),
        }
    }

    fn fail<T>(&self, kind: SourceKind) -> SourceResult<T> {
        Err(SourceError::Unavailable {
            kind,
            reason: self.reason.clone(),
        })
    }
}

#[async_trait]
impl BeneficiarySource for FailingSource {
    async fn fetch_beneficiaries(&self, _: &RecordId) -> SourceResult<Vec<BeneficiaryRecord>> {
        self.fail(SourceKind::Beneficiary)
    }
}

#[async_trait]
impl ReceptionSource for FailingSource {
    async fn fetch_reception(&self, _: &RecordId) -> SourceResult<Vec<ReceptionParticipantRecord>> {
        self.fail(SourceKind::Reception)
    }
}

#[async_trait]
impl CampaignSource for FailingSource {
    async fn fetch_campaign(&self, _: &RecordId) -> SourceResult<CampaignInfo> {
        self.fail(SourceKind::Campaign)
    }
}
