//! Local JSON export backend.
//!
//! Serves records from files previously exported from the case-management
//! API. Each file holds one campaign's data, either bare or wrapped in a
//! `{"data": ...}` envelope, so the campaign id passed to fetches is not used
//! for lookup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SourceError;
use crate::http::{decode_body, decode_records};
use crate::records::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};
use crate::source_traits::*;

/// File-backed source. An unset reception file means "no reception data";
/// an unset campaign file makes the campaign lookup fail.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    beneficiaries: Option<PathBuf>,
    reception: Option<PathBuf>,
    campaign: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new(beneficiaries: impl Into<PathBuf>) -> Self {
        Self {
            beneficiaries: Some(beneficiaries.into()),
            ..Self::default()
        }
    }

    pub fn with_reception(mut self, path: impl Into<PathBuf>) -> Self {
        self.reception = Some(path.into());
        self
    }

    pub fn with_campaign(mut self, path: impl Into<PathBuf>) -> Self {
        self.campaign = Some(path.into());
        self
    }

    async fn read(kind: SourceKind, path: &Path) -> SourceResult<String> {
        debug!(source = %kind, path = %path.display(), "reading export");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::Unavailable {
                kind,
                reason: format!("cannot read {}: {}", path.display(), e),
            })
    }

    async fn load_records<T: DeserializeOwned + Default>(
        kind: SourceKind,
        path: &Path,
    ) -> SourceResult<Vec<T>> {
        let body = Self::read(kind, path).await?;
        decode_records(&path.display().to_string(), &body)
    }
}

#[async_trait]
impl BeneficiarySource for JsonFileSource {
    async fn fetch_beneficiaries(&self, _: &RecordId) -> SourceResult<Vec<BeneficiaryRecord>> {
        match &self.beneficiaries {
            Some(path) => Self::load_records(SourceKind::Beneficiary, path).await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl ReceptionSource for JsonFileSource {
    async fn fetch_reception(
        &self,
        _: &RecordId,
    ) -> SourceResult<Vec<ReceptionParticipantRecord>> {
        match &self.reception {
            Some(path) => Self::load_records(SourceKind::Reception, path).await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl CampaignSource for JsonFileSource {
    async fn fetch_campaign(&self, _: &RecordId) -> SourceResult<CampaignInfo> {
        match &self.campaign {
            Some(path) => {
                let body = Self::read(SourceKind::Campaign, path).await?;
                decode_body(&path.display().to_string(), &body)
            }
            None => Err(SourceError::Unavailable {
                kind: SourceKind::Campaign,
                reason: "no campaign file given".to_string(),
            }),
        }
    }
}
