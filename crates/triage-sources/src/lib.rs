//! Triage-Sources: record schema and data sources for campaign triage
//!
//! This crate owns everything that happens before the triage engine runs:
//! the shape of the records served by the case-management API, the async
//! source traits the engine depends on, and the backends implementing them.
//!
//! ## Key Components
//!
//! - `BeneficiaryRecord`, `ReceptionParticipantRecord`, `CampaignInfo`: lenient record schema
//! - `BeneficiarySource`, `ReceptionSource`, `CampaignSource`: injected source traits
//! - `HttpSource`: REST backend with per-source route fallback
//! - `JsonFileSource`: local JSON exports
//! - `fakes`: in-memory backends for tests

pub mod config;
mod error;
pub mod fakes;
pub mod files;
pub mod http;
pub mod records;
pub mod source_traits;

pub use config::{ApiConfig, RouteTable};
pub use error::SourceError;
pub use files::JsonFileSource;
pub use http::HttpSource;
pub use records::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};
pub use source_traits::{
    BeneficiarySource, CampaignSource, ReceptionSource, SourceKind, SourceResult,
};
