//! Campaign triage engine
//!
//! Turns the raw beneficiary and reception records of one campaign into four
//! mutually exclusive lists (`Participants`, `Principal`, `Waitlist`,
//! `Rejected`). The engine components are pure functions; `TriageService`
//! wraps them with concurrent fetching and source-failure recovery.

pub mod campaign_gate;
pub mod decision;
pub mod dedup;
pub mod domain;
pub mod enrich;
pub mod fold;
pub mod metrics;
pub mod obs;
pub mod partition;
pub mod reception_status;
pub mod reclassify;
pub mod reporting;
pub mod service;
pub mod telemetry;

pub use campaign_gate::is_auditive;
pub use decision::{normalize, DecisionValue};
pub use dedup::excluded_ids;
pub use domain::{
    AnomalyKind, EnrichedRecord, ListKind, RecordAnomaly, RecordSource, Result, TriageCounters,
    TriageError, TriageLists, TriageOutcome,
};
pub use enrich::EnrichContext;
pub use metrics::METRICS;
pub use partition::partition;
pub use reception_status::{classify, ReceptionStatus};
pub use reclassify::extract_waiting;
pub use reporting::{parse_today, render_summary_md, write_report_json};
pub use service::{SourceFailure, TriageReport, TriageService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
