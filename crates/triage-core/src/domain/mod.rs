//! Domain models for campaign triage.
//!
//! Canonical definitions for the engine's outputs:
//! - `EnrichedRecord`: presentation copy of a beneficiary or reception record
//! - `TriageLists`: the four mutually exclusive lists
//! - `TriageOutcome`: lists plus accounting of what was left out
//!
//! Input records live in `triage_sources::records`.

pub mod error;
pub mod outcome;
pub mod record;

// Re-export main types and errors
pub use error::{Result, TriageError};
pub use outcome::{
    AnomalyKind, ListKind, RecordAnomaly, TriageCounters, TriageLists, TriageOutcome,
};
pub use record::{EnrichedRecord, RecordSource, RESERVED_KEYS};
