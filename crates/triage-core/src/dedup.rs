//! Cross-source deduplication.
//!
//! A beneficiary first contacted through reception exists in both sources
//! under the same identifier. The reception record is authoritative for it,
//! so its id is excluded from every beneficiary-derived list.

use std::collections::HashSet;

use triage_sources::{ReceptionParticipantRecord, RecordId};

/// Identifiers present among `reception`. Records without an id are ignored.
pub fn excluded_ids<'a, I>(reception: I) -> HashSet<RecordId>
where
    I: IntoIterator<Item = &'a ReceptionParticipantRecord>,
{
    reception.into_iter().filter_map(|r| r.id.clone()).collect()
}
