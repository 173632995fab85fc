//! Structured observability hooks for triage runs.
//!
//! This module provides:
//! - Campaign-scoped tracing spans via the `TriageSpan` RAII guard
//! - Emission functions for run start, source failure, skipped records and run end
//!
//! Events are emitted at `info!` level unless noted; filter with `TRIAGE_LOG`.

use tracing::{debug, info, warn};

use crate::domain::{RecordAnomaly, TriageCounters};
use triage_sources::SourceKind;

/// RAII guard that enters a campaign-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = TriageSpan::enter("42");
/// // every event below carries campaign_id = "42"
/// ```
pub struct TriageSpan {
    _span: tracing::span::EnteredSpan,
}

impl TriageSpan {
    pub fn enter(campaign_id: &str) -> Self {
        Self {
            _span: triage_span(campaign_id).entered(),
        }
    }
}

/// The `triage.run` span, for async code that must not hold an entered guard
/// across an await.
pub fn triage_span(campaign_id: &str) -> tracing::Span {
    tracing::info_span!("triage.run", campaign_id = %campaign_id)
}

pub fn emit_triage_started(campaign_id: &str, today: &str) {
    info!(event = "triage.started", campaign_id = %campaign_id, today = %today);
}

/// Emit event: one source could not be fetched (warning level).
pub fn emit_source_failed(kind: SourceKind, error: &dyn std::fmt::Display) {
    warn!(event = "triage.source_failed", source = %kind, error = %error);
}

/// Emit event: one input record was set aside (debug level).
pub fn emit_record_skipped(anomaly: &RecordAnomaly) {
    debug!(
        event = "triage.record_skipped",
        source = %anomaly.origin,
        position = anomaly.position,
        id = ?anomaly.id.as_ref().map(|id| id.as_str()),
        reason = ?anomaly.kind,
    );
}

/// Emit event: run finished with per-list sizes and counters.
pub fn emit_triage_finished(
    campaign_id: &str,
    sizes: [usize; 4],
    counters: &TriageCounters,
    partial: bool,
) {
    let [participants, principal, waitlist, rejected] = sizes;
    info!(
        event = "triage.finished",
        campaign_id = %campaign_id,
        participants = participants,
        principal = principal,
        waitlist = waitlist,
        rejected = rejected,
        total = counters.total,
        excluded = counters.excluded_count,
        skipped = counters.skipped,
        collapsed = counters.collapsed,
        out_of_scope = counters.out_of_scope,
        unclassified = counters.unclassified,
        auto_converted = counters.auto_converted,
        partial = partial,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_span_create() {
        let _span = TriageSpan::enter("test-campaign");
    }
}
