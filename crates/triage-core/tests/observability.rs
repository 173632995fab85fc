//! Observability smoke tests for triage run tracing.

use triage_core::domain::{AnomalyKind, RecordAnomaly, TriageCounters};
use triage_core::obs::{
    emit_record_skipped, emit_source_failed, emit_triage_finished, emit_triage_started,
    TriageSpan,
};
use triage_core::METRICS;
use triage_sources::{RecordId, SourceKind};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn emit_triage_started_logs_campaign() {
    emit_triage_started("42", "2024-06-15");
}

#[traced_test]
#[test]
fn emit_source_failed_logs_warning() {
    let error = "connection refused";
    emit_source_failed(SourceKind::Reception, &error);
}

#[traced_test]
#[test]
fn emit_record_skipped_logs_anomaly() {
    emit_record_skipped(&RecordAnomaly {
        origin: SourceKind::Beneficiary,
        position: 3,
        id: Some(RecordId::from(7)),
        kind: AnomalyKind::Repeated,
    });
    emit_record_skipped(&RecordAnomaly {
        origin: SourceKind::Reception,
        position: 0,
        id: None,
        kind: AnomalyKind::MissingId,
    });
}

#[traced_test]
#[test]
fn emit_triage_finished_logs_counters() {
    let counters = TriageCounters {
        total: 5,
        excluded_count: 1,
        ..TriageCounters::default()
    };
    emit_triage_finished("42", [1, 2, 1, 0], &counters, false);
}

#[traced_test]
#[test]
fn triage_span_enter_creates_span() {
    let span = TriageSpan::enter("42");
    emit_triage_started("42", "2024-06-15");
    drop(span);
}

#[traced_test]
#[test]
fn metrics_flush_does_not_panic() {
    METRICS.flush();
}
