use std::collections::BTreeMap;

use vigil_core::{AggregatedReport, Finding, GateStatus, ScanResult, Severity, TicketStatus};

/// Merge every producer's findings into one severity-gated report.
///
/// This is a pure function: identical inputs always yield an identical
/// [`AggregatedReport`] — same sort order, same per-producer statuses, same
/// decision — regardless of the order producers happened to finish in.
///
/// Rollup rules:
/// - per producer: FAIL if it emitted any CRITICAL finding; WARN if it
///   emitted any finding at all or reported itself unavailable; else PASS.
/// - overall: FAIL if any CRITICAL finding exists anywhere; otherwise WARN
///   if any HIGH finding exists; otherwise PASS.
///
/// # Examples
///
/// ```
/// use vigil_core::{Finding, GateStatus, ScanResult, Severity, TicketStatus};
/// use vigil_review::aggregate::aggregate;
///
/// let results = vec![ScanResult::new(
///     "pattern-scan",
///     vec![Finding::new(Severity::High, "Hardcoded password", "x", "pattern-scan")],
/// )];
/// let report = aggregate(&results, TicketStatus::Missing);
/// assert_eq!(report.decision, GateStatus::Warn);
/// ```
pub fn aggregate(results: &[ScanResult], ticket: TicketStatus) -> AggregatedReport {
    let mut producer_status = BTreeMap::new();
    for result in results {
        let has_critical = result
            .findings
            .iter()
            .any(|f| f.severity == Severity::Critical);
        let status = if has_critical {
            GateStatus::Fail
        } else if result.degraded || !result.findings.is_empty() {
            GateStatus::Warn
        } else {
            GateStatus::Pass
        };
        producer_status.insert(result.producer.clone(), status);
    }

    let mut findings: Vec<Finding> = results
        .iter()
        .flat_map(|r| r.findings.iter().cloned())
        .collect();
    findings.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let (critical_findings, other_findings): (Vec<Finding>, Vec<Finding>) = findings
        .into_iter()
        .partition(|f| f.severity == Severity::Critical);

    let decision = if !critical_findings.is_empty() {
        GateStatus::Fail
    } else if other_findings.iter().any(|f| f.severity == Severity::High) {
        GateStatus::Warn
    } else {
        GateStatus::Pass
    };

    AggregatedReport {
        producer_status,
        critical_findings,
        other_findings,
        decision,
        ticket,
    }
}

/// Total ordering: severity descending, then diff line ascending with
/// unlocalized findings last, then source/category/description so equal
/// inputs always produce byte-equal reports.
fn sort_key(f: &Finding) -> (u8, u32, &str, &str, &str) {
    (
        f.severity.rank(),
        f.line.unwrap_or(u32::MAX),
        &f.source,
        &f.category,
        &f.description,
    )
}
