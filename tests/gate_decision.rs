use vigil_core::{Finding, GateStatus, ScanResult, Severity, TicketStatus};
use vigil_review::aggregate::aggregate;

fn result_with(producer: &str, severity: Severity) -> ScanResult {
    ScanResult::new(
        producer,
        vec![Finding::new(severity, "Test", "finding", producer)],
    )
}

#[test]
fn critical_anywhere_fails_regardless_of_other_results() {
    let results = vec![
        result_with("code-quality", Severity::Low),
        result_with("security", Severity::Critical),
        result_with("performance-testing", Severity::High),
        ScanResult::new("pattern-scan", vec![]),
    ];
    let report = aggregate(&results, TicketStatus::Missing);
    assert_eq!(report.decision, GateStatus::Fail);
}

#[test]
fn high_without_critical_warns() {
    let results = vec![
        result_with("security", Severity::High),
        result_with("code-quality", Severity::Medium),
    ];
    let report = aggregate(&results, TicketStatus::Missing);
    assert_eq!(report.decision, GateStatus::Warn);
}

#[test]
fn medium_low_or_nothing_passes() {
    let results = vec![
        result_with("code-quality", Severity::Medium),
        result_with("documentation-compliance", Severity::Low),
        ScanResult::new("deep-scan", vec![]),
    ];
    let report = aggregate(&results, TicketStatus::Missing);
    assert_eq!(report.decision, GateStatus::Pass);
}

#[test]
fn aggregate_twice_yields_identical_reports() {
    let results = vec![
        result_with("security", Severity::Critical),
        result_with("code-quality", Severity::High),
        ScanResult::degraded("performance-testing"),
    ];
    let ticket = TicketStatus::Found {
        id: "PROJ-1".into(),
        summary: "Add greeting".into(),
        status: "In Review".into(),
    };

    let first = aggregate(&results, ticket.clone());
    let second = aggregate(&results, ticket);

    assert_eq!(first.decision, second.decision);
    assert_eq!(first.producer_status, second.producer_status);
    assert_eq!(first.critical_findings, second.critical_findings);
    assert_eq!(first.other_findings, second.other_findings);
}

#[test]
fn unavailable_producer_is_warn_not_fail() {
    let results = vec![
        ScanResult::degraded("security"),
        result_with("code-quality", Severity::Low),
    ];
    let report = aggregate(&results, TicketStatus::Missing);
    assert_eq!(report.producer_status["security"], GateStatus::Warn);
    assert_eq!(report.decision, GateStatus::Pass);
}
