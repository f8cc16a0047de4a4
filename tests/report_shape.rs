use vigil_core::{Finding, ReviewContext, ScanResult, Severity, TicketStatus};
use vigil_review::aggregate::aggregate;
use vigil_review::report::render;

fn context(ticket: TicketStatus) -> ReviewContext {
    ReviewContext {
        repo: "octocat/hello".into(),
        pr_number: 12,
        title: "PROJ-7 harden login".into(),
        description: String::new(),
        branch: "feature/PROJ-7-login".into(),
        ticket,
        diff: String::new(),
        changed_files: Vec::new(),
    }
}

#[test]
fn full_report_has_every_fixed_section() {
    let results = vec![
        ScanResult::new(
            "deep-scan",
            vec![Finding::new(
                Severity::Critical,
                "Injection",
                "Injection: SQL injection risk",
                "deep-scan",
            )
            .with_line(4)
            .with_evidence("execute(\"...\" + id)")
            .with_recommendation("Use parameterized queries")],
        ),
        ScanResult::new(
            "security",
            vec![Finding::new(Severity::High, "AuthZ", "missing check", "security").with_line(9)],
        ),
        ScanResult::degraded("performance-testing"),
    ];
    let ticket = TicketStatus::Found {
        id: "PROJ-7".into(),
        summary: "Harden login".into(),
        status: "In Progress".into(),
    };
    let report = aggregate(&results, ticket.clone());
    let doc = render(&report, &context(ticket));

    // Ticket validation block
    assert!(doc.contains("## Ticket"));
    assert!(doc.contains("`PROJ-7`"));
    // Per-producer status table
    assert!(doc.contains("| deep-scan | FAIL |"));
    assert!(doc.contains("| security | WARN |"));
    assert!(doc.contains("| performance-testing | WARN |"));
    // Critical detail with before/after pair
    assert!(doc.contains("## Critical Issues"));
    assert!(doc.contains("**Before:**"));
    assert!(doc.contains("**After (suggested):** Use parameterized queries"));
    // Compact line-referenced list
    assert!(doc.contains("- **HIGH** AuthZ (`security`, line 9): missing check"));
    // Human decision prompt
    assert!(doc.contains("**Approve** / **Request Changes** / **Comment**"));
}

#[test]
fn timed_out_producer_still_leaves_other_findings_in_the_report() {
    let results = vec![
        ScanResult::degraded("security"),
        ScanResult::new(
            "pattern-scan",
            vec![Finding::new(
                Severity::High,
                "Hardcoded password",
                "Hardcoded password",
                "pattern-scan",
            )],
        ),
    ];
    let report = aggregate(&results, TicketStatus::Missing);
    let doc = render(&report, &context(TicketStatus::Missing));

    assert!(doc.contains("| security | WARN |"));
    assert!(doc.contains("Hardcoded password"));
}

#[test]
fn rendering_same_aggregate_twice_is_byte_identical() {
    let results = vec![ScanResult::new(
        "code-quality",
        vec![Finding::new(Severity::Medium, "Naming", "unclear name", "code-quality")],
    )];
    let report = aggregate(&results, TicketStatus::Missing);
    let ctx = context(TicketStatus::Missing);
    assert_eq!(render(&report, &ctx), render(&report, &ctx));
}
