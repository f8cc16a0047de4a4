use std::fmt::Write;

use vigil_core::{AggregatedReport, Finding, GateStatus, ReviewContext, Severity, TicketStatus};

/// Render an [`AggregatedReport`] into the fixed-structure review document
/// posted back to the PR.
///
/// Rendering is pure and side-effect-free; publishing is the orchestrator's
/// PUBLISH step. Sections, in order: header with the gate decision, ticket
/// validation, per-producer status table, a detailed block per CRITICAL
/// finding (with a before/after suggested-fix pair when a recommendation is
/// present), a compact list of HIGH/MEDIUM findings, recommendations, and
/// the closing human-decision prompt.
///
/// # Examples
///
/// ```
/// use vigil_core::{ReviewContext, TicketStatus};
/// use vigil_review::aggregate::aggregate;
/// use vigil_review::report::render;
///
/// let report = aggregate(&[], TicketStatus::Missing);
/// let ctx = ReviewContext {
///     repo: "octocat/hello".into(),
///     pr_number: 42,
///     title: "fix".into(),
///     description: String::new(),
///     branch: "main".into(),
///     ticket: TicketStatus::Missing,
///     diff: String::new(),
///     changed_files: Vec::new(),
/// };
/// let doc = render(&report, &ctx);
/// assert!(doc.contains("octocat/hello#42"));
/// assert!(doc.contains("Request Changes"));
/// ```
pub fn render(report: &AggregatedReport, ctx: &ReviewContext) -> String {
    let mut out = String::new();

    let badge = match report.decision {
        GateStatus::Pass => "\u{2705} PASS",
        GateStatus::Warn => "\u{26a0}\u{fe0f} WARN",
        GateStatus::Fail => "\u{1f6d1} FAIL",
    };
    let _ = writeln!(out, "# Vigil Review — {}#{}\n", ctx.repo, ctx.pr_number);
    let _ = writeln!(out, "**Overall:** {badge}\n");

    render_ticket(&mut out, &report.ticket);
    render_status_table(&mut out, report);
    render_critical(&mut out, &report.critical_findings);
    render_compact(&mut out, &report.other_findings);
    render_recommendations(&mut out, &report.other_findings);

    out.push_str("## Decision\n\n");
    out.push_str(match report.decision {
        GateStatus::Fail => {
            "Critical findings block approval. A human reviewer should resolve them, then choose: "
        }
        GateStatus::Warn => {
            "Findings need attention but do not block. A human reviewer should choose: "
        }
        GateStatus::Pass => "No blocking findings. A human reviewer should choose: ",
    });
    out.push_str("**Approve** / **Request Changes** / **Comment**\n");

    out
}

fn render_ticket(out: &mut String, ticket: &TicketStatus) {
    out.push_str("## Ticket\n\n");
    match ticket {
        TicketStatus::Found {
            id,
            summary,
            status,
        } => {
            let _ = writeln!(out, "`{id}` — {summary} ({status})\n");
        }
        TicketStatus::NotFound { id } => {
            let _ = writeln!(
                out,
                "`{id}` was referenced but could not be resolved in the tracker.\n"
            );
        }
        TicketStatus::Missing => {
            out.push_str(
                "No ticket reference found in the PR title, description, or branch name.\n\n",
            );
        }
    }
}

fn render_status_table(out: &mut String, report: &AggregatedReport) {
    out.push_str("## Producer Status\n\n");
    out.push_str("| Producer | Status |\n|---|---|\n");
    for (producer, status) in &report.producer_status {
        let _ = writeln!(out, "| {producer} | {status} |");
    }
    out.push('\n');
}

fn render_critical(out: &mut String, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    out.push_str("## Critical Issues\n\n");
    for finding in findings {
        let location = match finding.line {
            Some(line) => format!(" (line {line})"),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "### \u{1f6d1} {} — `{}`{location}\n",
            finding.category, finding.source
        );
        let _ = writeln!(out, "{}\n", finding.description);
        if let Some(recommendation) = &finding.recommendation {
            if let Some(evidence) = &finding.evidence {
                let _ = writeln!(out, "**Before:**\n\n```\n{evidence}\n```\n");
                let _ = writeln!(out, "**After (suggested):** {recommendation}\n");
            } else {
                let _ = writeln!(out, "**Suggested fix:** {recommendation}\n");
            }
        }
    }
}

fn render_compact(out: &mut String, findings: &[Finding]) {
    let listed: Vec<&Finding> = findings
        .iter()
        .filter(|f| matches!(f.severity, Severity::High | Severity::Medium))
        .collect();
    if listed.is_empty() {
        return;
    }
    out.push_str("## Findings\n\n");
    for finding in listed {
        let location = match finding.line {
            Some(line) => format!(", line {line}"),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "- **{}** {} (`{}`{location}): {}",
            finding.severity, finding.category, finding.source, finding.description
        );
    }
    out.push('\n');
}

fn render_recommendations(out: &mut String, findings: &[Finding]) {
    let mut lines: Vec<String> = Vec::new();
    for finding in findings {
        if let Some(recommendation) = &finding.recommendation {
            let line = recommendation.clone();
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
    }
    for finding in findings.iter().filter(|f| f.severity == Severity::Low) {
        let line = format!("Nice-to-have: {}", finding.description);
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        return;
    }
    out.push_str("## Recommendations\n\n");
    for line in lines {
        let _ = writeln!(out, "- {line}");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use vigil_core::ScanResult;

    fn context(ticket: TicketStatus) -> ReviewContext {
        ReviewContext {
            repo: "octocat/hello".into(),
            pr_number: 7,
            title: "PROJ-1 fix".into(),
            description: String::new(),
            branch: "fix".into(),
            ticket,
            diff: String::new(),
            changed_files: Vec::new(),
        }
    }

    #[test]
    fn report_always_ends_with_the_decision_prompt() {
        let report = aggregate(&[], TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));
        assert!(doc.contains("**Approve** / **Request Changes** / **Comment**"));
        assert!(doc.trim_end().ends_with("**Comment**"));
    }

    #[test]
    fn critical_block_shows_before_after_pair() {
        let finding = Finding::new(
            Severity::Critical,
            "Injection",
            "Injection: SQL injection risk",
            "deep-scan",
        )
        .with_line(12)
        .with_evidence("execute(\"...\" + user)")
        .with_recommendation("Use parameterized queries");
        let results = vec![ScanResult::new("deep-scan", vec![finding])];
        let report = aggregate(&results, TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));

        assert!(doc.contains("## Critical Issues"));
        assert!(doc.contains("**Before:**"));
        assert!(doc.contains("execute(\"...\" + user)"));
        assert!(doc.contains("**After (suggested):** Use parameterized queries"));
        assert!(doc.contains("(line 12)"));
    }

    #[test]
    fn high_and_medium_render_as_compact_lines() {
        let results = vec![ScanResult::new(
            "security",
            vec![
                Finding::new(Severity::High, "AuthZ", "missing check", "security").with_line(3),
                Finding::new(Severity::Medium, "Validation", "no bounds", "security"),
            ],
        )];
        let report = aggregate(&results, TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));

        assert!(doc.contains("- **HIGH** AuthZ (`security`, line 3): missing check"));
        assert!(doc.contains("- **MEDIUM** Validation (`security`): no bounds"));
    }

    #[test]
    fn low_findings_fold_into_recommendations() {
        let results = vec![ScanResult::new(
            "code-quality",
            vec![Finding::new(
                Severity::Low,
                "Style",
                "rename x to count",
                "code-quality",
            )],
        )];
        let report = aggregate(&results, TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));

        assert!(doc.contains("## Recommendations"));
        assert!(doc.contains("Nice-to-have: rename x to count"));
        assert!(!doc.contains("## Findings"));
    }

    #[test]
    fn ticket_states_render_distinctly() {
        let found = TicketStatus::Found {
            id: "PROJ-1".into(),
            summary: "Add greeting".into(),
            status: "In Progress".into(),
        };
        let report = aggregate(&[], found.clone());
        let doc = render(&report, &context(found));
        assert!(doc.contains("`PROJ-1` — Add greeting (In Progress)"));

        let not_found = TicketStatus::NotFound { id: "PROJ-9".into() };
        let report = aggregate(&[], not_found.clone());
        let doc = render(&report, &context(not_found));
        assert!(doc.contains("could not be resolved"));

        let report = aggregate(&[], TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));
        assert!(doc.contains("No ticket reference found"));
    }

    #[test]
    fn status_table_lists_every_producer() {
        let results = vec![
            ScanResult::new("pattern-scan", vec![]),
            ScanResult::degraded("security"),
        ];
        let report = aggregate(&results, TicketStatus::Missing);
        let doc = render(&report, &context(TicketStatus::Missing));

        assert!(doc.contains("| pattern-scan | PASS |"));
        assert!(doc.contains("| security | WARN |"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let results = vec![ScanResult::new(
            "deep-scan",
            vec![Finding::new(
                Severity::Critical,
                "Injection",
                "x",
                "deep-scan",
            )],
        )];
        let report = aggregate(&results, TicketStatus::Missing);
        let ctx = context(TicketStatus::Missing);
        assert_eq!(render(&report, &ctx), render(&report, &ctx));
    }
}
