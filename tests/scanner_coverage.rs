use vigil_core::{Severity, EVIDENCE_CAP};
use vigil_rules::{RuleEngine, DEEP_PRODUCER, FAST_PRODUCER};

#[test]
fn hardcoded_password_literal_is_one_high_fast_finding() {
    let engine = RuleEngine::new();
    let result = engine.scan_fast(r#"password = "abc123""#);

    assert_eq!(result.producer, FAST_PRODUCER);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].severity, Severity::High);
    assert_eq!(result.findings[0].category, "Hardcoded password");
}

#[test]
fn os_system_concatenation_is_one_critical_injection() {
    let engine = RuleEngine::new();
    let result = engine.scan_deep(r#"os.system("rm " + user_input)"#);

    assert_eq!(result.producer, DEEP_PRODUCER);
    let injections: Vec<_> = result
        .findings
        .iter()
        .filter(|f| f.category == "Injection")
        .collect();
    assert_eq!(injections.len(), 1);
    assert_eq!(injections[0].severity, Severity::Critical);
}

#[test]
fn evidence_is_capped_for_long_matches() {
    let engine = RuleEngine::new();
    let diff = format!("api_key = \"{}\"", "k".repeat(500));

    for result in [engine.scan_fast(&diff), engine.scan_deep(&diff)] {
        for finding in &result.findings {
            if let Some(evidence) = &finding.evidence {
                assert!(
                    evidence.chars().count() <= EVIDENCE_CAP,
                    "evidence exceeded cap in {}",
                    result.producer
                );
            }
        }
    }
}

#[test]
fn every_instance_in_a_multi_issue_diff_is_reported() {
    let engine = RuleEngine::new();
    let diff = r#"
+password = "first"
+query("SELECT * FROM users WHERE name = '" + name + "'")
+password = "second"
"#;
    let result = engine.scan_fast(diff);
    let passwords = result
        .findings
        .iter()
        .filter(|f| f.category == "Hardcoded password")
        .count();
    assert_eq!(passwords, 2);
    assert!(result
        .findings
        .iter()
        .any(|f| f.category == "Potential SQL injection"));
}

#[test]
fn findings_carry_diff_line_references() {
    let engine = RuleEngine::new();
    let diff = "line one\nline two\neval(body)\n";
    let result = engine.scan_fast(diff);
    assert_eq!(result.findings[0].line, Some(3));
}
