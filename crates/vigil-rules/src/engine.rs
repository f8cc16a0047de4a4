use regex::{Regex, RegexBuilder};

use vigil_core::{Finding, ScanResult, Severity};

use crate::tables::{DEEP_RULES, FAST_RULES};

/// Producer id reported by the fast tier.
pub const FAST_PRODUCER: &str = "pattern-scan";
/// Producer id reported by the deep tier.
pub const DEEP_PRODUCER: &str = "deep-scan";

struct CompiledRule {
    regex: Regex,
    category: String,
    description: String,
}

struct SkippedRule {
    category: String,
    reason: String,
}

/// Deterministic pattern-rule scanner over raw diff text.
///
/// Two independently invokable tiers share one engine: the fast tier is a
/// small fixed list of secret/injection/XSS shapes, the deep tier a larger
/// table grouped into ten vulnerability-taxonomy categories. All matches of
/// all rules are reported; overlapping matches from different rules are
/// retained (dedup, if wanted, belongs to the aggregator). The engine never
/// mutates the diff and never executes matched content.
///
/// # Examples
///
/// ```
/// use vigil_rules::RuleEngine;
///
/// let engine = RuleEngine::new();
/// let result = engine.scan_fast(r#"password = "abc123""#);
/// assert_eq!(result.findings.len(), 1);
/// assert_eq!(result.findings[0].category, "Hardcoded password");
/// ```
pub struct RuleEngine {
    fast: Vec<CompiledRule>,
    deep: Vec<CompiledRule>,
    fast_skipped: Vec<SkippedRule>,
    deep_skipped: Vec<SkippedRule>,
}

impl RuleEngine {
    /// Compile both rule tables. A rule whose pattern fails to compile is
    /// skipped for the lifetime of the engine and surfaced as one LOW
    /// "Scan incomplete" finding per scan, rather than aborting anything.
    pub fn new() -> Self {
        let mut fast = Vec::with_capacity(FAST_RULES.len());
        let mut fast_skipped = Vec::new();
        for rule in FAST_RULES {
            match compile(rule.pattern) {
                Ok(regex) => fast.push(CompiledRule {
                    regex,
                    category: rule.category.to_string(),
                    description: rule.category.to_string(),
                }),
                Err(e) => fast_skipped.push(SkippedRule {
                    category: rule.category.to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        let mut deep = Vec::with_capacity(DEEP_RULES.len());
        let mut deep_skipped = Vec::new();
        for rule in DEEP_RULES {
            let description = format!("{}: {}", rule.group, rule.detail);
            match compile(rule.pattern) {
                Ok(regex) => deep.push(CompiledRule {
                    regex,
                    category: rule.group.to_string(),
                    description,
                }),
                Err(e) => deep_skipped.push(SkippedRule {
                    category: description,
                    reason: e.to_string(),
                }),
            }
        }

        Self {
            fast,
            deep,
            fast_skipped,
            deep_skipped,
        }
    }

    /// Fast tier scan. Every match of every rule becomes one HIGH finding
    /// with the rule category, the diff line, and capped evidence.
    pub fn scan_fast(&self, diff: &str) -> ScanResult {
        let mut findings = scan_rules(&self.fast, diff, FAST_PRODUCER, |_| Severity::High);
        append_skipped(&mut findings, &self.fast_skipped, FAST_PRODUCER);
        ScanResult::new(FAST_PRODUCER, findings)
    }

    /// Deep tier scan. Severity is a deterministic function of the rule
    /// description: injection / hardcoded / exposed issues are CRITICAL,
    /// everything else HIGH.
    pub fn scan_deep(&self, diff: &str) -> ScanResult {
        let mut findings = scan_rules(&self.deep, diff, DEEP_PRODUCER, severity_for);
        append_skipped(&mut findings, &self.deep_skipped, DEEP_PRODUCER);
        ScanResult::new(DEEP_PRODUCER, findings)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}

/// CRITICAL when the rule description names an injection, hardcoded, or
/// exposed issue; HIGH otherwise.
fn severity_for(description: &str) -> Severity {
    let lowered = description.to_lowercase();
    if ["injection", "hardcoded", "exposed"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        Severity::Critical
    } else {
        Severity::High
    }
}

fn scan_rules(
    rules: &[CompiledRule],
    diff: &str,
    producer: &str,
    severity: impl Fn(&str) -> Severity,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules {
        for m in rule.regex.find_iter(diff) {
            let finding = Finding::new(
                severity(&rule.description),
                rule.category.clone(),
                rule.description.clone(),
                producer,
            )
            .with_line(line_of(diff, m.start()))
            .with_evidence(m.as_str())
            .with_recommendation(format!("Fix {}", rule.description.to_lowercase()));
            findings.push(finding);
        }
    }
    findings
}

fn append_skipped(findings: &mut Vec<Finding>, skipped: &[SkippedRule], producer: &str) {
    for rule in skipped {
        findings.push(Finding::new(
            Severity::Low,
            "Scan incomplete",
            format!("Rule '{}' skipped: {}", rule.category, rule.reason),
            producer,
        ));
    }
}

/// 1-based line number of a byte offset within `text`.
fn line_of(text: &str, offset: usize) -> u32 {
    text.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::EVIDENCE_CAP;

    #[test]
    fn fast_tier_flags_hardcoded_password_once() {
        let engine = RuleEngine::new();
        let result = engine.scan_fast(r#"password = "abc123""#);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.category, "Hardcoded password");
        assert_eq!(finding.source, FAST_PRODUCER);
        assert!(!result.degraded);
    }

    #[test]
    fn deep_tier_flags_os_command_injection_as_critical() {
        let engine = RuleEngine::new();
        let result = engine.scan_deep(r#"os.system("rm " + user_input)"#);
        let injections: Vec<_> = result
            .findings
            .iter()
            .filter(|f| f.category == "Injection")
            .collect();
        assert_eq!(injections.len(), 1);
        assert_eq!(injections[0].severity, Severity::Critical);
        assert!(injections[0].recommendation.is_some());
    }

    #[test]
    fn all_matches_are_reported_not_just_the_first() {
        let engine = RuleEngine::new();
        let diff = "password = \"one\"\nother line\npassword = \"two\"\n";
        let result = engine.scan_fast(diff);
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].line, Some(1));
        assert_eq!(result.findings[1].line, Some(3));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let engine = RuleEngine::new();
        let result = engine.scan_fast(r#"PASSWORD = "Hunter2""#);
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn evidence_never_exceeds_the_cap() {
        let engine = RuleEngine::new();
        let diff = format!("password = \"{}\"", "x".repeat(300));
        let result = engine.scan_fast(&diff);
        for finding in &result.findings {
            let evidence = finding.evidence.as_ref().expect("rule findings carry evidence");
            assert!(evidence.chars().count() <= EVIDENCE_CAP);
        }
    }

    #[test]
    fn weak_hash_is_high_not_critical() {
        let engine = RuleEngine::new();
        let result = engine.scan_deep("digest = md5(data)");
        let weak: Vec<_> = result
            .findings
            .iter()
            .filter(|f| f.description.contains("MD5"))
            .collect();
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].severity, Severity::High);
        assert_eq!(weak[0].category, "Cryptographic Failure");
    }

    #[test]
    fn unsafe_yaml_load_is_flagged() {
        let engine = RuleEngine::new();
        let result = engine.scan_deep("config = yaml.load(body)");
        assert!(result
            .findings
            .iter()
            .any(|f| f.category == "Data Integrity"));
    }

    #[test]
    fn overlapping_rules_both_report() {
        // innerHTML matches the fast XSS shape and the deep XSS group.
        let engine = RuleEngine::new();
        let diff = "element.innerHTML = payload";
        assert_eq!(engine.scan_fast(diff).findings.len(), 1);
        assert!(engine
            .scan_deep(diff)
            .findings
            .iter()
            .any(|f| f.category == "XSS"));
    }

    #[test]
    fn clean_diff_produces_no_findings() {
        let engine = RuleEngine::new();
        let diff = "+fn add(a: u32, b: u32) -> u32 { a + b }\n";
        assert!(engine.scan_fast(diff).findings.is_empty());
        assert!(engine.scan_deep(diff).findings.is_empty());
    }

    #[test]
    fn scans_are_deterministic() {
        let engine = RuleEngine::new();
        let diff = "password = \"abc\"\neval(input)\nverify = False\n";
        let first = engine.scan_deep(diff);
        let second = engine.scan_deep(diff);
        assert_eq!(first.findings, second.findings);
    }

    #[test]
    fn severity_function_matches_taxonomy() {
        assert_eq!(
            severity_for("Injection: SQL injection risk"),
            Severity::Critical
        );
        assert_eq!(
            severity_for("Cryptographic Failure: Hardcoded password"),
            Severity::Critical
        );
        assert_eq!(
            severity_for("Cryptographic Failure: AWS Access Key exposed"),
            Severity::Critical
        );
        assert_eq!(
            severity_for("Misconfiguration: Debug mode enabled in production"),
            Severity::High
        );
    }

    #[test]
    fn pathological_single_line_diff_is_scanned() {
        let engine = RuleEngine::new();
        let diff = "x".repeat(1_000_000);
        let result = engine.scan_deep(&diff);
        assert!(result.findings.is_empty());
        assert!(!result.degraded);
    }
}
