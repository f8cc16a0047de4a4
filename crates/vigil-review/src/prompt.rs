use serde::Deserialize;

use vigil_core::{Finding, Severity, VigilError};

const RESPONSE_CONTRACT: &str = "\
Respond with a JSON object:
{
  \"findings\": [
    {
      \"severity\": \"CRITICAL\" | \"HIGH\" | \"MEDIUM\" | \"LOW\",
      \"category\": \"Short taxonomy label\",
      \"description\": \"Clear explanation of the issue\",
      \"line\": 42,
      \"recommendation\": \"Optional suggested fix\"
    }
  ]
}

The line field is optional; omit it when you cannot localize the issue.
A CRITICAL finding must always include a recommendation.
If you find no issues, return: { \"findings\": [] }";

const CODE_QUALITY_PROMPT: &str = "\
You are a code quality and architecture reviewer. Analyze the diff for:
- readability, naming, magic numbers, duplication, dead code
- function length, parameter count, nesting depth
- layering violations, tight coupling, god objects
- error handling: swallowed exceptions, missing timeouts, no retry on
  external calls
- breaking changes to public APIs or signatures

Only report issues you are certain about, with the diff line number.";

const SECURITY_PROMPT: &str = "\
You are a security reviewer. A deterministic pattern scanner already covers
common secret, injection, and XSS shapes; focus on what patterns cannot see:
- missing authentication or authorization on changed code paths
- input validation gaps and unsafe data handling
- insecure cryptography choices in context
- trust-boundary violations and privilege escalation
- dependency changes introducing known-vulnerable components

Prioritize CRITICAL and HIGH issues with specific fix recommendations.";

const PERFORMANCE_TESTING_PROMPT: &str = "\
You are a performance and testing reviewer. Analyze the diff for:
- N+1 queries, inefficient loops, unnecessary database or network calls
- missing async where blocking hurts, memory growth in long-lived paths
- changed behavior without new or updated tests
- tests that cover only the happy path
- broken or weakened existing tests

Flag anti-patterns and missing coverage with concrete suggestions.";

const DOCUMENTATION_COMPLIANCE_PROMPT: &str = "\
You are a documentation and compliance reviewer. Analyze the diff for:
- undocumented breaking changes, stale README or API docs
- public APIs without doc comments, missing migration notes
- REST conventions: wrong status codes, missing validation or pagination
- PII or sensitive data handled without care
- removed configuration without deprecation notice

Report gaps with the lightest fix that closes them.";

/// Build the system prompt for a specialist capability, or `None` for an
/// unknown capability id.
///
/// # Examples
///
/// ```
/// use vigil_review::prompt::system_prompt;
///
/// let prompt = system_prompt("security").unwrap();
/// assert!(prompt.contains("pattern scanner"));
/// assert!(system_prompt("astrology").is_none());
/// ```
pub fn system_prompt(capability: &str) -> Option<String> {
    let body = match capability {
        "code-quality" => CODE_QUALITY_PROMPT,
        "security" => SECURITY_PROMPT,
        "performance-testing" => PERFORMANCE_TESTING_PROMPT,
        "documentation-compliance" => DOCUMENTATION_COMPLIANCE_PROMPT,
        _ => return None,
    };
    Some(format!("{body}\n\n{RESPONSE_CONTRACT}"))
}

/// Build the user prompt containing the diff and PR context.
///
/// # Examples
///
/// ```
/// use vigil_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("Fix login", "+new line", &["src/auth.rs".into()]);
/// assert!(prompt.contains("+new line"));
/// assert!(prompt.contains("src/auth.rs"));
/// ```
pub fn build_review_prompt(title: &str, diff: &str, changed_files: &[String]) -> String {
    let mut prompt = format!("PR title: {title}\n\nChanged files:\n");
    for file in changed_files {
        prompt.push_str(&format!("- {file}\n"));
    }
    prompt.push_str(&format!(
        "\nReview the following changes:\n\n```diff\n{diff}\n```\n"
    ));
    prompt
}

#[derive(Deserialize)]
struct LlmResponse {
    findings: Vec<LlmFinding>,
}

#[derive(Deserialize)]
struct LlmFinding {
    severity: String,
    category: String,
    description: String,
    line: Option<serde_json::Value>,
    recommendation: Option<String>,
}

/// Parse a specialist's JSON response into validated [`Finding`] entries.
///
/// Handles markdown code fences around the JSON. Individual entries with an
/// unknown severity are skipped; a response that is not the expected JSON
/// shape at all is an error, which the adapter downgrades to a degraded
/// (WARN) scan result.
///
/// # Errors
///
/// Returns [`VigilError::Llm`] when the response is not parseable JSON.
///
/// # Examples
///
/// ```
/// use vigil_review::prompt::parse_findings;
///
/// let json = r#"{"findings":[]}"#;
/// let findings = parse_findings(json, "security").unwrap();
/// assert!(findings.is_empty());
/// ```
pub fn parse_findings(response: &str, source: &str) -> Result<Vec<Finding>, VigilError> {
    let cleaned = strip_code_fences(response);

    let parsed: LlmResponse = serde_json::from_str(cleaned)
        .map_err(|e| VigilError::Llm(format!("malformed specialist response: {e}")))?;

    let mut findings = Vec::new();
    for entry in parsed.findings {
        let Ok(severity) = entry.severity.parse::<Severity>() else {
            continue;
        };
        let mut finding = Finding::new(severity, entry.category, entry.description, source);
        if let Some(serde_json::Value::Number(n)) = &entry.line {
            if let Some(line) = n.as_u64().filter(|&l| l > 0) {
                finding = finding.with_line(line as u32);
            }
        }
        if let Some(recommendation) = entry.recommendation {
            finding = finding.with_recommendation(recommendation);
        }
        findings.push(finding);
    }
    Ok(findings)
}

fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
