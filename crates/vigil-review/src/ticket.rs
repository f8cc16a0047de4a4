use std::sync::LazyLock;

use regex::Regex;

/// `PROJECT-NUMBER` shaped ticket reference: an uppercase project token
/// followed by a hyphen and one or more digits.
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Z0-9]*-[0-9]+\b").expect("ticket pattern is valid"));

/// Extract a ticket identifier from PR free text.
///
/// Scans the title first, then the description, then the branch name, and
/// returns the first reference found. Validation is pattern-only — whether
/// the ticket exists is the tracker's business. Absence is a first-class
/// outcome, not an error: the orchestrator turns it into a compliance
/// finding rather than aborting the run.
///
/// # Examples
///
/// ```
/// use vigil_review::ticket::extract_ticket;
///
/// let id = extract_ticket("PROJ-123: fix bug", "", "main");
/// assert_eq!(id.as_deref(), Some("PROJ-123"));
///
/// assert!(extract_ticket("fix bug", "", "main").is_none());
/// assert!(extract_ticket("proj123", "", "main").is_none());
/// ```
pub fn extract_ticket(title: &str, description: &str, branch: &str) -> Option<String> {
    [title, description, branch]
        .iter()
        .find_map(|text| TICKET_PATTERN.find(text))
        .map(|m| m.as_str().to_string())
}
