use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum number of characters of matched text carried in
/// [`Finding::evidence`]. Long enough to triage, short enough to avoid
/// echoing an entire secret or payload into a shared report.
pub const EVIDENCE_CAP: usize = 50;

/// Severity of a finding, from most to least urgent.
///
/// # Examples
///
/// ```
/// use vigil_core::Severity;
///
/// let s: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
/// assert_eq!(s, Severity::Critical);
/// assert!(Severity::Critical.rank() < Severity::Low.rank());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks approval.
    Critical,
    /// Should be fixed before merge.
    High,
    /// Recommended fix.
    Medium,
    /// Nice-to-have improvement.
    Low,
}

impl Severity {
    /// Sort rank: lower is more severe. Critical < High < Medium < Low.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_core::Severity;
    ///
    /// assert_eq!(Severity::Critical.rank(), 0);
    /// assert_eq!(Severity::Low.rank(), 3);
    /// ```
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// One detected issue, produced by a rule tier or a specialist reviewer.
///
/// Construct via [`Finding::new`] so the evidence cap and the
/// critical-recommendation invariant are enforced in one place.
///
/// # Examples
///
/// ```
/// use vigil_core::{Finding, Severity, EVIDENCE_CAP};
///
/// let finding = Finding::new(
///     Severity::High,
///     "Hardcoded password",
///     "Hardcoded password",
///     "pattern-scan",
/// )
/// .with_evidence("password = \"x\".repeat(400)");
/// assert!(finding.evidence.unwrap().chars().count() <= EVIDENCE_CAP);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Severity of the issue.
    pub severity: Severity,
    /// Short taxonomy label (e.g. "Injection", "Hardcoded password").
    pub category: String,
    /// Human-readable explanation.
    pub description: String,
    /// Producer that emitted the finding (rule tier or specialist id).
    pub source: String,
    /// 1-based line reference into the diff, when the producer can localize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Excerpt of the matched text, capped at [`EVIDENCE_CAP`] characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    /// Suggested fix. Always present for [`Severity::Critical`] findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Finding {
    /// Create a finding. A critical finding with no recommendation receives
    /// a generated "Fix {category}" suggestion so the severity gate can
    /// always show an action next to a blocker.
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let category = category.into();
        let recommendation = match severity {
            Severity::Critical => Some(format!("Fix {}", category.to_lowercase())),
            _ => None,
        };
        Self {
            severity,
            category,
            description: description.into(),
            source: source.into(),
            line: None,
            evidence: None,
            recommendation,
        }
    }

    /// Attach a diff line reference.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach evidence, truncated to [`EVIDENCE_CAP`] characters.
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        let evidence: String = evidence.into();
        self.evidence = Some(evidence.chars().take(EVIDENCE_CAP).collect());
        self
    }

    /// Replace the generated or absent recommendation with an explicit one.
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// The output of one producer: an ordered list of findings plus a degraded
/// flag set when the producer itself was unavailable (timeout, error,
/// malformed output). Immutable once produced.
///
/// # Examples
///
/// ```
/// use vigil_core::ScanResult;
///
/// let result = ScanResult::degraded("security");
/// assert!(result.degraded);
/// assert!(result.findings.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Producer identifier (rule tier or specialist id).
    pub producer: String,
    /// Findings in the order the producer emitted them.
    pub findings: Vec<Finding>,
    /// True when the producer failed and these findings are incomplete.
    pub degraded: bool,
}

impl ScanResult {
    /// A successful scan with the given findings.
    pub fn new(producer: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            producer: producer.into(),
            findings,
            degraded: false,
        }
    }

    /// An empty result marking the producer unavailable. The run proceeds;
    /// the aggregator reports this producer as WARN.
    pub fn degraded(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            findings: Vec::new(),
            degraded: true,
        }
    }
}

/// One file touched by the PR, with per-file change counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Change status as reported by the hosting API (added, modified, ...).
    pub status: String,
    /// Lines added.
    pub additions: u32,
    /// Lines deleted.
    pub deletions: u32,
}

/// Outcome of ticket extraction and lookup. Absence is a first-class,
/// reportable result — never an error.
///
/// # Examples
///
/// ```
/// use vigil_core::TicketStatus;
///
/// let status = TicketStatus::NotFound { id: "PROJ-123".into() };
/// assert!(!matches!(status, TicketStatus::Found { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum TicketStatus {
    /// A ticket reference was extracted and resolved in the tracker.
    Found {
        /// Ticket identifier (e.g. `PROJ-123`).
        id: String,
        /// Ticket summary line.
        summary: String,
        /// Workflow status (e.g. "In Progress").
        status: String,
    },
    /// A reference was extracted but the tracker does not know it, or the
    /// lookup failed.
    NotFound {
        /// The extracted identifier.
        id: String,
    },
    /// No ticket reference anywhere in the PR title, description, or branch.
    Missing,
}

/// Inputs for one review run. Constructed once during pre-flight and
/// read-only thereafter; concurrent producers share it behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContext {
    /// Repository in `owner/repo` form.
    pub repo: String,
    /// Pull request number.
    pub pr_number: u64,
    /// PR title.
    pub title: String,
    /// PR description body (empty when absent).
    pub description: String,
    /// Head branch name.
    pub branch: String,
    /// Ticket extraction/lookup outcome.
    pub ticket: TicketStatus,
    /// Raw unified diff text.
    pub diff: String,
    /// Files touched by the PR.
    pub changed_files: Vec<ChangedFile>,
}

/// Per-producer gate status and the overall rollup decision.
///
/// # Examples
///
/// ```
/// use vigil_core::GateStatus;
///
/// assert_eq!(GateStatus::Fail.to_string(), "FAIL");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    /// No findings.
    Pass,
    /// Non-blocking findings, or the producer was unavailable.
    Warn,
    /// At least one critical finding; blocks approval.
    Fail,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStatus::Pass => write!(f, "PASS"),
            GateStatus::Warn => write!(f, "WARN"),
            GateStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// The merged, sorted view of every producer's findings, plus the gate
/// decision. Derived by `aggregate()`; never mutated after construction —
/// any change requires re-aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    /// Gate status per producer, keyed by producer id. `BTreeMap` keeps the
    /// iteration order (and thus the rendered report) deterministic.
    pub producer_status: BTreeMap<String, GateStatus>,
    /// Critical findings, sorted.
    pub critical_findings: Vec<Finding>,
    /// Non-critical findings, sorted.
    pub other_findings: Vec<Finding>,
    /// Overall decision across all producers.
    pub decision: GateStatus,
    /// Ticket validation outcome carried through to the report.
    pub ticket: TicketStatus,
}
