use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use tracing::{debug, info, warn};

use vigil_core::{
    Finding, GateStatus, ReviewConfig, ReviewContext, ScanResult, Severity, TicketStatus,
    VigilConfig, VigilError,
};
use vigil_rules::RuleEngine;

use crate::aggregate::aggregate;
use crate::github::GitHubClient;
use crate::jira::JiraClient;
use crate::llm::LlmClient;
use crate::report::render;
use crate::specialist::{LlmSpecialist, Specialist};
use crate::ticket::extract_ticket;

/// Producer id for findings the orchestrator emits itself (ticket
/// traceability).
const COMPLIANCE_PRODUCER: &str = "compliance";

/// Workflow states. Transitions are one-directional; no state is re-entered
/// within a run. `Failed` is reachable only from `PreFlight` (context cannot
/// be constructed) and `Publish` (retry budget exhausted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Fetch metadata and diff, extract and resolve the ticket.
    PreFlight,
    /// Dispatch every producer concurrently against the immutable context.
    Fanout,
    /// Fold all scan results through the pure aggregator.
    Aggregate,
    /// Render the aggregate into the review document.
    Report,
    /// Post the document to the PR, with bounded retries.
    Publish,
    /// Run finished; a report exists.
    Done,
    /// Run failed; logged, no report produced.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::PreFlight => write!(f, "PRE_FLIGHT"),
            RunState::Fanout => write!(f, "FANOUT"),
            RunState::Aggregate => write!(f, "AGGREGATE"),
            RunState::Report => write!(f, "REPORT"),
            RunState::Publish => write!(f, "PUBLISH"),
            RunState::Done => write!(f, "DONE"),
            RunState::Failed => write!(f, "FAILED"),
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The gate decision.
    pub decision: GateStatus,
    /// The rendered review document.
    pub report: String,
    /// Total findings across all producers.
    pub findings_total: usize,
    /// Whether the report was posted (false for dry runs).
    pub published: bool,
}

/// Top-level review pipeline: pre-flight → fan-out → aggregate → report →
/// publish.
///
/// Holds only collaborator clients and configuration — no per-run state.
/// Each [`run`](Orchestrator::run) builds a fresh [`ReviewContext`], so
/// concurrent runs for different PRs share nothing mutable.
pub struct Orchestrator {
    github: GitHubClient,
    jira: Option<JiraClient>,
    specialists: Vec<Arc<dyn Specialist>>,
    rules: Arc<RuleEngine>,
    review: ReviewConfig,
}

impl Orchestrator {
    /// Build the pipeline from configuration.
    ///
    /// The GitHub token is required. Incomplete Jira configuration disables
    /// ticket lookup (extracted references report as unresolved) rather
    /// than failing construction.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] when the GitHub token is missing, or
    /// an error from client construction.
    pub fn new(config: &VigilConfig) -> Result<Self, VigilError> {
        let github = GitHubClient::new(&config.github)?;

        let jira = if config.jira.is_configured() {
            Some(JiraClient::new(&config.jira)?)
        } else {
            info!("Jira not configured; ticket lookup disabled");
            None
        };

        let llm = Arc::new(LlmClient::new(&config.llm)?);
        let specialists = LlmSpecialist::default_set(llm);

        Ok(Self {
            github,
            jira,
            specialists,
            rules: Arc::new(RuleEngine::new()),
            review: config.review.clone(),
        })
    }

    /// Run one review. With `dry_run` the rendered report is returned but
    /// not posted.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::DiffUnavailable`] when the diff cannot be
    /// fetched (nothing to review) and [`VigilError::PublishExhausted`]
    /// when posting fails after the retry budget. Every other failure is
    /// degraded into findings or producer status, per the propagation
    /// policy.
    pub async fn run(
        &self,
        repo: &str,
        pr_number: u64,
        dry_run: bool,
    ) -> Result<RunOutcome, VigilError> {
        let (owner, name) = split_repo(repo)?;

        info!(state = %RunState::PreFlight, repo, pr_number, "starting review run");
        let ctx = Arc::new(self.pre_flight(&owner, &name, repo, pr_number).await?);

        info!(
            state = %RunState::Fanout,
            producers = self.specialists.len() + 2,
            "dispatching producers"
        );
        let timeout = Duration::from_secs(self.review.specialist_timeout_secs);
        let mut results =
            fan_out(self.rules.clone(), &self.specialists, timeout, ctx.clone()).await;
        if let Some(compliance) = compliance_result(&ctx.ticket) {
            results.push(compliance);
        }

        info!(state = %RunState::Aggregate, results = results.len(), "aggregating");
        let aggregated = aggregate(&results, ctx.ticket.clone());
        let findings_total =
            aggregated.critical_findings.len() + aggregated.other_findings.len();

        info!(state = %RunState::Report, "rendering report");
        let document = render(&aggregated, &ctx);

        let published = if dry_run {
            debug!("dry run; skipping publish");
            false
        } else {
            info!(state = %RunState::Publish, "posting review comment");
            self.publish(&owner, &name, pr_number, &document).await?;
            true
        };

        info!(
            state = %RunState::Done,
            decision = %aggregated.decision,
            findings = findings_total,
            "review run complete"
        );
        Ok(RunOutcome {
            decision: aggregated.decision,
            report: document,
            findings_total,
            published,
        })
    }

    /// Build the immutable context. Metadata and file-list fetches degrade
    /// on failure; only a missing diff is fatal.
    async fn pre_flight(
        &self,
        owner: &str,
        name: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<ReviewContext, VigilError> {
        let details = match self.github.pr_details(owner, name, pr_number).await {
            Ok(details) => Some(details),
            Err(e) => {
                warn!("PR metadata unavailable, continuing without it: {e}");
                None
            }
        };

        let diff = self
            .github
            .pr_diff(owner, name, pr_number)
            .await
            .map_err(|e| VigilError::DiffUnavailable {
                repo: repo.to_string(),
                pr_number,
                reason: e.to_string(),
            })?;

        let changed_files = match self.github.changed_files(owner, name, pr_number).await {
            Ok(files) => files,
            Err(e) => {
                warn!("changed-file list unavailable, continuing without it: {e}");
                Vec::new()
            }
        };

        let (title, description, branch) = details
            .map(|d| (d.title, d.description, d.branch))
            .unwrap_or_default();

        let ticket = match extract_ticket(&title, &description, &branch) {
            None => TicketStatus::Missing,
            Some(id) => match &self.jira {
                Some(jira) => match jira.ticket(&id).await {
                    Some(details) => TicketStatus::Found {
                        id,
                        summary: details.summary,
                        status: details.status,
                    },
                    None => TicketStatus::NotFound { id },
                },
                None => TicketStatus::NotFound { id },
            },
        };

        Ok(ReviewContext {
            repo: repo.to_string(),
            pr_number,
            title,
            description,
            branch,
            ticket,
            diff,
            changed_files,
        })
    }

    /// Post the report with bounded retries and exponential backoff.
    async fn publish(
        &self,
        owner: &str,
        name: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), VigilError> {
        let attempts = self.review.publish_attempts.max(1);
        let mut backoff = Duration::from_millis(self.review.publish_backoff_ms);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.github.post_comment(owner, name, pr_number, body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, attempts, "publish attempt failed: {e}");
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(VigilError::PublishExhausted {
            attempts,
            reason: last_error,
        })
    }
}

/// Dispatch both rule tiers and every specialist as independent concurrent
/// tasks against the shared immutable context, then join them all.
///
/// Each task owns its clone of the context `Arc` and emits exactly one
/// [`ScanResult`]. A task that exceeds `timeout` (or panics) is degraded to
/// WARN for that producer; it never cancels the others and never fails the
/// run. Completion order affects only latency — the aggregator's sort makes
/// the report content order-independent.
pub(crate) async fn fan_out(
    rules: Arc<RuleEngine>,
    specialists: &[Arc<dyn Specialist>],
    timeout: Duration,
    ctx: Arc<ReviewContext>,
) -> Vec<ScanResult> {
    let mut tasks: Vec<BoxFuture<'static, ScanResult>> = Vec::new();

    tasks.push(rule_task(vigil_rules::FAST_PRODUCER, timeout, {
        let rules = rules.clone();
        let ctx = ctx.clone();
        move || rules.scan_fast(&ctx.diff)
    }));
    tasks.push(rule_task(vigil_rules::DEEP_PRODUCER, timeout, {
        let ctx = ctx.clone();
        move || rules.scan_deep(&ctx.diff)
    }));

    for specialist in specialists {
        let specialist = specialist.clone();
        let ctx = ctx.clone();
        tasks.push(Box::pin(async move {
            match tokio::time::timeout(timeout, specialist.evaluate(&ctx)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(producer = specialist.id(), "producer timed out");
                    ScanResult::degraded(specialist.id().to_string())
                }
            }
        }));
    }

    join_all(tasks).await
}

/// Run a synchronous scan on the blocking pool so a pathological diff can
/// neither stall the runtime nor take down the run: timeouts and panics
/// both degrade to WARN.
fn rule_task(
    producer: &'static str,
    timeout: Duration,
    scan: impl FnOnce() -> ScanResult + Send + 'static,
) -> BoxFuture<'static, ScanResult> {
    Box::pin(async move {
        let handle = tokio::task::spawn_blocking(scan);
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(producer, "rule scan failed: {e}");
                ScanResult::degraded(producer)
            }
            Err(_) => {
                warn!(producer, "rule scan timed out");
                ScanResult::degraded(producer)
            }
        }
    })
}

/// Ticket traceability as a finding: a missing reference is MEDIUM, an
/// unresolvable one LOW. A resolved ticket contributes nothing.
fn compliance_result(ticket: &TicketStatus) -> Option<ScanResult> {
    let finding = match ticket {
        TicketStatus::Found { .. } => return None,
        TicketStatus::Missing => Finding::new(
            Severity::Medium,
            "Compliance",
            "No ticket reference found in the PR title, description, or branch name",
            COMPLIANCE_PRODUCER,
        ),
        TicketStatus::NotFound { id } => Finding::new(
            Severity::Low,
            "Compliance",
            format!("Ticket {id} could not be resolved in the tracker"),
            COMPLIANCE_PRODUCER,
        ),
    };
    Some(ScanResult::new(COMPLIANCE_PRODUCER, vec![finding]))
}

fn split_repo(repo: &str) -> Result<(String, String), VigilError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(VigilError::Config(format!(
            "invalid repository '{repo}', expected owner/repo"
        ))),
    }
}
