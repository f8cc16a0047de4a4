//! Inbound webhook transport for Vigil.
//!
//! Receipt and orchestration are decoupled: a recognized change event is
//! acknowledged immediately with a queued status, and the review run
//! executes in a detached task. The transport performs no deduplication
//! across repeated deliveries — two notifications for the same PR produce
//! two independent runs (a known, documented open question of the upstream
//! delivery contract).

pub mod signature;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use vigil_core::{ServerConfig, VigilConfig, VigilError};
use vigil_review::orchestrator::Orchestrator;

use crate::signature::verify_signature;

/// Event actions that trigger a review run.
const REVIEWED_ACTIONS: &[&str] = &["opened", "synchronize", "reopened"];

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
    server: ServerConfig,
}

/// Build the HTTP router: `POST /webhook/github` and `GET /ping`.
pub fn router(orchestrator: Arc<Orchestrator>, server: ServerConfig) -> Router {
    let state = AppState {
        orchestrator,
        server,
    };
    Router::new()
        .route("/webhook/github", post(github_webhook))
        .route("/ping", get(ping))
        .with_state(state)
}

/// Construct the orchestrator from `config` and serve until shutdown.
///
/// # Errors
///
/// Returns [`VigilError::Config`] when required configuration is missing,
/// or [`VigilError::Io`] when the listener cannot bind.
pub async fn serve(config: VigilConfig) -> Result<(), VigilError> {
    let orchestrator = Arc::new(Orchestrator::new(&config)?);
    let server = config.server.clone();

    if server.webhook_secret.is_empty() {
        warn!("webhook secret is empty; signature verification is DISABLED");
    }

    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    info!(bind = %server.bind, "listening for webhook events");

    let app = router(orchestrator, server);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let signature_header = headers
        .get("X-Hub-Signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !verify_signature(&state.server.webhook_secret, &body, signature_header) {
        warn!("webhook rejected: invalid signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid signature" })),
        );
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("webhook rejected: malformed payload: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "malformed payload" })),
            );
        }
    };

    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok());

    match classify_event(event_type, &payload) {
        EventDecision::Queue { repo, pr_number } => {
            info!(%repo, pr_number, "review queued");
            let orchestrator = state.orchestrator.clone();
            tokio::spawn(async move {
                match orchestrator.run(&repo, pr_number, false).await {
                    Ok(outcome) => {
                        info!(%repo, pr_number, decision = %outcome.decision, "review complete")
                    }
                    Err(e) => error!(%repo, pr_number, "review run failed: {e}"),
                }
            });
            (
                StatusCode::OK,
                Json(json!({ "status": "review_queued", "pr": pr_number })),
            )
        }
        EventDecision::Ignore => (StatusCode::OK, Json(json!({ "status": "ignored" }))),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EventDecision {
    /// A pull-request event with a reviewed action: schedule a run.
    Queue { repo: String, pr_number: u64 },
    /// Anything else: acknowledge and do nothing.
    Ignore,
}

/// Decide whether a delivery triggers a review. Only `pull_request` events
/// with an action in [`REVIEWED_ACTIONS`] qualify; every missing field
/// downgrades to ignore rather than erroring.
fn classify_event(event_type: Option<&str>, payload: &Value) -> EventDecision {
    if event_type != Some("pull_request") {
        return EventDecision::Ignore;
    }
    let Some(action) = payload.get("action").and_then(Value::as_str) else {
        return EventDecision::Ignore;
    };
    if !REVIEWED_ACTIONS.contains(&action) {
        return EventDecision::Ignore;
    }
    let Some(repo) = payload
        .pointer("/repository/full_name")
        .and_then(Value::as_str)
    else {
        return EventDecision::Ignore;
    };
    let Some(pr_number) = payload
        .pointer("/pull_request/number")
        .and_then(Value::as_u64)
    else {
        return EventDecision::Ignore;
    };
    EventDecision::Queue {
        repo: repo.to_string(),
        pr_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr_payload(action: &str) -> Value {
        json!({
            "action": action,
            "pull_request": { "number": 42 },
            "repository": { "full_name": "octocat/hello" }
        })
    }

    #[test]
    fn opened_synchronize_reopened_are_queued() {
        for action in ["opened", "synchronize", "reopened"] {
            let decision = classify_event(Some("pull_request"), &pr_payload(action));
            assert_eq!(
                decision,
                EventDecision::Queue {
                    repo: "octocat/hello".into(),
                    pr_number: 42
                },
                "action {action} should queue"
            );
        }
    }

    #[test]
    fn other_actions_are_ignored() {
        let decision = classify_event(Some("pull_request"), &pr_payload("closed"));
        assert_eq!(decision, EventDecision::Ignore);
    }

    #[test]
    fn non_pull_request_events_are_ignored() {
        assert_eq!(
            classify_event(Some("push"), &pr_payload("opened")),
            EventDecision::Ignore
        );
        assert_eq!(
            classify_event(None, &pr_payload("opened")),
            EventDecision::Ignore
        );
    }

    #[test]
    fn missing_fields_downgrade_to_ignore() {
        assert_eq!(
            classify_event(Some("pull_request"), &json!({ "action": "opened" })),
            EventDecision::Ignore
        );
        assert_eq!(
            classify_event(
                Some("pull_request"),
                &json!({
                    "action": "opened",
                    "repository": { "full_name": "octocat/hello" }
                })
            ),
            EventDecision::Ignore
        );
    }

    #[test]
    fn router_builds_with_a_configured_orchestrator() {
        let mut config = VigilConfig::default();
        config.github.token = Some("ghp_test".into());
        let orchestrator = Arc::new(Orchestrator::new(&config).unwrap());
        let _router = router(orchestrator, config.server);
    }
}
