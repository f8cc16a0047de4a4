use serde_json::Value;
use tracing::warn;

use vigil_core::{JiraConfig, VigilError};

/// Ticket details fetched from the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetails {
    /// Ticket identifier (e.g. `PROJ-123`).
    pub id: String,
    /// Summary line.
    pub summary: String,
    /// Workflow status name.
    pub status: String,
    /// Assignee display name, or "Unassigned".
    pub assignee: String,
    /// Priority name, or "None".
    pub priority: String,
    /// Description text, or "No description".
    pub description: String,
}

/// Jira ticket lookup client.
///
/// Lookup is best-effort by contract: absence, HTTP errors, and unexpected
/// response shapes all yield `None` — the orchestrator records that as a
/// compliance outcome, never as a run failure.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] when any of base URL, email, or API
    /// token is missing. Callers that want lookup to be optional should
    /// check [`JiraConfig::is_configured`] first.
    pub fn new(config: &JiraConfig) -> Result<Self, VigilError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| VigilError::Config("jira.base_url not set".into()))?;
        let email = config
            .email
            .clone()
            .ok_or_else(|| VigilError::Config("jira.email not set".into()))?;
        let api_token = config
            .api_token
            .clone()
            .ok_or_else(|| VigilError::Config("jira.api_token not set".into()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
        })
    }

    /// Look up a ticket. Returns `None` when the ticket does not exist or
    /// the lookup fails for any reason.
    pub async fn ticket(&self, id: &str) -> Option<TicketDetails> {
        let url = format!("{}/rest/api/3/issue/{id}", self.base_url);
        let response = match self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(ticket = id, "Jira request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(ticket = id, status = %response.status(), "Jira lookup failed");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(ticket = id, "Jira response was not JSON: {e}");
                return None;
            }
        };

        parse_ticket_fields(id, &body)
    }
}

/// Map a Jira issue payload into [`TicketDetails`]. Optional fields fall
/// back the way the tracker UI does: "Unassigned", "None", "No description".
fn parse_ticket_fields(id: &str, body: &Value) -> Option<TicketDetails> {
    let fields = body.get("fields")?;
    let summary = fields.get("summary")?.as_str()?.to_string();
    let status = fields
        .get("status")
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let assignee = fields
        .get("assignee")
        .and_then(|a| a.get("displayName"))
        .and_then(Value::as_str)
        .unwrap_or("Unassigned")
        .to_string();
    let priority = fields
        .get("priority")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("None")
        .to_string();
    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("No description")
        .to_string();

    Some(TicketDetails {
        id: id.to_string(),
        summary,
        status,
        assignee,
        priority,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_issue_payload() {
        let body: Value = serde_json::from_str(
            r#"{
                "fields": {
                    "summary": "Add greeting endpoint",
                    "status": { "name": "In Progress" },
                    "assignee": { "displayName": "Dana Developer" },
                    "priority": { "name": "High" },
                    "description": "As a user..."
                }
            }"#,
        )
        .unwrap();
        let details = parse_ticket_fields("PROJ-1", &body).unwrap();
        assert_eq!(details.summary, "Add greeting endpoint");
        assert_eq!(details.status, "In Progress");
        assert_eq!(details.assignee, "Dana Developer");
        assert_eq!(details.priority, "High");
    }

    #[test]
    fn optional_fields_get_defaults() {
        let body: Value = serde_json::from_str(
            r#"{ "fields": { "summary": "Bare ticket", "status": { "name": "Open" } } }"#,
        )
        .unwrap();
        let details = parse_ticket_fields("PROJ-2", &body).unwrap();
        assert_eq!(details.assignee, "Unassigned");
        assert_eq!(details.priority, "None");
        assert_eq!(details.description, "No description");
    }

    #[test]
    fn missing_summary_is_not_a_ticket() {
        let body: Value = serde_json::from_str(r#"{ "fields": {} }"#).unwrap();
        assert!(parse_ticket_fields("PROJ-3", &body).is_none());
    }

    #[test]
    fn client_requires_complete_config() {
        let config = JiraConfig {
            base_url: Some("https://example.atlassian.net".into()),
            email: None,
            api_token: None,
        };
        assert!(JiraClient::new(&config).is_err());
    }
}
