use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Top-level configuration loaded from `vigil.toml`.
///
/// Resolution is layered: defaults < config file < environment. The
/// environment overlay happens once, explicitly, via [`VigilConfig::apply_env`]
/// at process start — no module reads the environment at use time, so runs
/// are testable without process-environment manipulation.
///
/// # Examples
///
/// ```
/// use vigil_core::VigilConfig;
///
/// let config = VigilConfig::default();
/// assert_eq!(config.review.publish_attempts, 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    /// Change-hosting (GitHub) settings.
    #[serde(default)]
    pub github: GithubConfig,
    /// Ticket-system (Jira) settings.
    #[serde(default)]
    pub jira: JiraConfig,
    /// LLM provider settings for the specialist reviewers.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review pipeline behavior.
    #[serde(default)]
    pub review: ReviewConfig,
    /// Inbound webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl VigilConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Io`] if the file cannot be read, or
    /// [`VigilError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vigil_core::VigilConfig;
    /// use std::path::Path;
    ///
    /// let config = VigilConfig::from_file(Path::new("vigil.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, VigilError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_core::VigilConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// publish_attempts = 5
    /// "#;
    /// let config = VigilConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.publish_attempts, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, VigilError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay environment variables onto the loaded configuration.
    ///
    /// Called once at process start. Recognized variables:
    /// `GITHUB_TOKEN`, `JIRA_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`,
    /// `WEBHOOK_SECRET`, `CALLBACK_URL`, `VIGIL_LLM_API_KEY`,
    /// `VIGIL_LLM_BASE_URL`.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Ok(url) = std::env::var("JIRA_URL") {
            self.jira.base_url = Some(url);
        }
        if let Ok(email) = std::env::var("JIRA_EMAIL") {
            self.jira.email = Some(email);
        }
        if let Ok(token) = std::env::var("JIRA_API_TOKEN") {
            self.jira.api_token = Some(token);
        }
        if let Ok(secret) = std::env::var("WEBHOOK_SECRET") {
            self.server.webhook_secret = secret;
        }
        if let Ok(url) = std::env::var("CALLBACK_URL") {
            self.server.callback_url = Some(url);
        }
        if let Ok(key) = std::env::var("VIGIL_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("VIGIL_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
    }
}

/// Change-hosting API configuration.
///
/// The token is fatal-if-absent for any run that needs the API; everything
/// else degrades gracefully.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token or app installation token.
    pub token: Option<String>,
    /// API base URL override (GitHub Enterprise).
    pub api_base: Option<String>,
}

impl GithubConfig {
    /// Return the token or a configuration error naming the fix.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] when no token is configured.
    pub fn require_token(&self) -> Result<&str, VigilError> {
        self.token.as_deref().ok_or_else(|| {
            VigilError::Config(
                "GITHUB_TOKEN not set. Add it to vigil.toml [github] or the environment".into(),
            )
        })
    }
}

/// Ticket-system configuration. When incomplete, ticket lookup is disabled
/// and every extracted reference reports as not-found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Jira site base URL (e.g. `https://example.atlassian.net`).
    pub base_url: Option<String>,
    /// Account email for basic auth.
    pub email: Option<String>,
    /// API token for basic auth.
    pub api_token: Option<String>,
}

impl JiraConfig {
    /// True when every field needed for lookups is present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.email.is_some() && self.api_token.is_some()
    }
}

/// LLM provider configuration for the specialist reviewers.
///
/// # Examples
///
/// ```
/// use vigil_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (default: 120).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Review pipeline behavior.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewConfig;
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.specialist_timeout_secs, 120);
/// assert_eq!(config.publish_attempts, 3);
/// assert_eq!(config.publish_backoff_ms, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Per-producer timeout during fan-out, in seconds (default: 120).
    /// Expiry cancels that producer and marks it WARN; the run proceeds.
    #[serde(default = "default_specialist_timeout_secs")]
    pub specialist_timeout_secs: u64,
    /// Bounded attempts for posting the report (default: 3).
    #[serde(default = "default_publish_attempts")]
    pub publish_attempts: u32,
    /// Initial backoff between publish attempts, doubled each retry
    /// (default: 500).
    #[serde(default = "default_publish_backoff_ms")]
    pub publish_backoff_ms: u64,
}

fn default_specialist_timeout_secs() -> u64 {
    120
}

fn default_publish_attempts() -> u32 {
    3
}

fn default_publish_backoff_ms() -> u64 {
    500
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            specialist_timeout_secs: default_specialist_timeout_secs(),
            publish_attempts: default_publish_attempts(),
            publish_backoff_ms: default_publish_backoff_ms(),
        }
    }
}

/// Inbound webhook server configuration.
///
/// # Examples
///
/// ```
/// use vigil_core::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.bind, "0.0.0.0:9000");
/// assert!(config.webhook_secret.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (default: `0.0.0.0:9000`).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Shared secret for webhook signature verification. An empty secret
    /// disables verification (accept-all) — a documented development
    /// weakening, never appropriate in production.
    #[serde(default)]
    pub webhook_secret: String,
    /// Publicly reachable URL for this service, when registered with the
    /// hosting platform.
    pub callback_url: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:9000".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            webhook_secret: String::new(),
            callback_url: None,
        }
    }
}
