use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use vigil_core::{ReviewContext, ScanResult, VigilError};

use crate::llm::{ChatMessage, LlmClient, Role};
use crate::prompt;

/// The four externally-reasoned review capabilities shipped by default.
pub const CAPABILITIES: &[&str] = &[
    "code-quality",
    "security",
    "performance-testing",
    "documentation-compliance",
];

/// A producer of review findings for one capability.
///
/// Each specialist is behaviorally opaque to the orchestrator: it receives
/// the immutable [`ReviewContext`] and returns exactly one [`ScanResult`].
/// The orchestrator never branches on which specialist it is talking to.
///
/// Implementations must not fail the run: an unavailable backend is
/// reported as a degraded result, never an error.
#[async_trait]
pub trait Specialist: Send + Sync {
    /// Stable producer identifier used in findings and the status table.
    fn id(&self) -> &str;

    /// Evaluate the context and return findings. Infallible by contract —
    /// failures become [`ScanResult::degraded`].
    async fn evaluate(&self, ctx: &ReviewContext) -> ScanResult;
}

/// Specialist adapter backed by the shared LLM client.
///
/// The adapter only shapes the call (context payload assembly) and the
/// response (coercion into the [`vigil_core::Finding`] schema); all judgment
/// lives in the external model. Request errors, timeouts, and malformed
/// responses yield an empty degraded result so one unavailable capability
/// never blocks the rest of the pipeline.
pub struct LlmSpecialist {
    capability: String,
    system_prompt: String,
    client: Arc<LlmClient>,
}

impl LlmSpecialist {
    /// Create an adapter for one capability.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] for an unknown capability id.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use vigil_core::LlmConfig;
    /// use vigil_review::llm::LlmClient;
    /// use vigil_review::specialist::LlmSpecialist;
    ///
    /// let client = Arc::new(LlmClient::new(&LlmConfig::default()).unwrap());
    /// let specialist = LlmSpecialist::new(client, "security").unwrap();
    /// ```
    pub fn new(client: Arc<LlmClient>, capability: &str) -> Result<Self, VigilError> {
        let system_prompt = prompt::system_prompt(capability)
            .ok_or_else(|| VigilError::Config(format!("unknown capability: {capability}")))?;
        Ok(Self {
            capability: capability.to_string(),
            system_prompt,
            client,
        })
    }

    /// Build one adapter per default capability, sharing the client.
    pub fn default_set(client: Arc<LlmClient>) -> Vec<Arc<dyn Specialist>> {
        CAPABILITIES
            .iter()
            .map(|capability| {
                let specialist = LlmSpecialist::new(client.clone(), capability)
                    .expect("default capabilities are known");
                Arc::new(specialist) as Arc<dyn Specialist>
            })
            .collect()
    }

    async fn try_evaluate(&self, ctx: &ReviewContext) -> Result<ScanResult, VigilError> {
        let changed: Vec<String> = ctx.changed_files.iter().map(|f| f.path.clone()).collect();
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: self.system_prompt.clone(),
            },
            ChatMessage {
                role: Role::User,
                content: prompt::build_review_prompt(&ctx.title, &ctx.diff, &changed),
            },
        ];

        let response = self.client.chat(messages).await?;
        let findings = prompt::parse_findings(&response, &self.capability)?;
        Ok(ScanResult::new(self.capability.clone(), findings))
    }
}

#[async_trait]
impl Specialist for LlmSpecialist {
    fn id(&self) -> &str {
        &self.capability
    }

    async fn evaluate(&self, ctx: &ReviewContext) -> ScanResult {
        match self.try_evaluate(ctx).await {
            Ok(result) => result,
            Err(e) => {
                warn!(specialist = %self.capability, "specialist unavailable: {e}");
                ScanResult::degraded(self.capability.clone())
            }
        }
    }
}
