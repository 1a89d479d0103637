//! External reasoning capability
//!
//! The verdict synthesizer talks to an LLM through [`ReasoningCapability`],
//! so tests and alternative providers can stand in for OpenAI.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::service::verdict::ServiceError;

/// Free-text completion given a system context and a user message
#[async_trait]
pub trait ReasoningCapability: Send + Sync {
    async fn complete(
        &self,
        system_context: &str,
        evidence_bundle: &str,
    ) -> Result<String, ServiceError>;
}

/// OpenAI chat completion through rig
#[derive(Clone)]
pub struct OpenAiReasoner {
    client: openai::Client,
    model: String,
}

impl OpenAiReasoner {
    /// Create a reasoner for `model` with the provided API key
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self, ServiceError> {
        let client = openai::Client::new(api_key).map_err(|e| {
            ServiceError::Request(format!("Failed to create OpenAI client: {}", e))
        })?;
        let model = model.into();

        tracing::info!(model = %model, "External reasoning client initialized");

        Ok(Self { client, model })
    }
}

#[async_trait]
impl ReasoningCapability for OpenAiReasoner {
    async fn complete(
        &self,
        system_context: &str,
        evidence_bundle: &str,
    ) -> Result<String, ServiceError> {
        let start_time = std::time::Instant::now();

        let agent = self
            .client
            .agent(&self.model)
            .preamble(system_context)
            .temperature(0.0)
            .build();

        match agent.prompt(evidence_bundle).await {
            Ok(response) => {
                tracing::info!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = evidence_bundle.len(),
                    response_length = response.len(),
                    "OpenAI API call for verdict completed successfully"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "OpenAI API call for verdict failed"
                );
                Err(ServiceError::Request(e.to_string()))
            }
        }
    }
}
