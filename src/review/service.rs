/// Request/response glue between the prompts, the declared schemas and a
/// model provider.
use std::sync::Arc;

use tracing::{debug, error, info};

use super::prompts;
use super::schema::{self, ResponseShape};
use super::types::{AnalysisResult, ExecutionTrace, RefineResponse};
use crate::config::GenerationConfig;
use crate::model::{ModelError, ModelProvider, ModelRequest};

/// Stateless front door for `analyze`, `trace` and `refine`.
#[derive(Clone)]
pub struct ReviewService {
    provider: Arc<dyn ModelProvider>,
    generation: GenerationConfig,
}

impl ReviewService {
    pub fn new(provider: Arc<dyn ModelProvider>, generation: GenerationConfig) -> Self {
        Self {
            provider,
            generation,
        }
    }

    /// Structured code review of `code`.
    pub async fn analyze(&self, code: &str) -> Result<AnalysisResult, ModelError> {
        self.provider.check_credentials()?;
        self.run(prompts::analyze_prompt(code), self.generation.analyze_temperature)
            .await
    }

    /// Simulated step-by-step execution of `code`.
    pub async fn trace(&self, code: &str) -> Result<ExecutionTrace, ModelError> {
        self.provider.check_credentials()?;
        self.run(prompts::trace_prompt(code), self.generation.trace_temperature)
            .await
    }

    /// Apply a free-text `instruction` to `current_code`.
    pub async fn refine(
        &self,
        current_code: &str,
        instruction: &str,
    ) -> Result<RefineResponse, ModelError> {
        self.provider.check_credentials()?;
        self.run(
            prompts::refine_prompt(current_code, instruction),
            self.generation.refine_temperature,
        )
        .await
    }

    async fn run<T: ResponseShape>(&self, prompt: String, temperature: f32) -> Result<T, ModelError> {
        let kind = T::KIND;
        let request =
            ModelRequest::new(kind, prompt, T::response_schema()).with_temperature(temperature);

        debug!(
            kind = %kind,
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_bytes = request.prompt.len(),
            "Dispatching model request"
        );

        let reply = self.provider.generate(&request).await.inspect_err(|e| {
            error!(kind = %kind, "Model call failed: {e}");
        })?;

        let parsed = schema::parse::<T>(reply.as_deref()).inspect_err(|e| {
            error!(kind = %kind, "Rejected model reply: {e}");
        })?;

        info!(kind = %kind, "Model reply accepted");
        Ok(parsed)
    }
}
