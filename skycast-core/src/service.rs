use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{
    error::WeatherError,
    model::{WeatherRequest, WeatherResponse},
    normalize::normalize,
    prompt::PromptBuilder,
    provider::{GenerationRequest, ModelTransport},
};

/// Runs one fetch: prompt, model call, normalization.
///
/// Holds the transport for its whole lifetime; build it once and reuse it.
/// There is no retry, caching or in-flight deduplication.
#[derive(Debug)]
pub struct WeatherService {
    transport: Box<dyn ModelTransport>,
    prompts: PromptBuilder,
}

impl WeatherService {
    pub fn new(transport: Box<dyn ModelTransport>) -> Self {
        Self { transport, prompts: PromptBuilder::default() }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn prompt_for(&self, request: &WeatherRequest, today: NaiveDate) -> String {
        self.prompts.build(&request.location, request.granularity, today)
    }

    #[instrument(skip_all, fields(location = %request.location, granularity = %request.granularity))]
    pub async fn fetch(
        &self,
        request: &WeatherRequest,
        today: NaiveDate,
    ) -> Result<WeatherResponse, WeatherError> {
        let generation = GenerationRequest {
            prompt: self.prompt_for(request, today),
            search_grounding: true,
        };

        let reply = self.transport.generate(&generation).await.inspect_err(|err| {
            warn!(error = %err, "model request failed");
        })?;

        let response = normalize(&reply.text, &reply.citations).inspect_err(|err| {
            warn!(error = %err, "could not parse model reply");
        })?;

        info!(
            resolved = %response.location,
            points = response.data.len(),
            alerts = response.alerts.as_ref().map_or(0, Vec::len),
            "weather fetched"
        );

        Ok(response)
    }
}
