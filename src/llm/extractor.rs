use crate::config::ExtractorConfig;
use crate::error::{ExtractionError, Result};
use crate::llm::completion::TextCompletion;
use crate::llm::prompts::{build_extraction_prompt, truncate_chars};
use crate::llm::response::{normalize, parse_response, validate_schema};
use crate::schema::ExtractionResult;
use log::{debug, info, warn};

const LOG_SAMPLE_CHARS: usize = 500;

fn sample(text: &str) -> String {
    if text.chars().count() > LOG_SAMPLE_CHARS {
        format!("{}...", truncate_chars(text, LOG_SAMPLE_CHARS))
    } else {
        text.to_string()
    }
}

/// The LLM-backed extraction path.
///
/// [`LlmExtractor::extract`] reports every failure as an error; falling back to
/// pattern extraction is the caller's decision.
pub struct LlmExtractor<'a, C: TextCompletion + ?Sized> {
    client: &'a C,
    config: &'a ExtractorConfig,
}

impl<'a, C: TextCompletion + ?Sized> LlmExtractor<'a, C> {
    pub fn new(client: &'a C, config: &'a ExtractorConfig) -> Self {
        Self { client, config }
    }

    /// Prompts the model, then parses, validates and normalizes its reply.
    ///
    /// A schema-invalid reply is retried once with the configured retry
    /// provider when the client offers it and it was not the provider just
    /// used. Provider errors and undecodable replies are not retried.
    pub fn extract(&self, text: &str, provider: Option<&str>) -> Result<ExtractionResult> {
        info!("Starting extraction of financial data using LLM");
        debug!("Statement text sample for extraction: {}", sample(text));

        let prompt = build_extraction_prompt(
            text,
            &self.config.taxonomy,
            self.config.prompt_char_budget,
        );

        match self.attempt(&prompt, provider) {
            Err(ExtractionError::SchemaViolation(reason)) => {
                warn!("Extracted financial data failed validation: {}", reason);
                match self.retry_provider(provider) {
                    Some(alternate) => {
                        info!("Attempting extraction with {} as fallback", alternate);
                        self.attempt(&prompt, Some(alternate))
                    }
                    None => Err(ExtractionError::SchemaViolation(reason)),
                }
            }
            outcome => outcome,
        }
    }

    fn attempt(&self, prompt: &str, provider: Option<&str>) -> Result<ExtractionResult> {
        info!(
            "Sending prompt to LLM using {} provider",
            provider.or(self.client.default_provider()).unwrap_or("default")
        );

        let response = self.client.complete(prompt, provider)?;
        info!(
            "Received response from LLM with length {} characters",
            response.len()
        );
        debug!("LLM response sample: {}", sample(&response));

        let value = parse_response(&response)?;
        validate_schema(&value)?;

        let result = normalize(&value, &self.config.taxonomy);
        info!(
            "Successfully parsed and validated financial data for {} years",
            result.years.len()
        );
        Ok(result)
    }

    fn retry_provider(&self, used: Option<&str>) -> Option<&'a str> {
        let alternate = self.config.retry_provider.as_deref()?;
        let used = used.or(self.client.default_provider());
        if used == Some(alternate) || !self.client.supports(alternate) {
            return None;
        }
        Some(alternate)
    }
}
