use crate::context::DEFAULT_CONTEXT_RADIUS;
use crate::error::{ExtractionError, Result};
use crate::llm::prompts::DEFAULT_PROMPT_CHAR_BUDGET;
use crate::schema::FinancialYear;
use crate::taxonomy::Taxonomy;
use crate::years::{YearLocator, DEFAULT_MAX_YEARS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for both extraction paths. Every field has a default, so a
/// JSON config only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters scanned on each side of a year mention.
    pub context_radius: usize,
    /// Characters of document text included in an LLM extraction prompt.
    pub prompt_char_budget: usize,
    /// Most recent years kept by the pattern path.
    pub max_years: usize,
    /// Keep future years when no other year is mentioned.
    pub future_year_fallback: bool,
    /// Overrides today's year when filtering future years.
    pub current_year: Option<FinancialYear>,
    /// Provider tried once more when a response fails schema validation.
    pub retry_provider: Option<String>,
    pub taxonomy: Taxonomy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            max_years: DEFAULT_MAX_YEARS,
            future_year_fallback: false,
            current_year: None,
            retry_provider: Some("openai".to_string()),
            taxonomy: Taxonomy::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_years == 0 {
            return Err(ExtractionError::InvalidConfig(
                "max_years must be at least 1".to_string(),
            ));
        }
        if self.context_radius == 0 {
            return Err(ExtractionError::InvalidConfig(
                "context_radius must be at least 1".to_string(),
            ));
        }
        if self.prompt_char_budget == 0 {
            return Err(ExtractionError::InvalidConfig(
                "prompt_char_budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn year_locator(&self) -> YearLocator {
        let mut locator = YearLocator::default();
        if let Some(year) = self.current_year {
            locator.current_year = year;
        }
        locator.max_years = self.max_years;
        locator.with_future_year_fallback(self.future_year_fallback)
    }
}
