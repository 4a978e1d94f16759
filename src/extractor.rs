use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::llm::completion::TextCompletion;
use crate::llm::extractor::LlmExtractor;
use crate::ratios::compute_ratios;
use crate::schema::{ExtractionResult, FinancialYear};
use crate::statements::build_statements;
use log::{debug, error, info, warn};

/// Extracts statements and ratios from one document's text.
///
/// Both operations always return a result: missing values are `null`, and
/// any failure on the LLM path falls back to pattern extraction.
#[derive(Debug, Clone)]
pub struct FinancialDataExtractor {
    text: String,
    config: ExtractorConfig,
}

impl FinancialDataExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, ExtractorConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: ExtractorConfig) -> Self {
        Self {
            text: text.into(),
            config,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn locate_years(&self) -> Vec<FinancialYear> {
        self.config.year_locator().locate(&self.text)
    }

    /// Deterministic extraction: years, then the three statements, then ratios.
    pub fn extract_via_patterns(&self) -> ExtractionResult {
        info!("Extracting financial data using pattern matching");

        let years = self.locate_years();
        if years.is_empty() {
            debug!("No fiscal years found in {} characters of text", self.text.len());
        } else {
            debug!("Found fiscal years {:?}", years);
        }

        let statements = build_statements(
            &self.text,
            &years,
            &self.config.taxonomy,
            self.config.context_radius,
        );
        let ratios = compute_ratios(
            &statements.balance_sheet,
            &statements.income_statement,
            &years,
        );

        ExtractionResult {
            years,
            balance_sheet: statements.balance_sheet,
            income_statement: statements.income_statement,
            cash_flow: statements.cash_flow,
            ratios,
        }
    }

    /// Extraction through a text-completion capability.
    ///
    /// `provider` selects a backend; `None` uses the client's default. When the
    /// completion fails, or its reply cannot be decoded or validated (after the
    /// single retry with the configured retry provider), the result of
    /// [`extract_via_patterns`](Self::extract_via_patterns) is returned instead.
    pub fn extract_via_llm<C>(&self, client: &C, provider: Option<&str>) -> ExtractionResult
    where
        C: TextCompletion + ?Sized,
    {
        LlmExtractor::new(client, &self.config)
            .extract(&self.text, provider)
            .unwrap_or_else(|e| {
                match &e {
                    ExtractionError::CompletionFailed { .. } => {
                        error!("Error in LLM extraction: {}", e)
                    }
                    _ => warn!("LLM extraction produced no usable data: {}", e),
                }
                info!("Falling back to pattern-based extraction");
                self.extract_via_patterns()
            })
    }
}
