//! # Statement Extractor
//!
//! A library for pulling structured balance sheet, income statement, cash flow
//! and ratio data out of plain financial statement text.
//!
//! ## Core Concepts
//!
//! - **Pattern Path**: Locates fiscal years, scans a window of text around each
//!   year for known line-item labels, and computes ratios from what it found
//! - **LLM Path**: Sends the text to a text-completion capability with a JSON
//!   template, validates the reply, and projects it onto the same layout
//! - **Fallback**: Any failure on the LLM path returns the pattern result instead,
//!   so extraction always produces a result
//! - **Nulls**: A value that cannot be found is `None`, never `0.0`
//!
//! ## Example
//!
//! ```rust
//! use statement_extractor::*;
//!
//! let text = "Year ended 2022. Total Current Assets 1,200. Total Current Liabilities 600.";
//! let result = FinancialDataExtractor::new(text).extract_via_patterns();
//!
//! assert_eq!(result.years, vec![2022]);
//! assert_eq!(result.ratio(2022, Ratio::CurrentRatio), Some(2.0));
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod memo;
pub mod ratios;
pub mod records;
pub mod schema;
pub mod statements;
pub mod taxonomy;
pub mod years;

pub use config::ExtractorConfig;
pub use context::{extract_value, ContextWindow, LabelMatcher};
pub use error::{ExtractionError, Result};
pub use extractor::FinancialDataExtractor;
pub use llm::{LlmExtractor, TextCompletion};
pub use memo::{build_memo_prompt, generate_credit_memo};
pub use ratios::{compute_ratios, safe_divide, RatioInputs};
pub use records::{assemble, flatten, FinancialRecord};
pub use schema::*;
pub use statements::{
    build_balance_sheet, build_cash_flow, build_income_statement, build_statements, Statements,
};
pub use taxonomy::{items, StatementTaxonomy, Taxonomy};
pub use years::{locate_years, YearLocator};

#[cfg(feature = "providers")]
pub use llm::{GeminiClient, OpenAiClient, ProviderRouter, ProviderSettings};

/// Runs the LLM path with `client`, falling back to pattern extraction.
pub fn extract_financial_data<C>(text: &str, client: &C, provider: Option<&str>) -> ExtractionResult
where
    C: TextCompletion + ?Sized,
{
    FinancialDataExtractor::new(text).extract_via_llm(client, provider)
}
