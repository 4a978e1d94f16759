//! Credit memo drafting on top of an extraction result.

use crate::error::Result;
use crate::llm::completion::TextCompletion;
use crate::llm::prompts::{truncate_chars, MEMO_INSTRUCTIONS};
use crate::schema::{
    BalanceSheetCategory, CashFlowCategory, ExtractionResult, FinancialYear,
    IncomeStatementCategory, Ratio, RatioCategory,
};
use crate::taxonomy::items;
use log::info;
use std::fmt::Write;

/// Characters of document text included in a memo prompt.
pub const MEMO_DOCUMENT_CHARS: usize = 8000;

const BALANCE_SHEET_SUMMARY: [(BalanceSheetCategory, &str); 5] = [
    (BalanceSheetCategory::CurrentAssets, items::TOTAL_CURRENT_ASSETS),
    (BalanceSheetCategory::NonCurrentAssets, items::TOTAL_NON_CURRENT_ASSETS),
    (BalanceSheetCategory::CurrentLiabilities, items::TOTAL_CURRENT_LIABILITIES),
    (BalanceSheetCategory::NonCurrentLiabilities, items::TOTAL_NON_CURRENT_LIABILITIES),
    (BalanceSheetCategory::Equity, items::TOTAL_EQUITY),
];

const INCOME_STATEMENT_SUMMARY: [(IncomeStatementCategory, &str); 2] = [
    (IncomeStatementCategory::Revenue, items::TOTAL_REVENUE),
    (IncomeStatementCategory::Profit, items::NET_INCOME),
];

const CASH_FLOW_SUMMARY: [(CashFlowCategory, &str); 3] = [
    (CashFlowCategory::OperatingActivities, items::NET_CASH_OPERATING),
    (CashFlowCategory::InvestingActivities, items::NET_CASH_INVESTING),
    (CashFlowCategory::FinancingActivities, items::NET_CASH_FINANCING),
];

const SUMMARY_RATIO_CATEGORIES: [RatioCategory; 3] = [
    RatioCategory::Liquidity,
    RatioCategory::Solvency,
    RatioCategory::Profitability,
];

fn write_block<'a>(
    out: &mut String,
    heading: &str,
    lines: impl IntoIterator<Item = (&'a str, Option<f64>)>,
) {
    let present: Vec<(&str, f64)> = lines
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
    if present.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", heading);
    for (name, value) in present {
        let _ = writeln!(out, "- {}: {}", name, value);
    }
}

fn latest_year_summary(data: &ExtractionResult, year: FinancialYear) -> String {
    let mut out = String::new();
    let years: Vec<String> = data.years.iter().map(|y| y.to_string()).collect();
    let _ = writeln!(out, "Years: {}", years.join(", "));
    let _ = writeln!(out, "\nData for {}:", year);

    write_block(
        &mut out,
        "Balance Sheet Summary",
        BALANCE_SHEET_SUMMARY
            .iter()
            .map(|(category, item)| (*item, data.balance_sheet_value(year, *category, item))),
    );
    write_block(
        &mut out,
        "Income Statement Summary",
        INCOME_STATEMENT_SUMMARY
            .iter()
            .map(|(category, item)| (*item, data.income_statement_value(year, *category, item))),
    );
    write_block(
        &mut out,
        "Cash Flow Summary",
        CASH_FLOW_SUMMARY
            .iter()
            .map(|(category, item)| (*item, data.cash_flow_value(year, *category, item))),
    );
    write_block(
        &mut out,
        "Key Financial Ratios",
        Ratio::ALL
            .iter()
            .filter(|ratio| SUMMARY_RATIO_CATEGORIES.contains(&ratio.category()))
            .map(|ratio| (ratio.label(), data.ratio(year, *ratio))),
    );

    out
}

/// Prompt asking for a five-section credit memo about `document_text`.
///
/// When `data` lists any years, a summary of the latest year's non-null
/// totals and ratios is included ahead of the instructions.
pub fn build_memo_prompt(document_text: &str, data: Option<&ExtractionResult>) -> String {
    let mut prompt = format!(
        "You are a professional financial analyst tasked with creating a credit memo based on the following financial document.\n\n\
         DOCUMENT:\n{}\n",
        truncate_chars(document_text, MEMO_DOCUMENT_CHARS)
    );

    if let Some((data, year)) = data.and_then(|d| d.latest_year().map(|y| (d, y))) {
        prompt.push_str("\n\nEXTRACTED FINANCIAL DATA:\n");
        prompt.push_str(&latest_year_summary(data, year));
    }

    prompt.push('\n');
    prompt.push_str(MEMO_INSTRUCTIONS.trim_end());
    prompt.push('\n');
    prompt
}

/// Drafts a credit memo. Completion errors are returned to the caller.
pub fn generate_credit_memo<C>(
    client: &C,
    document_text: &str,
    data: Option<&ExtractionResult>,
    provider: Option<&str>,
) -> Result<String>
where
    C: TextCompletion + ?Sized,
{
    info!(
        "Generating credit memo for {} characters of document text",
        document_text.len()
    );
    let prompt = build_memo_prompt(document_text, data);
    let memo = client.complete(&prompt, provider)?;
    info!("Generated credit memo with length {} characters", memo.len());
    Ok(memo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::extractor::FinancialDataExtractor;
    use crate::ExtractorConfig;

    fn sample_result() -> ExtractionResult {
        let text = "Fiscal 2021 and 2022.\n\
                    Total Current Assets 1,500\n\
                    Total Current Liabilities 500\n\
                    Total Revenue 10,000\n\
                    Net Income 1,000\n\
                    Net Cash from Operating Activities 2,000\n";
        let config = ExtractorConfig {
            current_year: Some(2023),
            ..ExtractorConfig::default()
        };
        FinancialDataExtractor::with_config(text, config).extract_via_patterns()
    }

    #[test]
    fn test_prompt_without_data() {
        let prompt = build_memo_prompt("Annual report text", None);
        assert!(prompt.contains("DOCUMENT:\nAnnual report text"));
        assert!(!prompt.contains("EXTRACTED FINANCIAL DATA"));
        assert!(prompt.contains("5. Final Credit Recommendation"));
    }

    #[test]
    fn test_prompt_summarizes_latest_year() {
        let data = sample_result();
        let prompt = build_memo_prompt("doc", Some(&data));

        assert!(prompt.contains("Years: 2021, 2022"));
        assert!(prompt.contains("Data for 2022:"));
        assert!(prompt.contains("- Total Current Assets: 1500"));
        assert!(prompt.contains("- Net Income: 1000"));
        assert!(prompt.contains("- Net Cash from Operating Activities: 2000"));
        assert!(prompt.contains("- Current Ratio: 3"));
        assert!(prompt.contains("- Net Profit Margin: 10"));
        // null values are left out
        assert!(!prompt.contains("Total Equity"));
        assert!(!prompt.contains("Quick Ratio"));
    }

    #[test]
    fn test_prompt_skips_summary_without_years() {
        let prompt = build_memo_prompt("doc", Some(&ExtractionResult::empty()));
        assert!(!prompt.contains("EXTRACTED FINANCIAL DATA"));
    }

    #[test]
    fn test_document_is_truncated() {
        let text = format!("{}END", "x".repeat(MEMO_DOCUMENT_CHARS));
        let prompt = build_memo_prompt(&text, None);
        assert!(!prompt.contains("END"));
    }

    struct Echo;

    impl TextCompletion for Echo {
        fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
            match provider {
                Some("broken") => Err(ExtractionError::CompletionFailed {
                    provider: "broken".to_string(),
                    message: "offline".to_string(),
                }),
                _ => Ok(format!("MEMO ({} chars of prompt)", prompt.len())),
            }
        }
    }

    #[test]
    fn test_generate_credit_memo() {
        let memo = generate_credit_memo(&Echo, "doc", None, None).unwrap();
        assert!(memo.starts_with("MEMO"));
        assert!(generate_credit_memo(&Echo, "doc", None, Some("broken")).is_err());
    }
}
