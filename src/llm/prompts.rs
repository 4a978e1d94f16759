// Prompts for statement extraction and credit memo drafting

use crate::schema::{Ratio, RatioCategory, StatementCategory};
use crate::taxonomy::{StatementTaxonomy, Taxonomy};
use serde_json::{json, Map, Value};

/// Characters of document text sent with an extraction request.
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 10_000;

pub const EXTRACTION_INSTRUCTIONS: &str = r#"
You are a Financial Statement Extraction Specialist.

## YOUR MISSION
Read the financial statement text below and extract the balance sheet, income statement,
cash flow statement and key ratios for every fiscal year the statements report.

## CRITICAL EXTRACTION RULES

### 1. Years
- `years` lists every fiscal year that has a column or section in the statements, ascending.
- Use four-digit integers (e.g. 2022), never strings or date ranges.
- Ignore years that only appear in footnotes, addresses or boilerplate.

### 2. Structure
- Every section is keyed by year, then category, then line item, exactly as in the template.
- Use the category and line item names from the template VERBATIM.
- Do NOT add categories or line items that are not in the template.

### 3. Values
✅ DO:
- Report plain numbers without currency symbols or thousands separators (1234567.89).
- Report negative figures (shown in parentheses or with a minus sign) as negative numbers.
- Use the same unit the document uses; do not rescale "in thousands" figures.

❌ DO NOT:
- Guess or calculate a line item that is not printed in the document.
- Use 0 for a missing value. A value that is not reported MUST be null.

### 4. Ratios
- Margins (Gross Margin, Operating Margin, Net Profit Margin) are percentages (20.0 means 20%).
- Other ratios are plain multiples (Current Ratio 2.0).
- Use null when an operand is missing or the denominator is zero.

## OUTPUT FORMAT
Return ONLY a single JSON object matching the template. No prose, no markdown fences.
"#;

pub const MEMO_INSTRUCTIONS: &str = r#"
Please analyze this document and create a comprehensive credit memo that includes:

1. Executive Summary
2. Financial Highlights (Revenue, EBITDA, Cash Flow, etc.)
3. Key Ratios (Debt/Equity, Interest Coverage, etc.)
4. Risk Analysis & Commentary
5. Final Credit Recommendation

Format your response as a well-structured credit memo that could be presented to a credit committee.
Use the extracted financial data provided above to enhance your analysis, but also incorporate any additional insights from the document text.
"#;

/// The first `budget` characters of `text`, cut on a character boundary.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn section_template<C: StatementCategory>(taxonomy: &StatementTaxonomy<C>) -> Value {
    let mut categories = Map::new();
    for entry in &taxonomy.categories {
        let items: Map<String, Value> = entry
            .items
            .iter()
            .map(|item| (item.clone(), Value::Null))
            .collect();
        categories.insert(entry.category.label().to_string(), Value::Object(items));
    }
    json!({ "YYYY": categories })
}

fn ratio_template() -> Value {
    let mut categories = Map::new();
    for category in RatioCategory::ALL {
        let ratios: Map<String, Value> = Ratio::ALL
            .iter()
            .filter(|r| r.category() == *category)
            .map(|r| (r.label().to_string(), Value::Null))
            .collect();
        categories.insert(category.label().to_string(), Value::Object(ratios));
    }
    json!({ "YYYY": categories })
}

/// The JSON skeleton the model must fill in, one `"YYYY"` block per year.
pub fn extraction_template(taxonomy: &Taxonomy) -> Value {
    json!({
        "years": ["YYYY"],
        "balance_sheet": section_template(&taxonomy.balance_sheet),
        "income_statement": section_template(&taxonomy.income_statement),
        "cash_flow": section_template(&taxonomy.cash_flow),
        "ratios": ratio_template(),
    })
}

pub fn build_extraction_prompt(text: &str, taxonomy: &Taxonomy, char_budget: usize) -> String {
    let template = serde_json::to_string_pretty(&extraction_template(taxonomy))
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "{}\n\
         ## JSON TEMPLATE\n\
         Replace each \"YYYY\" key with a reported year and repeat the block for every year.\n\
         {}\n\n\
         ## FINANCIAL STATEMENT TEXT\n\
         {}\n",
        EXTRACTION_INSTRUCTIONS.trim(),
        template,
        truncate_chars(text, char_budget)
    )
}
