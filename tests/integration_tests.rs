use proptest::prelude::*;
use statement_extractor::*;
use std::cell::RefCell;

const ANNUAL_REPORT: &str = "\
ACME Manufacturing Ltd
Consolidated Financial Statements for the year ended 31 December 2022

Statement of Financial Position (2022)
Cash and Cash Equivalents 300
Accounts Receivable 400
Inventory 250
Total Current Assets 1,000
Property, Plant and Equipment 2,500
Total Non-Current Assets 3,000
Accounts Payable 350
Total Current Liabilities 500
Long-term Debt 1,200
Total Non-Current Liabilities 1,500
Total Equity 2,000

Statement of Profit or Loss
Total Revenue 8,000
Cost of Goods Sold 5,000
Gross Profit 3,000
Operating Income 1,000
Interest Expense 200
Net Income 640.5

Statement of Cash Flows
Net Cash from Operating Activities 900
Net Cash from Investing Activities 400
Net Cash from Financing Activities 100
";

fn config_as_of(year: FinancialYear) -> ExtractorConfig {
    ExtractorConfig {
        current_year: Some(year),
        ..ExtractorConfig::default()
    }
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {}, got None", expected));
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_minimal_statement() {
    let text = "Year ended 2022. Total Current Assets 1,200. Total Current Liabilities 600.";
    let result = FinancialDataExtractor::with_config(text, config_as_of(2024)).extract_via_patterns();

    assert_eq!(result.years, vec![2022]);
    assert_eq!(
        result.balance_sheet_value(2022, BalanceSheetCategory::CurrentAssets, items::TOTAL_CURRENT_ASSETS),
        Some(1200.0)
    );
    assert_eq!(result.ratio(2022, Ratio::CurrentRatio), Some(2.0));
}

#[test]
fn test_full_annual_report() {
    let result =
        FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023)).extract_via_patterns();

    assert_eq!(result.years, vec![2022]);
    assert_eq!(
        result.income_statement_value(2022, IncomeStatementCategory::Profit, items::NET_INCOME),
        Some(640.5)
    );
    assert_eq!(
        result.cash_flow_value(
            2022,
            CashFlowCategory::OperatingActivities,
            items::NET_CASH_OPERATING
        ),
        Some(900.0)
    );

    assert_close(result.ratio(2022, Ratio::CurrentRatio), 2.0);
    assert_close(result.ratio(2022, Ratio::QuickRatio), 1.5);
    assert_close(result.ratio(2022, Ratio::CashRatio), 0.6);
    assert_close(result.ratio(2022, Ratio::DebtToEquity), 1.0);
    assert_close(result.ratio(2022, Ratio::DebtToAssets), 0.5);
    assert_close(result.ratio(2022, Ratio::InterestCoverage), 5.0);
    assert_close(result.ratio(2022, Ratio::GrossMargin), 37.5);
    assert_close(result.ratio(2022, Ratio::NetProfitMargin), 8.00625);
    assert_close(result.ratio(2022, Ratio::AssetTurnover), 2.0);
    assert_close(result.ratio(2022, Ratio::InventoryTurnover), 20.0);
    assert_close(result.ratio(2022, Ratio::ReceivablesTurnover), 20.0);
}

#[test]
fn test_every_section_is_dense() {
    let result =
        FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023)).extract_via_patterns();
    let taxonomy = Taxonomy::default();

    for (category, item) in taxonomy.balance_sheet.iter() {
        assert!(result.balance_sheet[&2022][&category].contains_key(item));
    }
    for (category, item) in taxonomy.income_statement.iter() {
        assert!(result.income_statement[&2022][&category].contains_key(item));
    }
    for (category, item) in taxonomy.cash_flow.iter() {
        assert!(result.cash_flow[&2022][&category].contains_key(item));
    }
    assert_eq!(result.ratios[&2022].len(), RatioCategory::ALL.len());
}

#[test]
fn test_future_years_and_year_cap() {
    let text = "Comparatives 2017 2018 2019 2020 2021. Outlook for 2030.";
    let result = FinancialDataExtractor::with_config(text, config_as_of(2024)).extract_via_patterns();
    assert_eq!(result.years, vec![2019, 2020, 2021]);

    let only_future = FinancialDataExtractor::with_config("Plan for 2030", config_as_of(2024));
    assert!(only_future.extract_via_patterns().years.is_empty());
}

#[test]
fn test_missing_values_are_null_not_zero() {
    let text = "Fiscal 2022 summary: Total Revenue 1,000";
    let result = FinancialDataExtractor::with_config(text, config_as_of(2023)).extract_via_patterns();

    assert_eq!(
        result.balance_sheet_value(2022, BalanceSheetCategory::Equity, items::TOTAL_EQUITY),
        None
    );
    assert_eq!(result.ratio(2022, Ratio::NetProfitMargin), None);
    assert_eq!(result.ratio(2022, Ratio::CurrentRatio), None);
}

#[test]
fn test_zero_denominator_is_null() {
    let text = "2022 Total Current Assets 500 Total Current Liabilities 0";
    let result = FinancialDataExtractor::with_config(text, config_as_of(2023)).extract_via_patterns();
    assert_eq!(
        result.balance_sheet_value(
            2022,
            BalanceSheetCategory::CurrentLiabilities,
            items::TOTAL_CURRENT_LIABILITIES
        ),
        Some(0.0)
    );
    assert_eq!(result.ratio(2022, Ratio::CurrentRatio), None);
}

#[test]
fn test_labels_with_regex_metacharacters() {
    let mut config = config_as_of(2023);
    config
        .taxonomy
        .income_statement
        .push_item(IncomeStatementCategory::Expenses, "R&D (Research)");

    let text = "FY 2022\nR&D (Research) 1,250.75\n";
    let result = FinancialDataExtractor::with_config(text, config).extract_via_patterns();
    assert_eq!(
        result.income_statement_value(2022, IncomeStatementCategory::Expenses, "R&D (Research)"),
        Some(1250.75)
    );
}

#[test]
fn test_empty_and_yearless_text() {
    for text in ["", "No figures in this document at all."] {
        let result = FinancialDataExtractor::new(text).extract_via_patterns();
        assert_eq!(result, ExtractionResult::empty());
    }
}

#[test]
fn test_pattern_extraction_is_deterministic() {
    let extractor = FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023));
    let first = extractor.extract_via_patterns();
    let second = extractor.extract_via_patterns();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

struct AlwaysFails;

impl TextCompletion for AlwaysFails {
    fn complete(&self, _prompt: &str, provider: Option<&str>) -> Result<String> {
        Err(ExtractionError::CompletionFailed {
            provider: provider.unwrap_or("google").to_string(),
            message: "service unavailable".to_string(),
        })
    }
}

#[test]
fn test_llm_failure_returns_pattern_result() {
    let extractor = FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023));
    assert_eq!(
        extractor.extract_via_llm(&AlwaysFails, None),
        extractor.extract_via_patterns()
    );
    assert_eq!(
        extractor.extract_via_llm(&AlwaysFails, Some("openai")),
        extractor.extract_via_patterns()
    );
}

/// Answers with an incomplete object from the default provider and a valid
/// one from "openai", recording every provider it was asked for.
struct TwoProviders {
    calls: RefCell<Vec<Option<String>>>,
}

impl TextCompletion for TwoProviders {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
        assert!(prompt.contains("## JSON TEMPLATE"));
        self.calls.borrow_mut().push(provider.map(str::to_string));
        match provider {
            Some("openai") => Ok(r#"```json
{
  "years": [2021, 2022],
  "balance_sheet": {
    "2022": {
      "Current Assets": { "Total Current Assets": 1500 },
      "Current Liabilities": { "Total Current Liabilities": 1000 }
    }
  },
  "income_statement": {},
  "cash_flow": {}
}
```"#
                .to_string()),
            _ => Ok(r#"{"years": [2022], "balance_sheet": {}}"#.to_string()),
        }
    }

    fn default_provider(&self) -> Option<&str> {
        Some("google")
    }

    fn supports(&self, provider: &str) -> bool {
        matches!(provider, "google" | "openai")
    }
}

#[test]
fn test_schema_violation_retries_with_openai() {
    let client = TwoProviders {
        calls: RefCell::new(Vec::new()),
    };
    let extractor = FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023));
    let result = extractor.extract_via_llm(&client, None);

    assert_eq!(result.years, vec![2021, 2022]);
    assert_eq!(result.ratio(2022, Ratio::CurrentRatio), Some(1.5));
    assert_eq!(result.ratio(2021, Ratio::CurrentRatio), None);
    assert_eq!(
        *client.calls.borrow(),
        vec![None, Some("openai".to_string())]
    );
}

#[test]
fn test_retry_disabled_falls_back() {
    let client = TwoProviders {
        calls: RefCell::new(Vec::new()),
    };
    let config = ExtractorConfig {
        retry_provider: None,
        ..config_as_of(2023)
    };
    let extractor = FinancialDataExtractor::with_config(ANNUAL_REPORT, config);
    assert_eq!(
        extractor.extract_via_llm(&client, None),
        extractor.extract_via_patterns()
    );
    assert_eq!(client.calls.borrow().len(), 1);
}

#[test]
fn test_result_json_shape() {
    let result =
        FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023)).extract_via_patterns();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["years"], serde_json::json!([2022]));
    assert_eq!(
        value["balance_sheet"]["2022"]["Current Assets"]["Total Current Assets"],
        serde_json::json!(1000.0)
    );
    assert!(value["balance_sheet"]["2022"]["Current Assets"]["Prepaid Expenses"].is_null());
    assert_eq!(
        value["ratios"]["2022"]["Liquidity"]["Current Ratio"],
        serde_json::json!(2.0)
    );

    let back: ExtractionResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_records_and_memo_from_extraction() {
    let result =
        FinancialDataExtractor::with_config(ANNUAL_REPORT, config_as_of(2023)).extract_via_patterns();

    let rows = flatten(&result);
    assert!(rows.iter().all(|row| row.year == 2022));
    assert_eq!(assemble(&result.years, &rows).ratio(2022, Ratio::CurrentRatio), Some(2.0));

    let prompt = build_memo_prompt(ANNUAL_REPORT, Some(&result));
    assert!(prompt.contains("Data for 2022:"));
    assert!(prompt.contains("- Total Equity: 2000"));
    assert!(generate_credit_memo(&AlwaysFails, ANNUAL_REPORT, Some(&result), None).is_err());
}

const LABELS: [&str; 8] = [
    items::TOTAL_CURRENT_ASSETS,
    items::TOTAL_CURRENT_LIABILITIES,
    items::INVENTORY,
    items::TOTAL_EQUITY,
    items::TOTAL_REVENUE,
    items::NET_INCOME,
    items::NET_CASH_OPERATING,
    "R&D (Research)",
];

/// Text mixing years, known labels and noise in arbitrary order.
fn statement_like_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            1900i32..2100,
            prop::sample::select(LABELS.to_vec()),
            "[a-zA-Z€£ ,.()0-9\n]{0,16}",
        ),
        0..20,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(year, label, noise)| format!("{} {} {}", year, label, noise))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn assert_well_formed(result: &ExtractionResult) {
    assert!(result.years.len() <= 3);
    assert!(result.years.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(result.years.iter().all(|year| *year <= 2023));

    assert!(result.balance_sheet.keys().eq(result.years.iter()));
    assert!(result.income_statement.keys().eq(result.years.iter()));
    assert!(result.cash_flow.keys().eq(result.years.iter()));
    assert!(result.ratios.keys().eq(result.years.iter()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_arbitrary_text_never_fails(text in "\\PC*") {
        let extractor = FinancialDataExtractor::with_config(&text, config_as_of(2023));
        let result = extractor.extract_via_patterns();
        assert_well_formed(&result);
        prop_assert_eq!(extractor.extract_via_llm(&AlwaysFails, None), result);
    }

    #[test]
    fn test_statement_like_text_is_well_formed(text in statement_like_text()) {
        let extractor = FinancialDataExtractor::with_config(&text, config_as_of(2023));
        let result = extractor.extract_via_patterns();
        assert_well_formed(&result);
        prop_assert_eq!(&result, &extractor.extract_via_patterns());
        prop_assert_eq!(extractor.extract_via_llm(&AlwaysFails, Some("openai")), result);
    }

    #[test]
    fn test_any_window_radius_is_safe(text in "[€a-z0-9 ]{0,40}", radius in 1usize..64) {
        let config = ExtractorConfig {
            context_radius: radius,
            ..config_as_of(2023)
        };
        assert_well_formed(&FinancialDataExtractor::with_config(&text, config).extract_via_patterns());
    }
}
