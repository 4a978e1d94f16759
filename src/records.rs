//! Year-scoped rows for persisting an [`ExtractionResult`].

use crate::schema::{
    ExtractionResult, FinancialYear, Ratio, RatioCategory, StatementCategory, StatementKind,
    StatementSection,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One stored value: a line item or a ratio for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub year: FinancialYear,
    pub statement: StatementKind,
    pub category: String,
    pub name: String,
    pub value: f64,
}

fn flatten_section<C: StatementCategory>(
    section: &StatementSection<C>,
    year: FinancialYear,
    statement: StatementKind,
    out: &mut Vec<FinancialRecord>,
) {
    let Some(categories) = section.get(&year) else {
        return;
    };
    for (category, values) in categories {
        for (name, value) in values {
            if let Some(value) = value {
                out.push(FinancialRecord {
                    year,
                    statement,
                    category: category.label().to_string(),
                    name: name.clone(),
                    value: *value,
                });
            }
        }
    }
}

/// Rows for every non-null value, grouped by year in ascending order.
pub fn flatten(result: &ExtractionResult) -> Vec<FinancialRecord> {
    let mut records = Vec::new();

    for year in &result.years {
        flatten_section(&result.balance_sheet, *year, StatementKind::BalanceSheet, &mut records);
        flatten_section(
            &result.income_statement,
            *year,
            StatementKind::IncomeStatement,
            &mut records,
        );
        flatten_section(&result.cash_flow, *year, StatementKind::CashFlow, &mut records);

        if let Some(categories) = result.ratios.get(year) {
            for (category, ratios) in categories {
                for (ratio, value) in ratios {
                    if let Some(value) = value {
                        records.push(FinancialRecord {
                            year: *year,
                            statement: StatementKind::Ratios,
                            category: category.label().to_string(),
                            name: ratio.label().to_string(),
                            value: *value,
                        });
                    }
                }
            }
        }
    }

    records
}

fn insert_row<C: StatementCategory>(section: &mut StatementSection<C>, record: &FinancialRecord) {
    match C::from_label(&record.category) {
        Some(category) => {
            section
                .entry(record.year)
                .or_default()
                .entry(category)
                .or_default()
                .insert(record.name.clone(), Some(record.value));
        }
        None => warn!(
            "Skipping stored row with unknown category '{}' ({})",
            record.category, record.name
        ),
    }
}

/// Rebuilds a sparse result from stored rows.
///
/// Only stored values are present. Every year in `years` has an entry in
/// every section, even when no rows exist for it; rows for other years are
/// ignored.
pub fn assemble(years: &[FinancialYear], records: &[FinancialRecord]) -> ExtractionResult {
    let years: Vec<FinancialYear> = years.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let mut result = ExtractionResult {
        years: years.clone(),
        ..ExtractionResult::default()
    };

    for year in &years {
        result.balance_sheet.insert(*year, BTreeMap::new());
        result.income_statement.insert(*year, BTreeMap::new());
        result.cash_flow.insert(*year, BTreeMap::new());
        result.ratios.insert(*year, BTreeMap::new());
    }

    for record in records {
        if !result.years.contains(&record.year) {
            continue;
        }
        match record.statement {
            StatementKind::BalanceSheet => insert_row(&mut result.balance_sheet, record),
            StatementKind::IncomeStatement => insert_row(&mut result.income_statement, record),
            StatementKind::CashFlow => insert_row(&mut result.cash_flow, record),
            StatementKind::Ratios => {
                match (
                    RatioCategory::from_label(&record.category),
                    Ratio::from_label(&record.name),
                ) {
                    (Some(category), Some(ratio)) if ratio.category() == category => {
                        result
                            .ratios
                            .entry(record.year)
                            .or_default()
                            .entry(category)
                            .or_default()
                            .insert(ratio, Some(record.value));
                    }
                    _ => warn!(
                        "Skipping stored ratio row '{}' in '{}'",
                        record.name, record.category
                    ),
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BalanceSheetCategory, IncomeStatementCategory};
    use crate::taxonomy::items;
    use crate::{ExtractorConfig, FinancialDataExtractor};

    fn extracted() -> ExtractionResult {
        let text = "Report for 2022\n\
                    Total Current Assets 1,200\n\
                    Total Current Liabilities 600\n\
                    Total Revenue 4,000\n";
        let config = ExtractorConfig {
            current_year: Some(2023),
            ..ExtractorConfig::default()
        };
        FinancialDataExtractor::with_config(text, config).extract_via_patterns()
    }

    #[test]
    fn test_flatten_skips_nulls() {
        let records = flatten(&extracted());
        assert!(records.iter().all(|r| r.year == 2022));

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&items::TOTAL_CURRENT_ASSETS));
        assert!(names.contains(&items::TOTAL_REVENUE));
        assert!(names.contains(&"Current Ratio"));
        assert!(!names.contains(&items::INVENTORY));

        let ratio = records
            .iter()
            .find(|r| r.name == "Current Ratio")
            .unwrap();
        assert_eq!(ratio.statement, StatementKind::Ratios);
        assert_eq!(ratio.category, "Liquidity");
        assert_eq!(ratio.value, 2.0);
    }

    #[test]
    fn test_assemble_restores_stored_values() {
        let original = extracted();
        let rebuilt = assemble(&original.years, &flatten(&original));

        assert_eq!(rebuilt.years, vec![2022]);
        assert_eq!(
            rebuilt.balance_sheet_value(
                2022,
                BalanceSheetCategory::CurrentAssets,
                items::TOTAL_CURRENT_ASSETS
            ),
            Some(1200.0)
        );
        assert_eq!(
            rebuilt.income_statement_value(2022, IncomeStatementCategory::Revenue, items::TOTAL_REVENUE),
            Some(4000.0)
        );
        assert_eq!(rebuilt.ratio(2022, Ratio::CurrentRatio), Some(2.0));
        // sparse: nulls were never stored
        assert!(!rebuilt.balance_sheet[&2022][&BalanceSheetCategory::CurrentAssets]
            .contains_key(items::INVENTORY));
        assert_eq!(flatten(&rebuilt), flatten(&original));
    }

    #[test]
    fn test_assemble_keeps_empty_years_and_skips_bad_rows() {
        let rows = vec![
            FinancialRecord {
                year: 2021,
                statement: StatementKind::BalanceSheet,
                category: "Not A Category".to_string(),
                name: "Cash".to_string(),
                value: 1.0,
            },
            FinancialRecord {
                year: 2021,
                statement: StatementKind::Ratios,
                category: "Solvency".to_string(),
                name: "Current Ratio".to_string(),
                value: 1.0,
            },
            FinancialRecord {
                year: 1999,
                statement: StatementKind::CashFlow,
                category: "Summary".to_string(),
                name: "Net Change in Cash".to_string(),
                value: 5.0,
            },
        ];

        let result = assemble(&[2022, 2021], &rows);
        assert_eq!(result.years, vec![2021, 2022]);
        assert!(result.balance_sheet[&2021].is_empty());
        assert!(result.ratios[&2021].is_empty());
        assert!(result.cash_flow[&2022].is_empty());
        assert!(!result.cash_flow.contains_key(&1999));
    }
}
