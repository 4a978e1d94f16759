//! Turning a model's reply into an [`ExtractionResult`].
//!
//! The reply may wrap its JSON in prose or markdown fences. The first balanced
//! object is decoded, checked for the required top-level shape, and then
//! projected onto the configured taxonomy so both extraction paths return the
//! same dense layout.

use crate::context::parse_amount;
use crate::error::{ExtractionError, Result};
use crate::ratios::compute_ratios;
use crate::schema::{
    ExtractionResult, FinancialYear, Ratio, RatioCategory, RatioSet, StatementCategory,
    StatementSection,
};
use crate::taxonomy::{StatementTaxonomy, Taxonomy};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const REQUIRED_KEYS: [&str; 4] = ["years", "balance_sheet", "income_statement", "cash_flow"];

/// Byte range of the first balanced `{ ... }` in `text`, ignoring braces
/// inside JSON strings.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

pub fn parse_response(response: &str) -> Result<Value> {
    let json = find_json_object(response).ok_or(ExtractionError::NoJsonFound)?;
    Ok(serde_json::from_str(json)?)
}

pub fn validate_schema(value: &Value) -> Result<()> {
    let object = value.as_object().ok_or_else(|| {
        ExtractionError::SchemaViolation("response is not a JSON object".to_string())
    })?;

    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(ExtractionError::SchemaViolation(format!(
                "missing required key '{}'",
                key
            )));
        }
    }

    if !object["years"].is_array() {
        return Err(ExtractionError::SchemaViolation(
            "'years' is not a list".to_string(),
        ));
    }

    for key in ["balance_sheet", "income_statement", "cash_flow"] {
        if !object[key].is_object() {
            return Err(ExtractionError::SchemaViolation(format!(
                "'{}' is not a mapping",
                key
            )));
        }
    }

    Ok(())
}

fn json_year(value: &Value) -> Option<FinancialYear> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| FinancialYear::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numbers pass through; numeric strings like `"$1,200"` are parsed; anything else is null.
fn json_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_start_matches('$').trim();
            parse_amount(cleaned)
        }
        _ => None,
    }
}

fn year_entry<'v>(section: &'v Value, year: FinancialYear) -> Option<&'v Value> {
    section.get(year.to_string())
}

fn normalize_section<C: StatementCategory>(
    section: &Value,
    years: &[FinancialYear],
    taxonomy: &StatementTaxonomy<C>,
) -> StatementSection<C> {
    let mut normalized = BTreeMap::new();

    for year in years {
        let reported = year_entry(section, *year);

        if let Some(Value::Object(categories)) = reported {
            for (label, items) in categories {
                match C::from_label(label) {
                    None => debug!("Dropping unknown category '{}' for {}", label, year),
                    Some(category) => {
                        if let Value::Object(items) = items {
                            for name in items.keys() {
                                if !taxonomy.contains(category, name) {
                                    debug!("Dropping unknown item '{}' in '{}'", name, label);
                                }
                            }
                        }
                    }
                }
            }
        }

        let mut categories = BTreeMap::new();
        for entry in &taxonomy.categories {
            let mut values = BTreeMap::new();
            for item in &entry.items {
                let value = reported
                    .and_then(|y| y.get(entry.category.label()))
                    .and_then(|c| c.get(item))
                    .and_then(json_amount);
                values.insert(item.clone(), value);
            }
            categories.insert(entry.category, values);
        }
        normalized.insert(*year, categories);
    }

    normalized
}

fn normalize_ratios(section: &Value, years: &[FinancialYear]) -> RatioSet {
    let mut ratios = RatioSet::new();

    for year in years {
        let reported = year_entry(section, *year);
        let mut by_category: BTreeMap<RatioCategory, BTreeMap<Ratio, Option<f64>>> =
            RatioCategory::ALL
                .iter()
                .map(|category| (*category, BTreeMap::new()))
                .collect();

        for ratio in Ratio::ALL {
            let value = reported
                .and_then(|y| y.get(ratio.category().label()))
                .and_then(|c| c.get(ratio.label()))
                .and_then(json_amount);
            by_category
                .entry(ratio.category())
                .or_default()
                .insert(*ratio, value);
        }

        ratios.insert(*year, by_category);
    }

    ratios
}

/// Projects a validated response onto the taxonomy.
///
/// Years are deduplicated and sorted; every listed year gets a dense entry
/// in every section. Ratios are taken from the response when it carries a
/// `ratios` mapping and recomputed from the statements otherwise.
pub fn normalize(value: &Value, taxonomy: &Taxonomy) -> ExtractionResult {
    let years: Vec<FinancialYear> = value["years"]
        .as_array()
        .map(|list| list.iter().filter_map(json_year).collect::<BTreeSet<_>>())
        .unwrap_or_default()
        .into_iter()
        .collect();

    let balance_sheet = normalize_section(&value["balance_sheet"], &years, &taxonomy.balance_sheet);
    let income_statement =
        normalize_section(&value["income_statement"], &years, &taxonomy.income_statement);
    let cash_flow = normalize_section(&value["cash_flow"], &years, &taxonomy.cash_flow);

    let ratios = match value.get("ratios") {
        Some(section @ Value::Object(_)) => normalize_ratios(section, &years),
        _ => {
            debug!("Response has no ratios mapping, computing ratios from statements");
            compute_ratios(&balance_sheet, &income_statement, &years)
        }
    };

    ExtractionResult {
        years,
        balance_sheet,
        income_statement,
        cash_flow,
        ratios,
    }
}
