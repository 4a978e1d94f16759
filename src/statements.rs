use crate::context::{ContextWindow, LabelMatcher, DEFAULT_CONTEXT_RADIUS};
use crate::schema::{
    BalanceSheet, CashFlowStatement, FinancialYear, IncomeStatement, StatementCategory,
    StatementSection,
};
use crate::taxonomy::{StatementTaxonomy, Taxonomy};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Scans one document for taxonomy line items, year by year.
///
/// Year windows and label matchers are computed once and reused across the
/// three statements, so one scanner should be used per document.
pub struct StatementScanner<'a> {
    windows: Vec<(FinancialYear, Option<&'a str>)>,
    matchers: HashMap<String, Option<LabelMatcher>>,
}

impl<'a> StatementScanner<'a> {
    pub fn new(text: &'a str, years: &[FinancialYear], context_radius: usize) -> Self {
        let context = ContextWindow::new(text, context_radius);
        let windows = years
            .iter()
            .map(|year| (*year, context.around_year(*year)))
            .collect();

        Self {
            windows,
            matchers: HashMap::new(),
        }
    }

    /// Produces a dense section: every year, category and item is present,
    /// with `None` where nothing was found.
    pub fn build<C: StatementCategory>(
        &mut self,
        taxonomy: &StatementTaxonomy<C>,
    ) -> StatementSection<C> {
        let Self { windows, matchers } = self;
        let mut section = BTreeMap::new();

        for (year, window) in windows.iter() {
            let mut categories = BTreeMap::new();
            let mut found = 0usize;

            for entry in &taxonomy.categories {
                let mut values = BTreeMap::new();
                for item in &entry.items {
                    let value = window.and_then(|context| {
                        matchers
                            .entry(item.clone())
                            .or_insert_with(|| LabelMatcher::new(item))
                            .as_ref()
                            .and_then(|matcher| matcher.find_value(context))
                    });
                    if value.is_some() {
                        found += 1;
                    }
                    values.insert(item.clone(), value);
                }
                categories.insert(entry.category, values);
            }

            debug!(
                "Year {}: found {} of {} items",
                year,
                found,
                taxonomy.item_count()
            );
            section.insert(*year, categories);
        }

        section
    }
}

/// The three statement sections extracted from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statements {
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
    pub cash_flow: CashFlowStatement,
}

pub fn build_statements(
    text: &str,
    years: &[FinancialYear],
    taxonomy: &Taxonomy,
    context_radius: usize,
) -> Statements {
    let mut scanner = StatementScanner::new(text, years, context_radius);
    Statements {
        balance_sheet: scanner.build(&taxonomy.balance_sheet),
        income_statement: scanner.build(&taxonomy.income_statement),
        cash_flow: scanner.build(&taxonomy.cash_flow),
    }
}

pub fn build_balance_sheet(years: &[FinancialYear], text: &str) -> BalanceSheet {
    StatementScanner::new(text, years, DEFAULT_CONTEXT_RADIUS)
        .build(&Taxonomy::default().balance_sheet)
}

pub fn build_income_statement(years: &[FinancialYear], text: &str) -> IncomeStatement {
    StatementScanner::new(text, years, DEFAULT_CONTEXT_RADIUS)
        .build(&Taxonomy::default().income_statement)
}

pub fn build_cash_flow(years: &[FinancialYear], text: &str) -> CashFlowStatement {
    StatementScanner::new(text, years, DEFAULT_CONTEXT_RADIUS)
        .build(&Taxonomy::default().cash_flow)
}
