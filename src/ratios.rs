//! Derived ratios. Every formula follows one null policy: a missing or zero
//! denominator, or a missing numerator, yields `None` rather than `0`,
//! infinity or an error. The one exception is total liabilities, where a
//! missing component counts as zero.

use crate::schema::{
    section_value, BalanceSheet, BalanceSheetCategory as Bs, FinancialYear, IncomeStatement,
    IncomeStatementCategory as Is, Ratio, RatioCategory, RatioSet, StatementCategory,
};
use crate::taxonomy::items;
use std::collections::BTreeMap;

/// Divides, returning `None` for a missing operand or a zero denominator.
pub fn safe_divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let numerator = numerator?;
    let denominator = denominator?;
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

fn percentage(value: Option<f64>) -> Option<f64> {
    value.map(|v| v * 100.0)
}

/// The operands one year's ratios are computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatioInputs {
    pub cash: Option<f64>,
    pub accounts_receivable: Option<f64>,
    pub inventory: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub total_non_current_assets: Option<f64>,
    pub total_current_liabilities: Option<f64>,
    pub total_non_current_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_revenue: Option<f64>,
    pub cost_of_goods_sold: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub interest_expense: Option<f64>,
    pub net_income: Option<f64>,
}

impl RatioInputs {
    pub fn from_statements(
        balance_sheet: &BalanceSheet,
        income_statement: &IncomeStatement,
        year: FinancialYear,
    ) -> Self {
        let bs = |category, item| section_value(balance_sheet, year, category, item);
        let is = |category, item| section_value(income_statement, year, category, item);

        Self {
            cash: bs(Bs::CurrentAssets, items::CASH_AND_EQUIVALENTS),
            accounts_receivable: bs(Bs::CurrentAssets, items::ACCOUNTS_RECEIVABLE),
            inventory: bs(Bs::CurrentAssets, items::INVENTORY),
            total_current_assets: bs(Bs::CurrentAssets, items::TOTAL_CURRENT_ASSETS),
            total_non_current_assets: bs(Bs::NonCurrentAssets, items::TOTAL_NON_CURRENT_ASSETS),
            total_current_liabilities: bs(Bs::CurrentLiabilities, items::TOTAL_CURRENT_LIABILITIES),
            total_non_current_liabilities: bs(
                Bs::NonCurrentLiabilities,
                items::TOTAL_NON_CURRENT_LIABILITIES,
            ),
            total_equity: bs(Bs::Equity, items::TOTAL_EQUITY),
            total_revenue: is(Is::Revenue, items::TOTAL_REVENUE),
            cost_of_goods_sold: is(Is::Expenses, items::COST_OF_GOODS_SOLD),
            gross_profit: is(Is::Expenses, items::GROSS_PROFIT),
            operating_income: is(Is::Profit, items::OPERATING_INCOME),
            interest_expense: is(Is::Profit, items::INTEREST_EXPENSE),
            net_income: is(Is::Profit, items::NET_INCOME),
        }
    }

    /// A company can legitimately carry no non-current debt, so absent
    /// liability totals count as zero here.
    pub fn total_liabilities(&self) -> f64 {
        self.total_current_liabilities.unwrap_or(0.0)
            + self.total_non_current_liabilities.unwrap_or(0.0)
    }

    /// Both asset totals are required.
    pub fn total_assets(&self) -> Option<f64> {
        Some(self.total_current_assets? + self.total_non_current_assets?)
    }

    pub fn compute(&self, ratio: Ratio) -> Option<f64> {
        match ratio {
            Ratio::CurrentRatio => {
                safe_divide(self.total_current_assets, self.total_current_liabilities)
            }
            Ratio::QuickRatio => {
                let quick_assets = Some(self.total_current_assets? - self.inventory?);
                safe_divide(quick_assets, self.total_current_liabilities)
            }
            Ratio::CashRatio => safe_divide(self.cash, self.total_current_liabilities),
            Ratio::DebtToEquity => safe_divide(Some(self.total_liabilities()), self.total_equity),
            Ratio::DebtToAssets => safe_divide(Some(self.total_liabilities()), self.total_assets()),
            Ratio::InterestCoverage => safe_divide(self.operating_income, self.interest_expense),
            Ratio::GrossMargin => percentage(safe_divide(self.gross_profit, self.total_revenue)),
            Ratio::OperatingMargin => {
                percentage(safe_divide(self.operating_income, self.total_revenue))
            }
            Ratio::NetProfitMargin => percentage(safe_divide(self.net_income, self.total_revenue)),
            Ratio::ReturnOnAssets => safe_divide(self.net_income, self.total_assets()),
            Ratio::ReturnOnEquity => safe_divide(self.net_income, self.total_equity),
            Ratio::AssetTurnover => safe_divide(self.total_revenue, self.total_assets()),
            Ratio::InventoryTurnover => safe_divide(self.cost_of_goods_sold, self.inventory),
            Ratio::ReceivablesTurnover => {
                safe_divide(self.total_revenue, self.accounts_receivable)
            }
        }
    }
}

/// Computes every ratio for every year. Each year gets all four categories.
pub fn compute_ratios(
    balance_sheet: &BalanceSheet,
    income_statement: &IncomeStatement,
    years: &[FinancialYear],
) -> RatioSet {
    let mut ratios = RatioSet::new();

    for year in years {
        let inputs = RatioInputs::from_statements(balance_sheet, income_statement, *year);
        let mut by_category: BTreeMap<RatioCategory, BTreeMap<Ratio, Option<f64>>> =
            RatioCategory::ALL
                .iter()
                .map(|category| (*category, BTreeMap::new()))
                .collect();

        for ratio in Ratio::ALL {
            by_category
                .entry(ratio.category())
                .or_default()
                .insert(*ratio, inputs.compute(*ratio));
        }

        ratios.insert(*year, by_category);
    }

    ratios
}
