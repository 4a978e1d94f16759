use crate::schema::{
    BalanceSheetCategory, CashFlowCategory, IncomeStatementCategory, StatementCategory,
};
use serde::{Deserialize, Serialize};

/// Line-item names the ratio engine reads. They must stay present in the
/// taxonomy for the corresponding ratios to be computable.
pub mod items {
    pub const CASH_AND_EQUIVALENTS: &str = "Cash and Cash Equivalents";
    pub const ACCOUNTS_RECEIVABLE: &str = "Accounts Receivable";
    pub const INVENTORY: &str = "Inventory";
    pub const TOTAL_CURRENT_ASSETS: &str = "Total Current Assets";
    pub const TOTAL_NON_CURRENT_ASSETS: &str = "Total Non-Current Assets";
    pub const TOTAL_CURRENT_LIABILITIES: &str = "Total Current Liabilities";
    pub const TOTAL_NON_CURRENT_LIABILITIES: &str = "Total Non-Current Liabilities";
    pub const TOTAL_EQUITY: &str = "Total Equity";

    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const COST_OF_GOODS_SOLD: &str = "Cost of Goods Sold";
    pub const GROSS_PROFIT: &str = "Gross Profit";
    pub const OPERATING_INCOME: &str = "Operating Income";
    pub const INTEREST_EXPENSE: &str = "Interest Expense";
    pub const NET_INCOME: &str = "Net Income";

    pub const NET_CASH_OPERATING: &str = "Net Cash from Operating Activities";
    pub const NET_CASH_INVESTING: &str = "Net Cash from Investing Activities";
    pub const NET_CASH_FINANCING: &str = "Net Cash from Financing Activities";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItems<C> {
    pub category: C,
    pub items: Vec<String>,
}

/// The ordered category → line-item layout of one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementTaxonomy<C> {
    pub categories: Vec<CategoryItems<C>>,
}

impl<C: StatementCategory> StatementTaxonomy<C> {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    pub fn with(mut self, category: C, items: &[&str]) -> Self {
        for item in items {
            self.push_item(category, *item);
        }
        self
    }

    pub fn items(&self, category: C) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: C, item: &str) -> bool {
        self.items(category).iter().any(|i| i == item)
    }

    /// Every (category, item) pair in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (C, &str)> + '_ {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter().map(move |item| (c.category, item.as_str())))
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Adds an item to a category, creating the category entry if needed.
    pub fn push_item(&mut self, category: C, item: impl Into<String>) {
        let item = item.into();
        match self.categories.iter_mut().find(|c| c.category == category) {
            Some(entry) => {
                if !entry.items.contains(&item) {
                    entry.items.push(item);
                }
            }
            None => self.categories.push(CategoryItems {
                category,
                items: vec![item],
            }),
        }
    }
}

impl<C: StatementCategory> Default for StatementTaxonomy<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed line-item vocabulary for all three statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub balance_sheet: StatementTaxonomy<BalanceSheetCategory>,
    pub income_statement: StatementTaxonomy<IncomeStatementCategory>,
    pub cash_flow: StatementTaxonomy<CashFlowCategory>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            balance_sheet: default_balance_sheet(),
            income_statement: default_income_statement(),
            cash_flow: default_cash_flow(),
        }
    }
}

fn default_balance_sheet() -> StatementTaxonomy<BalanceSheetCategory> {
    StatementTaxonomy::new()
        .with(
            BalanceSheetCategory::CurrentAssets,
            &[
                items::CASH_AND_EQUIVALENTS,
                "Short-term Investments",
                items::ACCOUNTS_RECEIVABLE,
                items::INVENTORY,
                "Prepaid Expenses",
                items::TOTAL_CURRENT_ASSETS,
            ],
        )
        .with(
            BalanceSheetCategory::NonCurrentAssets,
            &[
                "Property, Plant and Equipment",
                "Intangible Assets",
                "Goodwill",
                "Long-term Investments",
                "Deferred Tax Assets",
                items::TOTAL_NON_CURRENT_ASSETS,
            ],
        )
        .with(
            BalanceSheetCategory::CurrentLiabilities,
            &[
                "Accounts Payable",
                "Short-term Debt",
                "Current Portion of Long-term Debt",
                "Accrued Expenses",
                "Deferred Revenue",
                items::TOTAL_CURRENT_LIABILITIES,
            ],
        )
        .with(
            BalanceSheetCategory::NonCurrentLiabilities,
            &[
                "Long-term Debt",
                "Pension Liabilities",
                "Deferred Tax Liabilities",
                items::TOTAL_NON_CURRENT_LIABILITIES,
            ],
        )
        .with(
            BalanceSheetCategory::Equity,
            &[
                "Common Stock",
                "Retained Earnings",
                "Additional Paid-in Capital",
                "Treasury Stock",
                items::TOTAL_EQUITY,
            ],
        )
}

fn default_income_statement() -> StatementTaxonomy<IncomeStatementCategory> {
    StatementTaxonomy::new()
        .with(
            IncomeStatementCategory::Revenue,
            &["Revenue", "Net Sales", items::TOTAL_REVENUE],
        )
        .with(
            IncomeStatementCategory::Expenses,
            &[
                items::COST_OF_GOODS_SOLD,
                items::GROSS_PROFIT,
                "Operating Expenses",
                "Research and Development",
                "Selling, General and Administrative",
                "Depreciation and Amortization",
            ],
        )
        .with(
            IncomeStatementCategory::Profit,
            &[
                items::OPERATING_INCOME,
                items::INTEREST_EXPENSE,
                "Income Before Tax",
                "Income Tax Expense",
                items::NET_INCOME,
            ],
        )
        .with(
            IncomeStatementCategory::PerShareData,
            &[
                "Basic Earnings Per Share",
                "Diluted Earnings Per Share",
                "Dividends Per Share",
            ],
        )
}

fn default_cash_flow() -> StatementTaxonomy<CashFlowCategory> {
    StatementTaxonomy::new()
        .with(
            CashFlowCategory::OperatingActivities,
            &[
                items::NET_INCOME,
                "Depreciation and Amortization",
                "Changes in Working Capital",
                items::NET_CASH_OPERATING,
            ],
        )
        .with(
            CashFlowCategory::InvestingActivities,
            &[
                "Capital Expenditures",
                "Acquisitions",
                "Purchases of Investments",
                "Sales of Investments",
                items::NET_CASH_INVESTING,
            ],
        )
        .with(
            CashFlowCategory::FinancingActivities,
            &[
                "Debt Issuance",
                "Debt Repayment",
                "Dividends Paid",
                "Share Repurchases",
                items::NET_CASH_FINANCING,
            ],
        )
        .with(
            CashFlowCategory::Summary,
            &[
                "Net Change in Cash",
                "Cash at Beginning of Period",
                "Cash at End of Period",
            ],
        )
}
