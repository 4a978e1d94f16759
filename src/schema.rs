use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, ObjectValidation, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A fiscal year as it appears in statement text (e.g. 2022).
pub type FinancialYear = i32;

/// Line-item name → extracted value. `None` means "not found", which is not the same as `0.0`.
pub type CategoryValues = BTreeMap<String, Option<f64>>;

/// Year → category → line item → value.
pub type StatementSection<C> = BTreeMap<FinancialYear, BTreeMap<C, CategoryValues>>;

pub type BalanceSheet = StatementSection<BalanceSheetCategory>;
pub type IncomeStatement = StatementSection<IncomeStatementCategory>;
pub type CashFlowStatement = StatementSection<CashFlowCategory>;

/// Year → ratio category → ratio → value.
pub type RatioSet = BTreeMap<FinancialYear, BTreeMap<RatioCategory, BTreeMap<Ratio, Option<f64>>>>;

/// A closed set of category labels belonging to one statement.
pub trait StatementCategory: Copy + Ord + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum BalanceSheetCategory {
    #[serde(rename = "Current Assets")]
    CurrentAssets,
    #[serde(rename = "Non-Current Assets")]
    NonCurrentAssets,
    #[serde(rename = "Current Liabilities")]
    CurrentLiabilities,
    #[serde(rename = "Non-Current Liabilities")]
    NonCurrentLiabilities,
    #[serde(rename = "Equity")]
    Equity,
}

impl StatementCategory for BalanceSheetCategory {
    const ALL: &'static [Self] = &[
        Self::CurrentAssets,
        Self::NonCurrentAssets,
        Self::CurrentLiabilities,
        Self::NonCurrentLiabilities,
        Self::Equity,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::CurrentAssets => "Current Assets",
            Self::NonCurrentAssets => "Non-Current Assets",
            Self::CurrentLiabilities => "Current Liabilities",
            Self::NonCurrentLiabilities => "Non-Current Liabilities",
            Self::Equity => "Equity",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum IncomeStatementCategory {
    Revenue,
    Expenses,
    Profit,
    #[serde(rename = "Per Share Data")]
    PerShareData,
}

impl StatementCategory for IncomeStatementCategory {
    const ALL: &'static [Self] = &[
        Self::Revenue,
        Self::Expenses,
        Self::Profit,
        Self::PerShareData,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Expenses => "Expenses",
            Self::Profit => "Profit",
            Self::PerShareData => "Per Share Data",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum CashFlowCategory {
    #[serde(rename = "Operating Activities")]
    OperatingActivities,
    #[serde(rename = "Investing Activities")]
    InvestingActivities,
    #[serde(rename = "Financing Activities")]
    FinancingActivities,
    Summary,
}

impl StatementCategory for CashFlowCategory {
    const ALL: &'static [Self] = &[
        Self::OperatingActivities,
        Self::InvestingActivities,
        Self::FinancingActivities,
        Self::Summary,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::OperatingActivities => "Operating Activities",
            Self::InvestingActivities => "Investing Activities",
            Self::FinancingActivities => "Financing Activities",
            Self::Summary => "Summary",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RatioCategory {
    Liquidity,
    Solvency,
    Profitability,
    Efficiency,
}

impl StatementCategory for RatioCategory {
    const ALL: &'static [Self] = &[
        Self::Liquidity,
        Self::Solvency,
        Self::Profitability,
        Self::Efficiency,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Liquidity => "Liquidity",
            Self::Solvency => "Solvency",
            Self::Profitability => "Profitability",
            Self::Efficiency => "Efficiency",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Ratio {
    #[serde(rename = "Current Ratio")]
    CurrentRatio,
    #[serde(rename = "Quick Ratio")]
    QuickRatio,
    #[serde(rename = "Cash Ratio")]
    CashRatio,
    #[serde(rename = "Debt-to-Equity Ratio")]
    DebtToEquity,
    #[serde(rename = "Debt-to-Assets Ratio")]
    DebtToAssets,
    #[serde(rename = "Interest Coverage Ratio")]
    InterestCoverage,
    #[serde(rename = "Gross Margin")]
    GrossMargin,
    #[serde(rename = "Operating Margin")]
    OperatingMargin,
    #[serde(rename = "Net Profit Margin")]
    NetProfitMargin,
    #[serde(rename = "Return on Assets (ROA)")]
    ReturnOnAssets,
    #[serde(rename = "Return on Equity (ROE)")]
    ReturnOnEquity,
    #[serde(rename = "Asset Turnover")]
    AssetTurnover,
    #[serde(rename = "Inventory Turnover")]
    InventoryTurnover,
    #[serde(rename = "Receivables Turnover")]
    ReceivablesTurnover,
}

impl Ratio {
    pub const ALL: &'static [Ratio] = &[
        Ratio::CurrentRatio,
        Ratio::QuickRatio,
        Ratio::CashRatio,
        Ratio::DebtToEquity,
        Ratio::DebtToAssets,
        Ratio::InterestCoverage,
        Ratio::GrossMargin,
        Ratio::OperatingMargin,
        Ratio::NetProfitMargin,
        Ratio::ReturnOnAssets,
        Ratio::ReturnOnEquity,
        Ratio::AssetTurnover,
        Ratio::InventoryTurnover,
        Ratio::ReceivablesTurnover,
    ];

    pub fn category(&self) -> RatioCategory {
        match self {
            Ratio::CurrentRatio | Ratio::QuickRatio | Ratio::CashRatio => RatioCategory::Liquidity,
            Ratio::DebtToEquity | Ratio::DebtToAssets | Ratio::InterestCoverage => {
                RatioCategory::Solvency
            }
            Ratio::GrossMargin
            | Ratio::OperatingMargin
            | Ratio::NetProfitMargin
            | Ratio::ReturnOnAssets
            | Ratio::ReturnOnEquity => RatioCategory::Profitability,
            Ratio::AssetTurnover | Ratio::InventoryTurnover | Ratio::ReceivablesTurnover => {
                RatioCategory::Efficiency
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ratio::CurrentRatio => "Current Ratio",
            Ratio::QuickRatio => "Quick Ratio",
            Ratio::CashRatio => "Cash Ratio",
            Ratio::DebtToEquity => "Debt-to-Equity Ratio",
            Ratio::DebtToAssets => "Debt-to-Assets Ratio",
            Ratio::InterestCoverage => "Interest Coverage Ratio",
            Ratio::GrossMargin => "Gross Margin",
            Ratio::OperatingMargin => "Operating Margin",
            Ratio::NetProfitMargin => "Net Profit Margin",
            Ratio::ReturnOnAssets => "Return on Assets (ROA)",
            Ratio::ReturnOnEquity => "Return on Equity (ROE)",
            Ratio::AssetTurnover => "Asset Turnover",
            Ratio::InventoryTurnover => "Inventory Turnover",
            Ratio::ReceivablesTurnover => "Receivables Turnover",
        }
    }

    pub fn from_label(label: &str) -> Option<Ratio> {
        Ratio::ALL.iter().copied().find(|r| r.label() == label)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which statement a flattened value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    Ratios,
}

/// The normalized output of both extraction paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    #[schemars(description = "Fiscal years covered by the statements, ascending (e.g. [2021, 2022])")]
    pub years: Vec<FinancialYear>,

    #[schemars(
        schema_with = "balance_sheet_schema",
        description = "Balance sheet values keyed by year, then category, then line item. Use null when a value is not reported."
    )]
    pub balance_sheet: BalanceSheet,

    #[schemars(
        schema_with = "income_statement_schema",
        description = "Income statement values keyed by year, then category, then line item. Use null when a value is not reported."
    )]
    pub income_statement: IncomeStatement,

    #[schemars(
        schema_with = "cash_flow_schema",
        description = "Cash flow statement values keyed by year, then category, then line item. Use null when a value is not reported."
    )]
    pub cash_flow: CashFlowStatement,

    #[schemars(
        schema_with = "ratio_set_schema",
        description = "Financial ratios keyed by year, then ratio category, then ratio name. Margins are percentages."
    )]
    pub ratios: RatioSet,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn balance_sheet_value(
        &self,
        year: FinancialYear,
        category: BalanceSheetCategory,
        item: &str,
    ) -> Option<f64> {
        section_value(&self.balance_sheet, year, category, item)
    }

    pub fn income_statement_value(
        &self,
        year: FinancialYear,
        category: IncomeStatementCategory,
        item: &str,
    ) -> Option<f64> {
        section_value(&self.income_statement, year, category, item)
    }

    pub fn cash_flow_value(
        &self,
        year: FinancialYear,
        category: CashFlowCategory,
        item: &str,
    ) -> Option<f64> {
        section_value(&self.cash_flow, year, category, item)
    }

    pub fn ratio(&self, year: FinancialYear, ratio: Ratio) -> Option<f64> {
        self.ratios
            .get(&year)
            .and_then(|categories| categories.get(&ratio.category()))
            .and_then(|values| values.get(&ratio))
            .copied()
            .flatten()
    }

    pub fn latest_year(&self) -> Option<FinancialYear> {
        self.years.iter().copied().max()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExtractionResult)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn object_schema(object: ObjectValidation) -> Schema {
    Schema::Object(SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        object: Some(Box::new(object)),
        ..Default::default()
    })
}

/// An object with exactly the named keys, each holding `value`.
fn closed_object<'a>(keys: impl IntoIterator<Item = &'a str>, value: &Schema) -> Schema {
    let mut object = ObjectValidation::default();
    for key in keys {
        object.properties.insert(key.to_string(), value.clone());
    }
    object.additional_properties = Some(Box::new(Schema::Bool(false)));
    object_schema(object)
}

/// Year-keyed object whose entries are `per_year`.
fn by_year(per_year: Schema) -> Schema {
    object_schema(ObjectValidation {
        additional_properties: Some(Box::new(per_year)),
        ..Default::default()
    })
}

fn section_schema<C: StatementCategory>(gen: &mut SchemaGenerator) -> Schema {
    let values = gen.subschema_for::<CategoryValues>();
    by_year(closed_object(C::ALL.iter().map(|c| c.label()), &values))
}

fn balance_sheet_schema(gen: &mut SchemaGenerator) -> Schema {
    section_schema::<BalanceSheetCategory>(gen)
}

fn income_statement_schema(gen: &mut SchemaGenerator) -> Schema {
    section_schema::<IncomeStatementCategory>(gen)
}

fn cash_flow_schema(gen: &mut SchemaGenerator) -> Schema {
    section_schema::<CashFlowCategory>(gen)
}

fn ratio_set_schema(gen: &mut SchemaGenerator) -> Schema {
    let value = gen.subschema_for::<Option<f64>>();
    let mut categories = ObjectValidation::default();
    for category in RatioCategory::ALL {
        let ratios = Ratio::ALL
            .iter()
            .filter(|r| r.category() == *category)
            .map(|r| r.label());
        categories
            .properties
            .insert(category.label().to_string(), closed_object(ratios, &value));
    }
    categories.additional_properties = Some(Box::new(Schema::Bool(false)));
    by_year(object_schema(categories))
}

/// Looks up a single value, flattening "missing key" and "null" into `None`.
pub fn section_value<C: StatementCategory>(
    section: &StatementSection<C>,
    year: FinancialYear,
    category: C,
    item: &str,
) -> Option<f64> {
    section
        .get(&year)
        .and_then(|categories| categories.get(&category))
        .and_then(|items| items.get(item))
        .copied()
        .flatten()
}
