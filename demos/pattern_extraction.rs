use statement_extractor::*;

const STATEMENT: &str = "\
Northwind Traders Inc
Balance Sheet as of December 31, 2023 and 2022

Cash and Cash Equivalents 1,250,000
Accounts Receivable 830,500
Inventory 410,000
Total Current Assets 2,490,500
Total Non-Current Assets 4,100,000
Total Current Liabilities 1,320,000
Total Non-Current Liabilities 2,050,000
Total Equity 3,220,500

Income Statement
Total Revenue 9,600,000
Cost of Goods Sold 6,240,000
Gross Profit 3,360,000
Operating Income 1,150,000
Interest Expense 140,000
Net Income 780,000

Cash Flow Statement
Net Cash from Operating Activities 1,020,000
Net Cash from Investing Activities 450,000
Net Cash from Financing Activities 210,000
";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => STATEMENT.to_string(),
    };

    let extractor = FinancialDataExtractor::new(text);
    let result = extractor.extract_via_patterns();

    println!("📅 Years: {:?}", result.years);

    if let Some(year) = result.latest_year() {
        println!("\n📊 Ratios for {}:", year);
        for ratio in Ratio::ALL {
            match result.ratio(year, *ratio) {
                Some(value) => println!("   {:<28} {:>10.2}", ratio.label(), value),
                None => println!("   {:<28} {:>10}", ratio.label(), "n/a"),
            }
        }
    }

    let rows = flatten(&result);
    println!("\n💾 {} non-null values ready to store", rows.len());

    println!("\n{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
