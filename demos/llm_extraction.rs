use anyhow::Context;
use dotenv::dotenv;
use statement_extractor::*;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .context("usage: llm_extraction <statement.txt> [provider]")?;
    let provider = std::env::args().nth(2);
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;

    let router = ProviderRouter::from_env()?;
    println!(
        "🤖 Providers: {}",
        router.providers().collect::<Vec<_>>().join(", ")
    );

    let extractor = FinancialDataExtractor::new(text);
    let result = extractor.extract_via_llm(&router, provider.as_deref());

    println!("📅 Years: {:?}", result.years);
    println!("{}", serde_json::to_string_pretty(&result)?);

    println!("\n📝 Drafting credit memo...");
    match generate_credit_memo(&router, extractor.text(), Some(&result), provider.as_deref()) {
        Ok(memo) => println!("\n{}", memo),
        Err(e) => println!("⚠️  Memo generation failed: {}", e),
    }

    Ok(())
}
