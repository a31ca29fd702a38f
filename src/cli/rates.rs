use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;

use super::ui::{StyleType, amount_cell, header_cell, new_styled_table, style_text};
use crate::sources::resolver::RateResolver;
use crate::store::Store;

/// Fetches and displays the full rate table for a base currency. The
/// result is written back to the cache so later conversions hit it.
pub async fn run(resolver: &RateResolver, store: &Store, base: &str) -> Result<()> {
    let base = base.to_uppercase();
    let now = Utc::now();

    let resolution = resolver.resolve(&base).await;
    store.rates.put(&base, &resolution.rates, &resolution.source, now)?;

    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Currency"),
        header_cell(&format!("Rate (1 {base})")),
    ]);

    let mut rates: Vec<_> = resolution.rates.iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));
    for (code, rate) in rates {
        table.add_row(vec![Cell::new(code), amount_cell(&format!("{rate:.4}"))]);
    }

    println!(
        "{}",
        style_text(&format!("Exchange rates for {base}"), StyleType::Title)
    );
    println!("{table}");
    println!(
        "{}",
        style_text(&format!("source: {}", resolution.source), StyleType::Subtle)
    );
    Ok(())
}
