use anyhow::Result;
use comfy_table::Cell;

use super::ui::{StyleType, amount_cell, header_cell, new_styled_table, style_text};
use crate::store::Store;

pub fn run(store: &Store, limit: usize) -> Result<()> {
    let records = store.history.recent(limit)?;
    if records.is_empty() {
        println!("{}", style_text("No conversions recorded yet", StyleType::Subtle));
        return Ok(());
    }

    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("When (UTC)"),
        header_cell("From"),
        header_cell("To"),
        header_cell("Amount"),
        header_cell("Converted"),
        header_cell("Rate"),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&record.from_currency),
            Cell::new(&record.to_currency),
            amount_cell(&format!("{:.2}", record.amount)),
            amount_cell(&format!("{:.2}", record.converted_amount)),
            amount_cell(&format!("{:.6}", record.exchange_rate)),
        ]);
    }

    println!("{}", style_text("Conversion history", StyleType::Title));
    println!("{table}");
    Ok(())
}
