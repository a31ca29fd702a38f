use anyhow::Result;
use chrono::Utc;

use super::ui::{StyleType, style_text};
use crate::core::convert::Converter;

pub async fn run(converter: &Converter<'_>, amount: f64, from: &str, to: &str) -> Result<()> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();

    let record = converter.convert(amount, &from, &to, Utc::now()).await?;

    println!(
        "{} {} = {}",
        record.amount,
        record.from_currency,
        style_text(
            &format!("{:.2} {}", record.converted_amount, record.to_currency),
            StyleType::ResultValue
        )
    );
    println!(
        "{}",
        style_text(
            &format!(
                "rate {:.6} as of {}",
                record.exchange_rate,
                record.timestamp.format("%Y-%m-%d %H:%M UTC")
            ),
            StyleType::Subtle
        )
    );
    Ok(())
}
