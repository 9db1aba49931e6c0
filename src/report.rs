use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::fees::FeeQuote;
use crate::money::{parse_decimal, round_cents};

fn cents(amount: Decimal) -> String {
    let mut amount = round_cents(amount);
    amount.rescale(2);
    amount.to_string()
}

/// Writes quotes as pretty JSON to `out_path` and a CSV twin next to it
/// (`<stem>_quotes.csv`). Returns the CSV path.
pub fn write_quotes(quotes: &[FeeQuote], out_path: &Path) -> Result<PathBuf> {
    let json_str = serde_json::to_string_pretty(quotes)?;
    std::fs::write(out_path, json_str)
        .with_context(|| format!("Failed to write quotes: {}", out_path.display()))?;

    let base_path = out_path.parent().unwrap_or(Path::new("."));
    let base_name = out_path.file_stem().and_then(|s| s.to_str()).unwrap_or("quotes");

    let csv_path = base_path.join(format!("{}_quotes.csv", base_name));
    let mut wtr = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create CSV file: {}", csv_path.display()))?;
    wtr.write_record([
        "input",
        "principal",
        "tier",
        "buyer_fee_percent",
        "seller_fee_percent",
        "total_fee_percent",
        "buyer_fee",
        "seller_fee",
        "total_fee",
        "coercion",
    ])?;
    for quote in quotes {
        let b = quote.breakdown;
        wtr.write_record([
            quote.input.clone().unwrap_or_default(),
            cents(b.principal),
            (quote.tier + 1).to_string(),
            b.buyer_fee_percent.to_string(),
            b.seller_fee_percent.to_string(),
            b.total_fee_percent.to_string(),
            cents(b.buyer_fee),
            cents(b.seller_fee),
            cents(b.total_fee),
            quote.coercion.map(|c| c.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    Ok(csv_path)
}

/// Reads raw amounts from a CSV file. The first row is a header when it has
/// an `amount` cell (that column is then read) or when its first cell is not
/// a number. Otherwise the file is headerless and the first column is read
/// from row 0. Cells are returned untouched so that quoting can flag the
/// unreadable ones.
pub fn read_amounts(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open amounts file: {}", path.display()))?;

    let mut records = rdr.records();
    let first = match records.next() {
        Some(record) => record.with_context(|| format!("Failed to read {}", path.display()))?,
        None => return Ok(Vec::new()),
    };

    let mut amounts = Vec::new();
    let column = match first.iter().position(|h| h.eq_ignore_ascii_case("amount")) {
        Some(column) => column,
        None => {
            let lead = first.get(0).unwrap_or_default();
            if lead.is_empty() || parse_decimal(lead).is_ok() {
                amounts.push(lead.to_string());
            }
            0
        }
    };

    for record in records {
        let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
        amounts.push(record.get(column).unwrap_or_default().to_string());
    }
    Ok(amounts)
}
