//! Bid import from spreadsheet exports.
//!
//! The tendering screens export the bid table as CSV with one row per
//! company per lot, or as the JSON array served by the API. Both are turned
//! into typed `BidRecord`s here, before anything reaches the analysis engine.

use crate::entities::{BidRecord, BidStatus};
use crate::error::{ChantierError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Raw CSV row. Every column is text so amounts written with a decimal
/// comma or thousands separators can be normalised before parsing.
#[derive(Debug, Deserialize)]
struct CsvBidRow {
    id: String,
    lot_id: String,
    #[serde(default)]
    lot_name: String,
    #[serde(default)]
    lot_number: String,
    company_id: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    status: String,
}

/// Parse a spreadsheet amount. Blank cells are unpriced bids.
/// Accepts `100000.5`, `100000,5`, `100 000,50` and a trailing `€`.
pub fn parse_amount(raw: &str) -> std::result::Result<Option<f64>, String> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('€')
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Ok(None);
    }

    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("cannot parse amount '{}'", raw.trim()))
}

/// Read bids from CSV with a header row:
/// `id,lot_id,lot_name,lot_number,company_id,company_name,amount,status`.
pub fn read_bids_csv<R: Read>(reader: R) -> Result<Vec<BidRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bids = Vec::new();
    for result in reader.deserialize::<CsvBidRow>() {
        let row = result?;
        // header is line 1
        let line = bids.len() as u64 + 2;
        let amount = parse_amount(&row.amount)
            .map_err(|message| ChantierError::InvalidRecord { line, message })?;

        bids.push(BidRecord {
            id: row.id,
            lot_id: row.lot_id,
            lot_name: row.lot_name,
            lot_number: row.lot_number,
            company_id: row.company_id,
            company_name: row.company_name,
            amount,
            status: BidStatus::from(row.status.as_str()),
        });
    }

    debug!("Parsed {} bids from CSV", bids.len());
    Ok(bids)
}

/// Read bids from a JSON array of bid records.
pub fn read_bids_json<R: Read>(reader: R) -> Result<Vec<BidRecord>> {
    let bids: Vec<BidRecord> = serde_json::from_reader(reader)?;
    debug!("Parsed {} bids from JSON", bids.len());
    Ok(bids)
}

/// Load bids from a `.csv` or `.json` file.
pub fn load_bids(path: impl AsRef<Path>) -> Result<Vec<BidRecord>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let bids = match ext.as_str() {
        "csv" => read_bids_csv(std::fs::File::open(path)?)?,
        "json" => read_bids_json(std::io::BufReader::new(std::fs::File::open(path)?))?,
        _ => {
            return Err(ChantierError::UnsupportedFormat(format!(
                "bid file {} must be .csv or .json",
                path.display()
            )))
        }
    };

    info!("Loaded {} bids from {}", bids.len(), path.display());
    Ok(bids)
}
