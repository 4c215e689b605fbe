use crate::Result;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One row of the raw tabular source, before any batch filtering
///
/// Columns mirror the shared shipment sheet: `ship_date` (YYYY-MM-DD),
/// `order_id`, `tracking_number`, `exchange_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRow {
    pub ship_date: String,
    pub order_id: String,
    #[serde(default)]
    pub tracking_number: String,
    pub exchange_type: String,
}

impl SourceRow {
    /// Parse the ship date; rows with unparseable dates never match a
    /// target date and are dropped during batch construction.
    pub fn ship_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.ship_date.trim(), "%Y-%m-%d").ok()
    }
}

pub struct SourceReader;

impl SourceReader {
    /// Read and parse the source file from the given path
    pub fn from_file(path: &Path) -> Result<Vec<SourceRow>> {
        tracing::debug!("Reading source file from: {}", path.display());

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse source rows from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SourceRow>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.deserialize() {
            let row: SourceRow = result?;

            // Spreadsheet exports pad the bottom with blank rows
            if row.order_id.is_empty() && row.ship_date.is_empty() {
                continue;
            }

            rows.push(row);
        }

        tracing::info!("Read {} source rows", rows.len());

        Ok(rows)
    }
}
