use crate::model::Dataset;
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV Error")]
    Csv(#[from] csv::Error),

    #[error("FS Error")]
    Io(#[from] std::io::Error),
}

/// Flat CSV row shape. Every column is pre-formatted as a string: amounts keep two fractional
/// digits and times are ISO-8601 in UTC.
#[derive(Clone, Debug, Serialize)]
struct TransactionCSVRow<'a> {
    source: &'a str,
    amount: String,
    time: String,
    balance: String,
    name: &'a str,
}

const CSV_HEADER: [&str; 5] = ["source", "amount", "time", "balance", "name"];

/// Write the dataset as UTF-8 CSV.
///
/// The header row is always present, even for an empty dataset. The name column is empty for
/// untagged datasets.
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for row in dataset {
        writer.serialize(TransactionCSVRow {
            source: &row.source,
            amount: row.amount.to_string(),
            time: row.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            balance: row.balance.to_string(),
            name: row.name.as_deref().unwrap_or_default(),
        })?;
    }
    writer.flush()?;

    Ok(())
}
