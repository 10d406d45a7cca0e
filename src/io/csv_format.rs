//! CSV output for final account balances
//!
//! Writes one `id,balance` row per account, sorted by id, so two runs over
//! the same population produce comparable files.

use crate::types::{AccountSnapshot, BankError};
use csv::Writer;
use std::io::Write;

/// Write account balances to CSV format
///
/// Rows are sorted by account id regardless of input order. The header is
/// written even when `snapshots` is empty.
///
/// # Errors
///
/// - `BankError::CsvError` if serialization or the underlying writer fails
/// - `BankError::IoError` if the final flush fails
pub fn write_balances_csv(snapshots: &[AccountSnapshot], output: &mut dyn Write) -> Result<(), BankError> {
    let mut writer = Writer::from_writer(output);

    let mut sorted = snapshots.to_vec();
    sorted.sort_by_key(|snapshot| snapshot.id);

    if sorted.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(["id", "balance"])?;
    }
    for snapshot in &sorted {
        writer.serialize(snapshot)?;
    }

    writer.flush()?;
    Ok(())
}
