//! Serializes expenses to CSV for download backups.

use std::io::Write;

use crate::{Error, expense::Expense};

/// The CSV header row, matching the layout of the expenses table with the
/// row identifier first.
pub const CSV_HEADER: [&str; 5] = ["rowid", "date", "category", "amount", "note"];

/// Write `expenses` to `writer` as CSV, in the order given.
///
/// The first row is [CSV_HEADER]. Amounts are written with full precision and
/// no currency symbol, so re-importing the file reproduces the original
/// values exactly.
///
/// # Errors
/// Returns an [Error::CsvError] if a record cannot be written.
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for expense in expenses {
        csv_writer
            .write_record(&[
                expense.id.to_string(),
                expense.date.to_string(),
                expense.category.clone(),
                expense.amount.to_string(),
                expense.note.clone(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok(())
}

/// Serialize `expenses` to an in-memory CSV document.
///
/// # Errors
/// Returns an [Error::CsvError] if a record cannot be written.
pub fn expenses_to_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    write_expenses_csv(expenses, &mut buffer)?;

    Ok(buffer)
}
