//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, expense::create_expense_table};

/// Ensure the database schema exists.
///
/// This function is idempotent: the tables are created with
/// `IF NOT EXISTS`, so calling it against an already initialized database is
/// a no-op.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
