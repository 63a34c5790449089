//! Defines the core data model and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params_from_iter};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// The ID of an expense in the ledger.
pub type ExpenseId = i64;

/// The category of an expense.
///
/// Categories are free-form labels, e.g. 'Food', 'Transport', 'Bills'. The
/// only constraint is that a category cannot be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is an
    /// empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded expense.
///
/// Expenses are immutable once stored: the ledger supports inserting and
/// deleting records, never updating them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense, assigned by the database on insertion.
    pub id: ExpenseId,
    /// When the expense occurred, independent of when it was recorded.
    pub date: Date,
    /// The category the expense belongs to, e.g. 'Food'.
    pub category: String,
    /// The amount of money spent. Strictly positive for any expense accepted
    /// through [NewExpense::new].
    pub amount: f64,
    /// An optional free-text annotation. The empty string means no note.
    pub note: String,
}

/// A validated expense that has not been stored yet.
///
/// [NewExpense::new] is the entry boundary for the `amount > 0` rule: a
/// non-positive amount never reaches the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// When the expense occurred.
    pub date: Date,
    /// The category the expense belongs to.
    pub category: CategoryName,
    /// The amount of money spent.
    pub amount: f64,
    /// An optional free-text annotation.
    pub note: String,
}

impl NewExpense {
    /// Create a new expense with an empty note.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::NonPositiveAmount] if `amount` is
    /// zero or negative.
    pub fn new(date: Date, category: CategoryName, amount: f64) -> Result<Self, Error> {
        if amount <= 0.0 {
            return Err(Error::NonPositiveAmount(amount));
        }

        Ok(Self {
            date,
            category,
            amount,
            note: String::new(),
        })
    }

    /// Set the note for the expense.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense in the database.
///
/// Returns the stored expense with its freshly assigned ID. Existing records
/// are unaffected.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expenses (date, category, amount, note)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, date, category, amount, note",
        )?
        .query_row(
            (
                new_expense.date,
                new_expense.category.as_ref(),
                new_expense.amount,
                new_expense.note,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve every expense in the database, in storage order.
///
/// Returns an empty vec when the ledger is empty.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare("SELECT id, date, category, amount, note FROM expenses ORDER BY id ASC")?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Delete the expense with the given `id`.
///
/// Returns the number of rows removed: 1 if the expense existed, 0 if it did
/// not. Deleting an absent id is a no-op, not an error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM expenses WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

/// Delete every expense whose id is in `ids`.
///
/// Ids that are not in the ledger are ignored. The deletion happens inside a
/// single SQL transaction: either all matching rows are removed or, on
/// failure, none are.
///
/// Returns the number of rows removed.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_expenses(ids: &[ExpenseId], connection: &Connection) -> Result<usize, Error> {
    if ids.is_empty() {
        return Ok(0);
    }

    let transaction = connection.unchecked_transaction()?;

    let placeholders = (1..=ids.len())
        .map(|position| format!("?{position}"))
        .collect::<Vec<_>>()
        .join(", ");
    let statement = format!("DELETE FROM expenses WHERE id IN ({placeholders})");

    let rows_affected = transaction.execute(&statement, params_from_iter(ids.iter()))?;

    transaction.commit()?;

    Ok(rows_affected)
}

/// Delete every expense in the ledger.
///
/// Returns the number of rows removed. Irreversible: any confirmation belongs
/// in the presentation layer, not here.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_all_expenses(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM expenses", ())
        .map_err(|error| error.into())
}

/// Create the expenses table in the database.
///
/// `AUTOINCREMENT` keeps ids monotonically increasing so an id is never
/// reused after its row is deleted.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('expenses', 0)",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let note = row.get(4)?;

    Ok(Expense {
        id,
        date,
        category,
        amount,
        note,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod new_expense_tests {
    use time::macros::date;

    use crate::Error;

    use super::{CategoryName, NewExpense};

    #[test]
    fn new_fails_on_zero_amount() {
        let result = NewExpense::new(
            date!(2024 - 03 - 05),
            CategoryName::new_unchecked("Food"),
            0.0,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn new_fails_on_negative_amount() {
        let result = NewExpense::new(
            date!(2024 - 03 - 05),
            CategoryName::new_unchecked("Food"),
            -12.5,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(-12.5)));
    }

    #[test]
    fn new_succeeds_on_positive_amount() {
        let result = NewExpense::new(
            date!(2024 - 03 - 05),
            CategoryName::new_unchecked("Food"),
            199.0,
        );

        assert!(result.is_ok());
        assert_eq!(result.unwrap().note, "");
    }
}
