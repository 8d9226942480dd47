use crate::model::UahAmount;
use chrono::{DateTime, Utc};
use monoda::personal::StatementItem;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Datasets disagree on the name column; tag every part before concatenating")]
    SchemaMismatch,
}

/// One normalized transaction row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    /// Transaction description, verbatim from the statement record.
    pub source: String,

    /// Amount in major units. Negative for spending.
    pub amount: UahAmount,

    /// Time of the transaction.
    pub time: DateTime<Utc>,

    /// Account balance after the transaction, in major units.
    pub balance: UahAmount,

    /// Family member who owns this row. `None` until the dataset is tagged.
    pub name: Option<Arc<str>>,
}

/// An immutable, ordered table of normalized transactions.
///
/// A dataset is built from a statement, optionally tagged with its owner's name, and combined
/// with other datasets by [`Dataset::concat`]. There is no public mutation; every step produces
/// a new dataset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dataset {
    rows: Vec<Transaction>,
    tagged: bool,
}

impl Dataset {
    /// Normalize a statement into an untagged dataset.
    ///
    /// Row order and count match the statement exactly; an empty statement produces an empty
    /// dataset. Minor-unit amounts arrive from the wire layer already scaled to major units.
    pub fn from_statement(statement: &[StatementItem]) -> Self {
        let rows = statement
            .iter()
            .map(|item| Transaction {
                source: item.description.clone(),
                amount: UahAmount::from(item.amount),
                time: item.time,
                balance: UahAmount::from(item.balance),
                name: None,
            })
            .collect();

        Self {
            rows,
            tagged: false,
        }
    }

    /// Tag every row with the owning family member's name.
    pub fn tag(self, name: &str) -> Self {
        let name = Arc::<str>::from(name);
        let rows = self
            .rows
            .into_iter()
            .map(|row| Transaction {
                name: Some(name.clone()),
                ..row
            })
            .collect();

        Self { rows, tagged: true }
    }

    /// Concatenate datasets, preserving argument order and row order within each part.
    ///
    /// All parts must agree on the name column: either every part is tagged or none is. Zero
    /// parts produce an empty dataset.
    pub fn concat(parts: impl IntoIterator<Item = Dataset>) -> Result<Self, DatasetError> {
        let mut parts = parts.into_iter();

        let Some(mut joint) = parts.next() else {
            return Ok(Self::default());
        };

        for part in parts {
            if part.tagged != joint.tagged {
                return Err(DatasetError::SchemaMismatch);
            }
            joint.rows.extend(part.rows);
        }

        Ok(joint)
    }

    /// Iterate rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` once every row carries an owner name.
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }

    /// Exact sum of the amount column.
    pub fn total_amount(&self) -> UahAmount {
        self.rows.iter().map(|row| row.amount).sum()
    }
}

#[cfg(test)]
impl Dataset {
    /// Build a dataset directly from rows, bypassing statement normalization.
    pub(crate) fn from_raw(rows: Vec<Transaction>, tagged: bool) -> Self {
        Self { rows, tagged }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
