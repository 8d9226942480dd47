//! Account statements.

use crate::personal::minor_units::{from_minor, to_minor};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A statement response: the account's transactions within the requested window, newest first.
pub type Statement = Vec<StatementItem>;

/// JSON parsing errors for [`StatementItem`].
#[derive(Debug, Error)]
pub enum Error {
    /// Missing `description` field.
    #[error("Missing `description` field")]
    Description,

    /// Missing or invalid `amount` field.
    #[error("Missing or invalid `amount` field")]
    Amount,

    /// Missing or invalid `time` field.
    #[error("Missing or invalid `time` field")]
    Time,

    /// Missing or invalid `balance` field.
    #[error("Missing or invalid `balance` field")]
    Balance,
}

/// One statement record: a single transaction against the account.
///
/// Monetary fields are denominated in major units of the account currency (scale-2 exact
/// decimals); on the wire they are integer minor units.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(try_from = "JsonStatementItem")]
#[serde(into = "JsonStatementItem")]
pub struct StatementItem {
    /// Unique record ID, referenced by the `receiptId` of fiscal checks.
    pub id: Option<String>,

    /// Time of the transaction.
    pub time: DateTime<Utc>,

    /// Human-readable transaction description, e.g. the merchant or counterparty name.
    pub description: String,

    /// Merchant category code (ISO 18245).
    pub mcc: Option<i32>,

    /// Original merchant category code before any substitution by the bank.
    pub original_mcc: Option<i32>,

    /// Whether the amount is an authorization hold rather than a settled transaction.
    pub hold: bool,

    /// Transaction amount in the account currency. Negative for spending.
    pub amount: Decimal,

    /// Transaction amount in the original transaction currency.
    pub operation_amount: Option<Decimal>,

    /// ISO 4217 numeric code of the original transaction currency. UAH is 980.
    pub currency_code: Option<i32>,

    /// Commission charged for the transaction, in the account currency.
    pub commission_rate: Option<Decimal>,

    /// Cashback earned on the transaction. Zero when absent.
    pub cashback_amount: Decimal,

    /// Account balance after the transaction, in the account currency.
    pub balance: Decimal,

    /// Free-form comment attached to a transfer.
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStatementItem {
    id: Option<String>,
    time: Option<i64>,
    description: Option<String>,
    mcc: Option<i32>,
    original_mcc: Option<i32>,
    hold: Option<bool>,
    amount: Option<i64>,
    operation_amount: Option<i64>,
    currency_code: Option<i32>,
    commission_rate: Option<i64>,
    cashback_amount: Option<i64>,
    balance: Option<i64>,
    comment: Option<String>,
}

impl TryFrom<JsonStatementItem> for StatementItem {
    type Error = Error;

    fn try_from(value: JsonStatementItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            time: value
                .time
                .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
                .ok_or(Error::Time)?,
            description: value.description.ok_or(Error::Description)?,
            mcc: value.mcc,
            original_mcc: value.original_mcc,
            hold: value.hold.unwrap_or(false),
            amount: value.amount.map(from_minor).ok_or(Error::Amount)?,
            operation_amount: value.operation_amount.map(from_minor),
            currency_code: value.currency_code,
            commission_rate: value.commission_rate.map(from_minor),
            cashback_amount: value
                .cashback_amount
                .map(from_minor)
                .unwrap_or(Decimal::ZERO),
            balance: value.balance.map(from_minor).ok_or(Error::Balance)?,
            comment: value.comment,
        })
    }
}

impl From<StatementItem> for JsonStatementItem {
    fn from(value: StatementItem) -> Self {
        JsonStatementItem {
            id: value.id,
            time: Some(value.time.timestamp()),
            description: Some(value.description),
            mcc: value.mcc,
            original_mcc: value.original_mcc,
            hold: Some(value.hold),
            amount: Some(to_minor(value.amount)),
            operation_amount: value.operation_amount.map(to_minor),
            currency_code: value.currency_code,
            commission_rate: value.commission_rate.map(to_minor),
            cashback_amount: Some(to_minor(value.cashback_amount)),
            balance: Some(to_minor(value.balance)),
            comment: value.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shaped like the API docs example, trimmed to the fields this library models.
    const COFFEE: &str = r#"{
        "id": "ZuHWzqkKGVous_-9vPqGVswK",
        "time": 1700000000,
        "description": "Coffee",
        "mcc": 5814,
        "originalMcc": 5814,
        "hold": false,
        "amount": -4500,
        "operationAmount": -4500,
        "currencyCode": 980,
        "commissionRate": 0,
        "cashbackAmount": 45,
        "balance": 100000
    }"#;

    #[test]
    fn test_statement_item() {
        let item: StatementItem = serde_json::from_str(COFFEE).unwrap();

        assert_eq!(item.description, "Coffee");
        assert_eq!(item.amount, Decimal::new(-4500, 2));
        assert_eq!(item.balance, Decimal::new(100000, 2));
        assert_eq!(item.cashback_amount, Decimal::new(45, 2));
        assert_eq!(item.time.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(item.mcc, Some(5814));
        assert_eq!(item.currency_code, Some(980));
        assert!(!item.hold);
    }

    #[test]
    fn test_minor_units_scaling_is_exact() {
        let item: StatementItem = serde_json::from_str(COFFEE).unwrap();

        // Scaling back up reproduces the raw integers exactly.
        assert_eq!(item.amount * Decimal::from(100), Decimal::from(-4500));
        assert_eq!(item.balance * Decimal::from(100), Decimal::from(100000));
        assert_eq!(to_minor(item.amount), -4500);
    }

    #[test]
    fn test_minimal_record() {
        let json =
            r#"{"description": "Coffee", "amount": -4500, "time": 1700000000, "balance": 100000}"#;
        let item: StatementItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.id, None);
        assert_eq!(item.cashback_amount, Decimal::ZERO);
        assert_eq!(item.operation_amount, None);
        assert!(!item.hold);
    }

    #[test]
    fn test_missing_required_fields() {
        let cases = [
            (
                r#"{"amount": -4500, "time": 1700000000, "balance": 100000}"#,
                "`description`",
            ),
            (
                r#"{"description": "x", "time": 1700000000, "balance": 100000}"#,
                "`amount`",
            ),
            (
                r#"{"description": "x", "amount": -4500, "balance": 100000}"#,
                "`time`",
            ),
            (
                r#"{"description": "x", "amount": -4500, "time": 1700000000}"#,
                "`balance`",
            ),
        ];

        for (json, field) in cases {
            let err = serde_json::from_str::<StatementItem>(json).unwrap_err();
            assert!(err.to_string().contains(field), "{err}");
        }
    }

    #[test]
    fn test_empty_statement() {
        let statement: Statement = serde_json::from_str("[]").unwrap();

        assert!(statement.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let json = r#"[
            {"description": "C", "amount": -300, "time": 1700000300, "balance": 100},
            {"description": "A", "amount": -100, "time": 1700000100, "balance": 400},
            {"description": "B", "amount": -200, "time": 1700000200, "balance": 300}
        ]"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        let order: Vec<_> = statement.iter().map(|item| &item.description).collect();

        assert_eq!(order, ["C", "A", "B"]);
    }

    #[test]
    fn test_serialize_round_trip() {
        let item: StatementItem = serde_json::from_str(COFFEE).unwrap();
        let value = serde_json::to_value(&item).unwrap();

        // Monetary fields serialize back to wire-faithful integer minor units.
        assert_eq!(value["amount"], serde_json::json!(-4500));
        assert_eq!(value["balance"], serde_json::json!(100000));
        assert_eq!(value["cashbackAmount"], serde_json::json!(45));
        assert_eq!(value["time"], serde_json::json!(1700000000));

        let round: StatementItem = serde_json::from_value(value).unwrap();
        assert_eq!(round, item);
    }
}
