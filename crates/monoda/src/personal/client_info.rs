//! Client (token holder) metadata.

use crate::personal::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response shape for the `personal/client-info` endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client identifier, shared with the send.monobank.ua service.
    pub client_id: String,

    /// Account holder name.
    pub name: String,

    /// URL configured to receive statement webhooks, if any.
    #[serde(default)]
    pub web_hook_url: Option<String>,

    /// Permission flags granted to the token, one letter per permission.
    #[serde(default)]
    pub permissions: Option<String>,

    /// Accounts available to this client.
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// One account (card or IBAN) belonging to the client.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account identifier, as used in statement requests.
    pub id: AccountId,

    /// Identifier for the send.monobank.ua service.
    #[serde(default)]
    pub send_id: Option<String>,

    /// Current balance, in major units of the account currency.
    #[serde(with = "crate::personal::minor_units")]
    pub balance: Decimal,

    /// Credit limit portion of the balance, in major units.
    #[serde(with = "crate::personal::minor_units")]
    pub credit_limit: Decimal,

    /// Account type, e.g. `black`, `white`, `fop`.
    #[serde(rename = "type")]
    pub account_type: String,

    /// ISO 4217 numeric currency code. UAH is 980.
    pub currency_code: i32,

    /// Cashback earning type, if configured.
    #[serde(default)]
    pub cashback_type: Option<String>,

    /// Masked card numbers attached to this account.
    #[serde(default)]
    pub masked_pan: Vec<String>,

    /// IBAN for wire transfers.
    #[serde(default)]
    pub iban: Option<String>,
}
