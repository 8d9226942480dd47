//! An implementation of the Monobank personal API. The main type is the [`Monobank`] client.

pub use self::client_info::{Account, ClientInfo};
pub use self::statement::{Error, Statement, StatementItem};
use crate::{append_path, Req};
use http::header::{HeaderValue, InvalidHeaderValue};
use http::{Request, Uri};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod client_info;
mod statement;

/// Header name carrying the personal API token on every request.
pub const X_TOKEN: &str = "x-token";

/// The main Monobank client.
#[derive(Clone, Debug)]
pub struct Monobank {
    req: Req,
}

impl Monobank {
    /// Monobank client constructor.
    ///
    /// The API endpoint string must be a valid [`Uri`].
    ///
    /// # Example
    ///
    /// ```
    /// # use monoda::personal::Monobank;
    /// # fn main() -> anyhow::Result<()> {
    /// let monobank = Monobank::new("https://api.monobank.ua/")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Panics
    ///
    /// This function asserts that the API server URL has both a scheme and host component. This
    /// disallows the use of relative URIs like `/hello/world` and non-network URIs like `data:`
    /// and `mailto:`.
    pub fn new<U>(api: U) -> Result<Self, http::Error>
    where
        U: TryInto<Uri>,
        <U as TryInto<Uri>>::Error: Into<http::Error>,
    {
        let req = Request::get(api).body(())?;
        assert!(req.uri().scheme().is_some());
        assert!(req.uri().host().is_some());

        Ok(Self { req })
    }

    /// Get the [`ClientInfo`] for the holder of `token`: name, permissions, and account list.
    ///
    /// Returns a [`Req`] which can be sent by your preferred HTTP client.
    ///
    /// The response can be deserialized from JSON into a [`ClientInfo`].
    pub fn get_client_info(&self, token: &Token) -> Req {
        let mut req = self.req.clone();
        append_path(&mut req, "personal/client-info".to_string());
        req.headers_mut().insert(X_TOKEN, token.header_value());

        req
    }

    /// Get the [`Statement`] for an account, covering epoch second `from` until now.
    ///
    /// Returns a [`Req`] which can be sent by your preferred HTTP client.
    ///
    /// The response can be deserialized from JSON into a [`Statement`]. Monobank limits the window
    /// to 31 days and one statement request per account per minute.
    pub fn get_statement(&self, token: &Token, account: &AccountId, from: i64) -> Req {
        let mut req = self.req.clone();
        append_path(&mut req, format!("personal/statement/{account}/{from}"));
        req.headers_mut().insert(X_TOKEN, token.header_value());

        req
    }
}

/// Personal API token, sent as the `X-Token` header on every request.
///
/// Tokens are issued at <https://api.monobank.ua/> and grant read access to the holder's
/// accounts. The inner header value is marked sensitive, so `Debug` output redacts the token
/// text instead of leaking it into logs.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "String")]
pub struct Token(HeaderValue);

impl Token {
    /// Validate and wrap a personal API token.
    ///
    /// Any non-empty string that is a valid HTTP header value is accepted.
    pub fn new<S: AsRef<str>>(token: S) -> Result<Self, InvalidToken> {
        let token = token.as_ref();
        if token.is_empty() {
            return Err(InvalidToken::Empty);
        }

        let mut value = HeaderValue::from_str(token)?;
        value.set_sensitive(true);

        Ok(Self(value))
    }

    /// Header value for the [`X_TOKEN`] header.
    pub fn header_value(&self) -> HeaderValue {
        self.0.clone()
    }
}

impl FromStr for Token {
    type Err = InvalidToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::new(token)
    }
}

impl TryFrom<String> for Token {
    type Error = InvalidToken;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::new(token)
    }
}

/// Errors for [`Token`] validation.
#[derive(Debug, Error)]
pub enum InvalidToken {
    /// Token is empty.
    #[error("Token must not be empty")]
    Empty,

    /// Token contains characters that cannot appear in an HTTP header.
    #[error("Token is not a valid header value")]
    Header(#[from] InvalidHeaderValue),
}

/// Opaque account identifier, as used in statement request paths.
///
/// The special value `"0"` selects the token holder's default account.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, Hash, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');

        if valid {
            Ok(Self(id.to_string()))
        } else {
            Err(InvalidAccountId(id.to_string()))
        }
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error for [`AccountId`] validation. Account IDs are non-empty `[A-Za-z0-9_-]` strings.
#[derive(Debug, Error)]
#[error("Invalid account ID: {0:?}")]
pub struct InvalidAccountId(String);

pub(crate) mod minor_units {
    //! Ser-de between integer minor units (kopecks) and scale-2 [`Decimal`] major units.

    use rust_decimal::Decimal;
    use std::fmt;

    pub(crate) fn from_minor(minor: i64) -> Decimal {
        Decimal::from_i128_with_scale(minor as i128, 2)
    }

    pub(crate) fn to_minor(value: Decimal) -> i64 {
        assert!(value.scale() <= 2, "Unexpected Decimal scale");

        let mut value = value;
        value.rescale(2);

        value.mantissa().try_into().unwrap()
    }

    pub(crate) fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(to_minor(*value))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_i64(MinorUnitsVisitor)
    }

    struct MinorUnitsVisitor;

    impl serde::de::Visitor<'_> for MinorUnitsVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "an amount in integer minor units")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Decimal, E>
        where
            E: serde::de::Error,
        {
            Ok(from_minor(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Decimal, E>
        where
            E: serde::de::Error,
        {
            let value =
                i64::try_from(value).map_err(|_| E::custom("minor units value out of range"))?;

            Ok(from_minor(value))
        }
    }
}
