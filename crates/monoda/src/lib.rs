//! A [Monobank personal API] client, [sans I/O]. (Bring your own sync/async HTTP client!)
//!
//! This library handles the protocol-layer aspects of the Monobank personal API, including ser-de
//! and request-response abstractions. Monetary fields arrive as integer minor units (kopecks) and
//! are exposed as exact scale-2 [`Decimal`] values in major units.
//!
//! [Monobank personal API]: https://api.monobank.ua/docs/
//! [sans I/O]: https://sans-io.readthedocs.io/how-to-sans-io.html
//! [`Decimal`]: rust_decimal::Decimal
//!
//! # Async example with `reqwest`
//!
//! ```no_run
//! use monoda::chrono::Utc;
//! use monoda::personal::{Monobank, Statement};
//! use reqwest::Client;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new();
//!     let monobank = Monobank::new("https://api.monobank.ua/")?;
//!     let token = "uB85JZKest8AjDornrqNNWdi2Conq7cvGVmo".parse()?;
//!     let from = Utc::now().timestamp() - 30 * 86_400;
//!
//!     let req = monobank.get_statement(&token, &"0".parse()?, from).map(|_| "");
//!     let resp = client.execute(req.try_into()?).await?;
//!
//!     let statement: Statement = resp.json().await?;
//!
//!     println!("{statement:#?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sync example with `ureq`
//!
//! ```no_run
//! use monoda::chrono::Utc;
//! use monoda::personal::{Monobank, Statement};
//!
//! fn main() -> anyhow::Result<()> {
//!     let agent = ureq::agent();
//!     let monobank = Monobank::new("https://api.monobank.ua/")?;
//!     let token = "uB85JZKest8AjDornrqNNWdi2Conq7cvGVmo".parse()?;
//!     let from = Utc::now().timestamp() - 30 * 86_400;
//!
//!     let mut resp = agent.run(monobank.get_statement(&token, &"0".parse()?, from))?;
//!
//!     let statement: Statement = resp.body_mut().read_json()?;
//!
//!     println!("{statement:#?}");
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub use chrono;
pub use http;
pub use rust_decimal;

pub mod personal;

pub type Req = http::Request<()>;

/// Append a path to the request.
pub(crate) fn append_path(req: &mut Req, path: String) {
    // The `http` crate has really bad ergonomics for updating paths.
    // SEE: https://github.com/hyperium/http/issues/594
    let req_uri = req.uri_mut();
    let mut uri_parts = req_uri.clone().into_parts();
    let root = req_uri.path();
    uri_parts.path_and_query = Some(format!("{root}{path}").parse().unwrap());
    *req_uri = http::Uri::from_parts(uri_parts).unwrap();
}
