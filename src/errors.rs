//! A single place to find every error type this crate can produce.

pub use crate::client::{PoolError, StatementClientError, StatementError};
pub use crate::export::ExportError;
pub use crate::imports::roster::RosterError;
pub use crate::model::DatasetError;
pub use crate::sink::SinkError;
