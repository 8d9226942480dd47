#![forbid(unsafe_code)]

pub use monoda;

pub mod client;
pub mod errors;
pub mod export;
pub mod imports;
pub mod model;
pub mod sink;
pub mod util;
