pub use self::{amount::*, analyzer::*, dataset::*, series::*, stats::*};

pub(crate) mod amount;
pub(crate) mod analyzer;
pub(crate) mod dataset;
pub(crate) mod series;
mod stats;
