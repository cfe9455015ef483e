//! Customer health report: windowed KPIs, at-risk segmentation, CSV exports
//! and executive charts from a customer snapshot CSV.

pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod segment;
pub mod types;
pub mod util;
pub mod window;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use pipeline::run;
pub use types::{CustomerRecord, CustomerTier, SummaryStats, WindowedRecord};
