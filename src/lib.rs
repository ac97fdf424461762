pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod limits;
pub mod models;
pub mod report;

use std::sync::Arc;

use crate::config::{Settings, SourceKind};
use crate::fetcher::csv_file::WorldBankCsv;
use crate::fetcher::worldbank::WorldBankFetcher;
use crate::fetcher::DataSource;

pub use crate::config::AdjustmentPlan;
pub use crate::core::orchestrator::{adjust, process_all};
pub use crate::core::table::AdjustedTable;
pub use crate::error::{AdjustError, Result};
pub use crate::models::TimeSeries;

/// Data source selected by the settings
pub fn build_source(settings: &Settings) -> Arc<dyn DataSource> {
    match settings.source {
        SourceKind::Worldbank => Arc::new(WorldBankFetcher::new(settings.api_base.clone())),
        SourceKind::Csv => Arc::new(WorldBankCsv::new(settings.data_dir.clone())),
    }
}
