use async_trait::async_trait;
use crate::models::{RegionTable, TimeSeries};
use super::DataSource;
use anyhow::{Result, anyhow};
use std::collections::HashMap;

/// In-memory source keyed by series code, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<String, RegionTable>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one region's series under a series code.
    pub fn with_series(mut self, series_code: &str, region: &str, series: TimeSeries) -> Self {
        self.tables
            .entry(series_code.to_string())
            .or_default()
            .insert(region.to_string(), series.renamed(series_code));
        self
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_table(&self, series_code: &str) -> Result<RegionTable> {
        self.tables
            .get(series_code)
            .cloned()
            .ok_or_else(|| anyhow!("No table registered for series '{}'", series_code))
    }
}
