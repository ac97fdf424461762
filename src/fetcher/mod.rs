use crate::error::AdjustError;
use crate::models::{RegionTable, TimeSeries};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use thiserror::Error;

pub mod csv_file;
pub mod memory;
pub mod worldbank;

/// Adapter around a raw tabular source.
///
/// `fetch_table` is the full reshaped table (region code -> yearly series)
/// for one series code. Sources that can query a single region cheaply
/// override `fetch_region`.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_table(&self, series_code: &str) -> Result<RegionTable>;

    async fn fetch_region(&self, series_code: &str, region: &str) -> Result<TimeSeries> {
        let mut table = self.fetch_table(series_code).await?;
        table
            .remove(region)
            .ok_or_else(|| anyhow!(RegionMissing(region.to_string())))
    }
}

/// Marker error so callers can tell "region absent" apart from I/O failures.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("region '{0}' not present in source")]
pub struct RegionMissing(pub String);

/// Region lookup plus unit scaling shared by indicators and limits.
pub async fn fetch_scaled(
    source: &dyn DataSource,
    series_code: &str,
    region: &str,
    divisor: f64,
) -> crate::error::Result<TimeSeries> {
    let series = source
        .fetch_region(series_code, region)
        .await
        .map_err(|e| match e.downcast_ref::<RegionMissing>() {
            Some(_) => AdjustError::UnknownRegion {
                region: region.to_string(),
                series: series_code.to_string(),
            },
            None => AdjustError::data_source(source.name(), series_code, e),
        })?;
    Ok(series.map_values(|v| v / divisor))
}
