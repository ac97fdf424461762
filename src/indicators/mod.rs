use crate::error::Result;
use crate::fetcher::{fetch_scaled, DataSource};
use crate::models::TimeSeries;
use async_trait::async_trait;
use tracing::debug;

pub mod gdp;
pub mod registry;

/// An economic indicator that can be adjusted by limits.
#[async_trait]
pub trait IndicatorImplementor: Send + Sync {
    /// Returns the unique slug (e.g., "gdp")
    fn slug(&self) -> &str;

    /// Returns the display name
    fn name(&self) -> &str;

    /// Series code understood by the data sources
    fn series_code(&self) -> &str;

    /// Raw values are divided by this to reach the declared unit
    fn unit_divisor(&self) -> f64;

    /// Fetches the region's series, scaled to the indicator unit and named
    /// after the indicator slug.
    async fn fetch_raw_series(&self, source: &dyn DataSource, region: &str) -> Result<TimeSeries> {
        let raw = fetch_scaled(source, self.series_code(), region, self.unit_divisor()).await?;
        debug!("Indicator '{}' for {}: {} years", self.slug(), region, raw.len());
        Ok(raw.renamed(self.slug()))
    }
}
