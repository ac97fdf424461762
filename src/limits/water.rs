use super::{LimitImplementor, LimitParameters};
use crate::core::interpolation::Curve;
use crate::error::Result;
use crate::fetcher::{fetch_scaled, DataSource};
use crate::models::TimeSeries;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Water stress (freshwater withdrawal / available freshwater resources),
/// World Bank general series.
pub struct WaterGeneralWbLimit {
    limit_name: String,
    region_code: String,
    curve: Curve,
    source: Arc<dyn DataSource>,
}

impl WaterGeneralWbLimit {
    pub const CONFIG_NAME: &'static str = "water_general_wb";
    pub const SERIES_CODE: &'static str = "ER.H2O.FWST.ZS";
    /// Source is a percentage
    pub const UNIT_DIVISOR: f64 = 100.0;
    pub const DEFAULT_POINTS: [(f64, f64); 5] =
        [(0.5, 1.0), (0.7, 0.8), (0.8, 0.7), (0.9, 0.5), (1.0, 0.0)];

    pub fn new(limit_name: &str, parameters: &LimitParameters, source: Arc<dyn DataSource>) -> Result<Self> {
        let region_code = parameters.require_region(limit_name)?.to_string();
        let curve = parameters.curve(&Self::DEFAULT_POINTS)?;

        Ok(Self {
            limit_name: limit_name.to_string(),
            region_code,
            curve,
            source,
        })
    }
}

#[async_trait]
impl LimitImplementor for WaterGeneralWbLimit {
    fn config_name(&self) -> &str {
        Self::CONFIG_NAME
    }

    fn limit_name(&self) -> &str {
        &self.limit_name
    }

    fn curve(&self) -> &Curve {
        &self.curve
    }

    async fn fetch_raw_series(&self) -> Result<TimeSeries> {
        let series = fetch_scaled(
            self.source.as_ref(),
            Self::SERIES_CODE,
            &self.region_code,
            Self::UNIT_DIVISOR,
        )
        .await?;
        debug!(
            "Water stress for {}: {} of {} years observed",
            self.region_code,
            series.observed_count(),
            series.len()
        );
        Ok(series.renamed("water"))
    }
}
