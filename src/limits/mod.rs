//! Limits: resource or planetary boundaries that reduce an indicator.
//!
//! Each limit owns a severity series (fetched from its own data source) and
//! a response curve turning a severity value into an adjustment factor.

use crate::core::interpolation::{ControlPoint, Curve, Extrapolation};
use crate::core::timeseries::align_series;
use crate::error::{AdjustError, Result};
use crate::models::TimeSeries;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod registry;
pub mod water;

/// Per-invocation parameters of a limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitParameters {
    /// Region whose severity series is used
    #[serde(default, alias = "country_code")]
    pub region_code: Option<String>,

    /// Overrides the limit's built-in control points
    #[serde(default)]
    pub list_points: Option<Vec<(f64, f64)>>,

    /// Switches the curve to penalized extrapolation with this slope
    #[serde(default)]
    pub penalty_coefficient: Option<f64>,
}

impl LimitParameters {
    pub fn for_region(region: impl Into<String>) -> Self {
        Self {
            region_code: Some(region.into()),
            ..Self::default()
        }
    }

    pub fn require_region(&self, limit_name: &str) -> Result<&str> {
        self.region_code
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AdjustError::MissingParameter {
                limit: limit_name.to_string(),
                key: "region_code".to_string(),
            })
    }

    /// The curve to use: overridden points if given, else `default_points`.
    pub fn curve(&self, default_points: &[(f64, f64)]) -> Result<Curve> {
        let pairs = self.list_points.as_deref().unwrap_or(default_points);
        let extrapolation = match self.penalty_coefficient {
            Some(coef) => Extrapolation::Penalty(coef),
            None => Extrapolation::Clamp,
        };
        Curve::new(pairs.iter().map(|&p| ControlPoint::from(p)).collect(), extrapolation)
    }
}

#[async_trait]
pub trait LimitImplementor: Send + Sync {
    /// Registry key this instance was built from (e.g. "water_general_wb")
    fn config_name(&self) -> &str;

    /// Name of the limit inside the plan (e.g. "water")
    fn limit_name(&self) -> &str;

    fn curve(&self) -> &Curve;

    /// The limit's severity signal for its configured region.
    async fn fetch_raw_series(&self) -> Result<TimeSeries>;

    /// Adjustment factor for one severity value.
    fn response(&self, point: f64) -> Result<f64> {
        self.curve().evaluate(point)
    }

    /// Limit-adjusted version of `indicator`, on the indicator's years.
    async fn calculate(&self, indicator: &TimeSeries) -> Result<TimeSeries> {
        let severity = self.fetch_raw_series().await?;
        apply_response(indicator, &severity, self.limit_name(), |x| self.response(x))
    }
}

/// `adjusted[y] = response(severity[y]) * indicator[y]` for every indicator
/// year. A missing severity or indicator value gives a missing result; no
/// value is imputed.
pub fn apply_response<F>(
    indicator: &TimeSeries,
    severity: &TimeSeries,
    limit_name: &str,
    response: F,
) -> Result<TimeSeries>
where
    F: Fn(f64) -> Result<f64>,
{
    let mut adjusted = TimeSeries::new(format!("{}_adjusted_{}", indicator.name, limit_name));

    for (year, value, level) in align_series(indicator, severity) {
        let cell = match (value, level) {
            (Some(v), Some(s)) => Some(response(s)? * v),
            _ => None,
        };
        adjusted.insert(year, cell);
    }

    Ok(adjusted)
}
