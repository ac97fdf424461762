use std::sync::Arc;

use crate::config::AdjustmentPlan;
use crate::core::table::{adjusted_column, sub_adjusted_column, sub_column, AdjustedTable};
use crate::core::timeseries::sum_available;
use crate::error::{AdjustError, Result};
use crate::fetcher::DataSource;
use crate::indicators::registry::Registry;
use crate::limits::registry::LimitRegistry;
use crate::limits::LimitImplementor;
use crate::models::TimeSeries;
use tracing::{debug, info, warn};

/// Orchestrator for one region: resolve the indicator, fetch it, adjust it.
pub async fn process_all(
    region_code: &str,
    indicator_name: &str,
    plan: &AdjustmentPlan,
    source: Arc<dyn DataSource>,
) -> Result<AdjustedTable> {
    // 1. Resolve implementation from Registry
    let indicator = Registry::resolve(indicator_name)?;
    info!(
        "Orchestrator: Processing '{}' for {} (Source: {}, Limits: {})",
        indicator.name(),
        region_code,
        source.name(),
        plan.limits.len()
    );

    // 2. Fetch raw indicator series, named after the indicator
    let series = indicator
        .fetch_raw_series(source.as_ref(), region_code)
        .await?
        .renamed(indicator_name);

    // 3. Apply limits
    adjust(&series, plan, source).await
}

/// Runs every limit of `plan` against `indicator` and builds the table.
///
/// Columns, in plan order: the raw indicator, then per limit the weighted
/// sub-indicator `indicator * coefficient` and the adjusted sub-indicator
/// `limit.calculate(indicator)`; last the final adjusted indicator.
///
/// The adjusted sub-indicator is computed from the unweighted indicator
/// (the curve's own output range scales it) unless `plan.weight_adjusted`.
///
/// The final column is the sum of the adjusted terms available for each
/// year. A year with no available term is missing; a year missing some
/// terms is listed in `incomplete_years`. Years where the indicator itself
/// is missing are missing in the total but not listed.
///
/// Any resolution or calculation error aborts the run; no partial table is
/// returned.
pub async fn adjust(
    indicator: &TimeSeries,
    plan: &AdjustmentPlan,
    source: Arc<dyn DataSource>,
) -> Result<AdjustedTable> {
    if plan.limits.is_empty() {
        return Err(AdjustError::InvalidPlan("plan has no limits".to_string()));
    }
    plan.check_coefficients();

    let name = indicator.name.as_str();

    // Resolve every limit before computing anything
    let limits: Vec<(f64, Box<dyn LimitImplementor>)> = plan
        .limits
        .iter()
        .map(|(limit_name, config)| {
            LimitRegistry::resolve(&config.config_name, limit_name, &config.parameters, source.clone())
                .map(|limit| (config.coefficient, limit))
        })
        .collect::<Result<_>>()?;

    let years = indicator.years();
    let column_of = |series: &TimeSeries| -> Vec<Option<f64>> {
        years.iter().map(|&y| series.get(y)).collect()
    };

    let mut table = AdjustedTable::new(name, years.clone());
    table.push_column(name, column_of(indicator));

    let mut adjusted_terms: Vec<Vec<Option<f64>>> = Vec::with_capacity(limits.len());

    for (coefficient, limit) in &limits {
        let sub_indicator = indicator.scaled(*coefficient);

        let mut sub_adjusted = limit.calculate(indicator).await?;
        if plan.weight_adjusted {
            sub_adjusted = sub_adjusted.scaled(*coefficient);
        }

        debug!(
            "Limit '{}' ({}): coefficient {}, {} of {} years adjusted",
            limit.limit_name(),
            limit.config_name(),
            coefficient,
            sub_adjusted.observed_count(),
            years.len()
        );

        let adjusted_values = column_of(&sub_adjusted);
        table.push_column(sub_column(name, limit.limit_name()), column_of(&sub_indicator));
        table.push_column(sub_adjusted_column(name, limit.limit_name()), adjusted_values.clone());
        adjusted_terms.push(adjusted_values);
    }

    // Final aggregate, order independent
    let mut total = Vec::with_capacity(years.len());
    for (row, &year) in years.iter().enumerate() {
        // Nothing to adjust, and no limit to blame
        if indicator.get(year).is_none() {
            total.push(None);
            continue;
        }
        let terms: Vec<Option<f64>> = adjusted_terms.iter().map(|col| col[row]).collect();
        let (sum, missing) = sum_available(&terms);
        if missing > 0 {
            table.incomplete_years.push(year);
        }
        total.push(sum);
    }
    table.push_column(adjusted_column(name), total);

    if !table.incomplete_years.is_empty() {
        warn!(
            "'{}' adjusted from partial limit data in {} year(s): {:?}",
            adjusted_column(name),
            table.incomplete_years.len(),
            table.incomplete_years
        );
    }

    info!("Adjusted '{}' over {} years with {} limit(s)", name, years.len(), limits.len());
    Ok(table)
}
