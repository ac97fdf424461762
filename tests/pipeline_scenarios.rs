use std::sync::Arc;

use planetary_adjuster_lib::config::{AdjustmentPlan, LimitConfig};
use planetary_adjuster_lib::fetcher::memory::StaticSource;
use planetary_adjuster_lib::fetcher::DataSource;
use planetary_adjuster_lib::limits::water::WaterGeneralWbLimit;
use planetary_adjuster_lib::limits::LimitParameters;
use planetary_adjuster_lib::{adjust, process_all, AdjustError, TimeSeries};

const CURVE: [(f64, f64); 5] = [(0.5, 1.0), (0.7, 0.8), (0.8, 0.7), (0.9, 0.5), (1.0, 0.0)];

fn limit(coefficient: f64, region: &str) -> LimitConfig {
    LimitConfig {
        coefficient,
        config_name: "water_general_wb".to_string(),
        parameters: LimitParameters {
            region_code: Some(region.to_string()),
            list_points: Some(CURVE.to_vec()),
            penalty_coefficient: None,
        },
    }
}

/// Water stress published in percent: FRA {2018: 50, 2019: 90}, ESP has a gap.
fn source() -> Arc<dyn DataSource> {
    let mut spain = TimeSeries::from_values("raw", &[(2018, 70.0)]);
    spain.insert(2019, None);

    Arc::new(
        StaticSource::new()
            .with_series(
                WaterGeneralWbLimit::SERIES_CODE,
                "FRA",
                TimeSeries::from_values("raw", &[(2018, 50.0), (2019, 90.0)]),
            )
            .with_series(WaterGeneralWbLimit::SERIES_CODE, "ESP", spain)
            .with_series(
                "NY.GDP.MKTP.CD",
                "FRA",
                TimeSeries::from_values("raw", &[(2018, 100e9), (2019, 200e9)]),
            ),
    )
}

fn indicator() -> TimeSeries {
    TimeSeries::from_values("ind", &[(2018, 100.0), (2019, 200.0)])
}

#[tokio::test]
async fn single_limit_end_to_end() {
    let plan = AdjustmentPlan::default().with_limit("water", limit(1.0, "FRA"));

    let table = adjust(&indicator(), &plan, source()).await.unwrap();

    assert_eq!(table.value("sub_ind_adjusted_water", 2018), Some(100.0));
    assert_eq!(table.value("sub_ind_adjusted_water", 2019), Some(100.0));
    assert_eq!(table.value("ind_adjusted", 2018), Some(100.0));
    assert_eq!(table.value("ind_adjusted", 2019), Some(100.0));
    assert!(table.incomplete_years.is_empty());
}

#[tokio::test]
async fn weighted_sub_indicators_sum_to_indicator() {
    let plan = AdjustmentPlan::default()
        .with_limit("l1", limit(0.6, "FRA"))
        .with_limit("l2", limit(0.4, "FRA"));

    let table = adjust(&indicator(), &plan, source()).await.unwrap();

    for year in [2018, 2019] {
        let l1 = table.value("sub_ind_l1", year).unwrap();
        let l2 = table.value("sub_ind_l2", year).unwrap();
        let raw = table.value("ind", year).unwrap();
        assert!((l1 + l2 - raw).abs() < 1e-9, "year {}: {} + {} != {}", year, l1, l2, raw);
    }
}

#[tokio::test]
async fn unknown_config_returns_no_table() {
    let mut bad = limit(0.5, "FRA");
    bad.config_name = "co2_budget".to_string();
    let plan = AdjustmentPlan::default()
        .with_limit("water", limit(0.5, "FRA"))
        .with_limit("carbon", bad);

    let res = adjust(&indicator(), &plan, source()).await;
    assert_eq!(res.err(), Some(AdjustError::UnknownLimitConfig("co2_budget".to_string())));
}

#[tokio::test]
async fn missing_region_parameter_aborts_run() {
    let mut no_region = limit(1.0, "FRA");
    no_region.parameters.region_code = None;
    let plan = AdjustmentPlan::default().with_limit("water", no_region);

    let res = adjust(&indicator(), &plan, source()).await;
    assert_eq!(
        res.err(),
        Some(AdjustError::MissingParameter {
            limit: "water".to_string(),
            key: "region_code".to_string(),
        })
    );
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let plan = AdjustmentPlan::default()
        .with_limit("l1", limit(0.6, "FRA"))
        .with_limit("l2", limit(0.4, "ESP"));

    let first = adjust(&indicator(), &plan, source()).await.unwrap();
    let second = adjust(&indicator(), &plan, source()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn adjusted_column_scales_with_indicator() {
    let plan = AdjustmentPlan::default().with_limit("water", limit(1.0, "ESP"));
    let base = adjust(&indicator(), &plan, source()).await.unwrap();
    let scaled = adjust(&indicator().scaled(4.0), &plan, source()).await.unwrap();

    let a = base.value("sub_ind_adjusted_water", 2018).unwrap();
    let b = scaled.value("sub_ind_adjusted_water", 2018).unwrap();
    assert!((b - 4.0 * a).abs() < 1e-9);
}

#[tokio::test]
async fn missing_severity_propagates_per_limit() {
    let plan = AdjustmentPlan::default()
        .with_limit("fra", limit(0.5, "FRA"))
        .with_limit("esp", limit(0.5, "ESP"));

    let table = adjust(&indicator(), &plan, source()).await.unwrap();

    // ESP has no 2019 severity: its term is missing whatever the indicator says
    assert_eq!(table.value("sub_ind_adjusted_esp", 2019), None);
    assert_eq!(table.value("sub_ind_esp", 2019), Some(100.0));
    // Total keeps the available FRA term and flags the year
    assert_eq!(table.value("ind_adjusted", 2019), Some(100.0));
    assert_eq!(table.incomplete_years, vec![2019]);

    // 2018: FRA 0.5 -> 1.0, ESP 0.7 -> 0.8
    let total_2018 = table.value("ind_adjusted", 2018).unwrap();
    assert!((total_2018 - 180.0).abs() < 1e-9);
}

#[tokio::test]
async fn default_plan_through_registry() {
    let plan = AdjustmentPlan::default_for("FRA");
    let table = process_all("FRA", "gdp", &plan, source()).await.unwrap();

    assert_eq!(table.indicator_name, "gdp");
    assert_eq!(table.value("gdp", 2018), Some(100.0));
    assert_eq!(table.value("gdp_adjusted", 2019), Some(100.0));

    let window = table.window(Some(2019), None);
    assert_eq!(window.years, vec![2019]);
    assert_eq!(table.years, vec![2018, 2019]);
}

#[tokio::test]
async fn plan_file_round_trip_through_pipeline() {
    let plan = AdjustmentPlan::from_json_str(
        r#"{
            "water": {"coef": 0.5, "config": "water_general_wb", "dict_parameters": {"country_code": "FRA"}},
            "water_es": {"coefficient": 0.5, "config_name": "water_general_wb", "parameters": {"region_code": "ESP"}}
        }"#,
    )
    .unwrap();

    let table = adjust(&indicator(), &plan, source()).await.unwrap();
    let layers = table.stacked(&plan);
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1].label, "water_es");
    assert_eq!(layers[1].sub, vec![Some(100.0), Some(200.0)]);
}

#[tokio::test]
async fn indicator_gap_is_not_a_limit_gap() {
    let mut indicator = TimeSeries::from_values("ind", &[(2018, 100.0)]);
    indicator.insert(2019, None);
    let plan = AdjustmentPlan::default().with_limit("water", limit(1.0, "FRA"));

    let table = adjust(&indicator, &plan, source()).await.unwrap();

    assert_eq!(table.years, vec![2018, 2019]);
    assert_eq!(table.value("ind_adjusted", 2018), Some(100.0));
    assert_eq!(table.value("sub_ind_adjusted_water", 2019), None);
    assert_eq!(table.value("ind_adjusted", 2019), None);
    // FRA has 2019 severity, so no limit lacked data
    assert!(table.incomplete_years.is_empty());
}
