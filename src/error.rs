use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdjustError>;

/// Everything that can abort an adjustment run.
///
/// None of these are retried: the computation is deterministic, so a second
/// attempt with the same inputs fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjustError {
    /// Indicator name not present in the indicator registry
    #[error("Indicator configuration not found: '{0}'")]
    UnknownIndicator(String),

    /// Limit config name not present in the limit registry
    #[error("Limit configuration not found: '{0}'")]
    UnknownLimitConfig(String),

    /// A limit variant needs a parameter the plan did not supply
    #[error("Parameter '{key}' not specified for limit: {limit}")]
    MissingParameter { limit: String, key: String },

    /// Control points are empty or not strictly increasing in x
    #[error("Malformed response curve: {0}")]
    MalformedCurve(String),

    /// No segment of the curve brackets the evaluated point
    #[error("No curve segment brackets x = {x}")]
    CurveGap { x: f64 },

    /// The source has no series for the requested region
    #[error("Region '{region}' not found in series '{series}'")]
    UnknownRegion { region: String, series: String },

    /// Fetching or parsing raw data failed
    #[error("Data source '{source_name}' failed for series '{series}': {message}")]
    DataSource {
        source_name: String,
        series: String,
        message: String,
    },

    /// Plan file could not be understood
    #[error("Invalid adjustment plan: {0}")]
    InvalidPlan(String),
}

impl AdjustError {
    pub fn data_source(source_name: &str, series: &str, err: anyhow::Error) -> Self {
        AdjustError::DataSource {
            source_name: source_name.to_string(),
            series: series.to_string(),
            message: format!("{:#}", err),
        }
    }
}
