use super::IndicatorImplementor;

/// GDP in billions of current USD (World Bank NY.GDP.MKTP.CD).
pub struct GdpIndicator;

impl GdpIndicator {
    pub const SERIES_CODE: &'static str = "NY.GDP.MKTP.CD";
    /// Source is in USD
    pub const UNIT_DIVISOR: f64 = 1e9;
}

impl IndicatorImplementor for GdpIndicator {
    fn slug(&self) -> &str {
        "gdp"
    }

    fn name(&self) -> &str {
        "GDP (current USD, billions)"
    }

    fn series_code(&self) -> &str {
        Self::SERIES_CODE
    }

    fn unit_divisor(&self) -> f64 {
        Self::UNIT_DIVISOR
    }
}
