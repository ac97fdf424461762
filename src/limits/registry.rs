use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::AdjustError;
use crate::fetcher::DataSource;
use crate::indicators::registry::UnitType;
use crate::limits::water::WaterGeneralWbLimit;
use crate::limits::{LimitImplementor, LimitParameters};

/// Closed set of limit configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LimitKind {
    WaterGeneralWb,
}

impl LimitKind {
    pub fn config_name(&self) -> &'static str {
        match self {
            LimitKind::WaterGeneralWb => WaterGeneralWbLimit::CONFIG_NAME,
        }
    }

    /// Built-in control points of the variant
    pub fn default_points(&self) -> &'static [(f64, f64)] {
        match self {
            LimitKind::WaterGeneralWb => &WaterGeneralWbLimit::DEFAULT_POINTS,
        }
    }
}

impl FromStr for LimitKind {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LIMIT_MAP
            .get(s)
            .and_then(|&idx| LIMITS.get(idx))
            .map(|meta| meta.kind)
            .ok_or_else(|| AdjustError::UnknownLimitConfig(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitMetadata {
    pub kind: LimitKind,
    pub config_name: String,
    pub name: String,
    pub description: String,
    pub source_symbol: String,
    pub unit: UnitType,
}

static LIMITS: Lazy<Vec<LimitMetadata>> = Lazy::new(|| {
    vec![LimitMetadata {
        kind: LimitKind::WaterGeneralWb,
        config_name: LimitKind::WaterGeneralWb.config_name().to_string(),
        name: "Water stress".to_string(),
        description: "Freshwater withdrawal as a share of available freshwater resources".to_string(),
        source_symbol: WaterGeneralWbLimit::SERIES_CODE.to_string(),
        unit: UnitType::Ratio,
    }]
});

static LIMIT_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    LIMITS
        .iter()
        .enumerate()
        .map(|(idx, lim)| (lim.config_name.clone(), idx))
        .collect()
});

pub struct LimitRegistry;

impl LimitRegistry {
    pub fn get_all_limits() -> &'static Vec<LimitMetadata> {
        &LIMITS
    }

    pub fn get_metadata(config_name: &str) -> Option<LimitMetadata> {
        LIMIT_MAP
            .get(config_name)
            .and_then(|&idx| LIMITS.get(idx))
            .cloned()
    }

    /// Builds a fresh limit instance. Either the whole construction
    /// succeeds or an error comes back; nothing is half-built.
    pub fn resolve(
        config_name: &str,
        limit_name: &str,
        parameters: &LimitParameters,
        source: Arc<dyn DataSource>,
    ) -> Result<Box<dyn LimitImplementor>, AdjustError> {
        let kind: LimitKind = config_name.parse()?;
        match kind {
            LimitKind::WaterGeneralWb => Ok(Box::new(WaterGeneralWbLimit::new(limit_name, parameters, source)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::memory::StaticSource;

    #[test]
    fn test_resolve_known_config() {
        let limit = LimitRegistry::resolve(
            "water_general_wb",
            "water",
            &LimitParameters::for_region("FRA"),
            Arc::new(StaticSource::new()),
        )
        .unwrap();
        assert_eq!(limit.config_name(), "water_general_wb");
        assert_eq!(limit.limit_name(), "water");
        assert_eq!(limit.curve().points().len(), LimitKind::WaterGeneralWb.default_points().len());
    }

    #[test]
    fn test_resolve_unknown_config() {
        let err = LimitRegistry::resolve(
            "water_regional",
            "water",
            &LimitParameters::for_region("FRA"),
            Arc::new(StaticSource::new()),
        )
        .err()
        .unwrap();
        assert_eq!(err, AdjustError::UnknownLimitConfig("water_regional".to_string()));
    }

    #[test]
    fn test_resolve_rejects_bad_curve_override() {
        let params = LimitParameters {
            list_points: Some(vec![]),
            ..LimitParameters::for_region("FRA")
        };
        let res = LimitRegistry::resolve("water_general_wb", "water", &params, Arc::new(StaticSource::new()));
        assert!(matches!(res, Err(AdjustError::MalformedCurve(_))));
    }

    #[test]
    fn test_listing_matches_kinds() {
        for meta in LimitRegistry::get_all_limits() {
            assert_eq!(meta.config_name.parse::<LimitKind>().unwrap(), meta.kind);
            assert!(LimitRegistry::get_metadata(&meta.config_name).is_some());
        }
    }
}
