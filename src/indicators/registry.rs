use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::AdjustError;
use crate::indicators::gdp::GdpIndicator;
use crate::indicators::IndicatorImplementor;

// ============================================================================
// ENUMS
// ============================================================================

/// Closed set of indicators. Adding one means a variant here, an entry in
/// `INDICATORS` and an arm in `Registry::resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorKind {
    Gdp,
}

impl IndicatorKind {
    pub fn slug(&self) -> &'static str {
        match self {
            IndicatorKind::Gdp => "gdp",
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INDICATOR_MAP
            .get(s)
            .and_then(|&idx| INDICATORS.get(idx))
            .map(|meta| meta.kind)
            .ok_or_else(|| AdjustError::UnknownIndicator(s.to_string()))
    }
}

/// Defines how the indicator value should be formatted/displayed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UnitType {
    /// Already in Billions after scaling (e.g., GDP 2780 means $2.78T)
    Billions,
    /// Dimensionless ratio (e.g., withdrawal / available resources)
    Ratio,
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorMetadata {
    pub kind: IndicatorKind,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub source_symbol: String,
    pub unit: UnitType,
    pub frequency: String,
}

// ============================================================================
// STATIC INDICATOR REGISTRY (Lazy initialization, O(1) lookup)
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorMetadata>> = Lazy::new(|| {
    vec![IndicatorMetadata {
        kind: IndicatorKind::Gdp,
        slug: IndicatorKind::Gdp.slug().to_string(),
        name: "Gross Domestic Product".to_string(),
        description: "GDP in current USD, scaled to billions".to_string(),
        source_symbol: GdpIndicator::SERIES_CODE.to_string(),
        unit: UnitType::Billions,
        frequency: "Yearly".to_string(),
    }]
});

/// HashMap for O(1) slug -> index lookup
static INDICATOR_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, ind)| (ind.slug.clone(), idx))
        .collect()
});

// ============================================================================
// REGISTRY STRUCT & IMPL
// ============================================================================

pub struct Registry;

impl Registry {
    /// All registered indicators (for listing)
    pub fn get_all_indicators() -> &'static Vec<IndicatorMetadata> {
        &INDICATORS
    }

    /// O(1) lookup by slug
    pub fn get_metadata(slug: &str) -> Option<IndicatorMetadata> {
        INDICATOR_MAP
            .get(slug)
            .and_then(|&idx| INDICATORS.get(idx))
            .cloned()
    }

    /// Resolves an indicator name, failing fast on unknown names.
    pub fn resolve(indicator_name: &str) -> Result<Box<dyn IndicatorImplementor>, AdjustError> {
        let kind: IndicatorKind = indicator_name.parse()?;
        Ok(Self::build(kind))
    }

    pub fn build(kind: IndicatorKind) -> Box<dyn IndicatorImplementor> {
        match kind {
            IndicatorKind::Gdp => Box::new(GdpIndicator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_listed_and_resolvable() {
        for meta in Registry::get_all_indicators() {
            let implementor = Registry::resolve(&meta.slug).unwrap();
            assert_eq!(implementor.slug(), meta.slug);
            assert_eq!(implementor.series_code(), meta.source_symbol);
        }
    }

    #[test]
    fn test_unknown_indicator() {
        let err = Registry::resolve("gnp").err().unwrap();
        assert_eq!(err, AdjustError::UnknownIndicator("gnp".to_string()));
        assert!(Registry::get_metadata("gnp").is_none());
    }
}
