//! Adjustment plans and run settings

use crate::error::{AdjustError, Result};
use crate::limits::water::WaterGeneralWbLimit;
use crate::limits::LimitParameters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

const COEFFICIENT_SUM_TOLERANCE: f64 = 1e-9;

/// One limit of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitConfig {
    /// Share of the indicator attributed to this limit, in [0, 1]
    #[serde(alias = "coef")]
    pub coefficient: f64,

    /// Registry key of the limit implementation
    #[serde(alias = "config")]
    pub config_name: String,

    #[serde(default, alias = "dict_parameters")]
    pub parameters: LimitParameters,
}

/// Ordered set of named limits applied in one run.
///
/// Order only changes column layout; the final sum does not depend on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdjustmentPlan {
    pub limits: Vec<(String, LimitConfig)>,
    /// Also scale the adjusted sub-indicator by the coefficient.
    /// Off by default: the coefficient only weights the unadjusted column.
    pub weight_adjusted: bool,
}

impl AdjustmentPlan {
    /// A single water-stress limit carrying the whole indicator.
    pub fn default_for(region_code: &str) -> Self {
        Self {
            limits: vec![(
                "water".to_string(),
                LimitConfig {
                    coefficient: 1.0,
                    config_name: WaterGeneralWbLimit::CONFIG_NAME.to_string(),
                    parameters: LimitParameters::for_region(region_code),
                },
            )],
            weight_adjusted: false,
        }
    }

    pub fn with_limit(mut self, name: &str, config: LimitConfig) -> Self {
        self.limits.push((name.to_string(), config));
        self
    }

    pub fn limit_names(&self) -> impl Iterator<Item = &str> {
        self.limits.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&LimitConfig> {
        self.limits.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Parses a plan.
    ///
    /// Two shapes are accepted, both keeping the declared order:
    /// `{"water": {...}, "land": {...}}` or
    /// `{"weight_adjusted": true, "limits": {"water": {...}}}`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| AdjustError::InvalidPlan(e.to_string()))?;
        let Value::Object(mut root) = value else {
            return Err(AdjustError::InvalidPlan("plan must be a JSON object".to_string()));
        };

        // A bare plan may name a limit "limits"; its value then holds
        // scalar fields, whereas the wrapped form holds one object per limit.
        let wrapped = matches!(root.get("weight_adjusted"), Some(Value::Bool(_)))
            || matches!(root.get("limits"), Some(Value::Object(m)) if m.values().all(Value::is_object));

        let (limits_obj, weight_adjusted) = match wrapped.then(|| root.remove("limits")).flatten() {
            Some(Value::Object(limits)) => {
                let weight_adjusted = match root.remove("weight_adjusted") {
                    None => false,
                    Some(Value::Bool(b)) => b,
                    Some(other) => {
                        return Err(AdjustError::InvalidPlan(format!(
                            "weight_adjusted must be a boolean, got {}",
                            other
                        )))
                    }
                };
                if let Some(key) = root.keys().next() {
                    return Err(AdjustError::InvalidPlan(format!("unexpected key '{}'", key)));
                }
                (limits, weight_adjusted)
            }
            Some(_) => return Err(AdjustError::InvalidPlan("'limits' must be an object".to_string())),
            None if wrapped => {
                return Err(AdjustError::InvalidPlan("'weight_adjusted' given without 'limits'".to_string()))
            }
            None => (root, false),
        };

        let mut limits = Vec::with_capacity(limits_obj.len());
        for (name, raw) in limits_obj {
            let config: LimitConfig = serde_json::from_value(raw)
                .map_err(|e| AdjustError::InvalidPlan(format!("limit '{}': {}", name, e)))?;
            limits.push((name, config));
        }

        Ok(Self { limits, weight_adjusted })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AdjustError::InvalidPlan(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Logs (does not reject) plans whose coefficients are out of range or
    /// do not add up to 1. Returns the coefficient sum.
    pub fn check_coefficients(&self) -> f64 {
        for (name, config) in &self.limits {
            if !(0.0..=1.0).contains(&config.coefficient) {
                warn!("Coefficient of limit '{}' is outside [0, 1]: {}", name, config.coefficient);
            }
        }
        let sum: f64 = self.limits.iter().map(|(_, c)| c.coefficient).sum();
        if (sum - 1.0).abs() > COEFFICIENT_SUM_TOLERANCE {
            warn!("Limit coefficients sum to {} instead of 1.0", sum);
        }
        sum
    }
}

/// Where raw series come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// World Bank v2 JSON API
    Worldbank,
    /// World Bank bulk CSV exports in the data directory
    Csv,
}

/// Settings shared by every subcommand, resolved from flags, the
/// environment and `.env`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceKind,
    pub data_dir: PathBuf,
    pub api_base: String,
}
