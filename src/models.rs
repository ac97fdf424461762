use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One yearly observation. `value == None` marks a missing observation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub year: i32,
    pub value: Option<f64>,
}

/// A named yearly series for a single region.
///
/// Years are kept in a BTreeMap so they are always strictly increasing;
/// gaps between years are allowed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TimeSeries {
    pub name: String,
    pub points: BTreeMap<i32, Option<f64>>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn from_points(name: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            points: points.into_iter().map(|dp| (dp.year, dp.value)).collect(),
        }
    }

    /// Convenience for fully observed series, mostly used by tests and demos.
    pub fn from_values(name: impl Into<String>, values: &[(i32, f64)]) -> Self {
        Self {
            name: name.into(),
            points: values.iter().map(|&(y, v)| (y, Some(v))).collect(),
        }
    }

    pub fn insert(&mut self, year: i32, value: Option<f64>) {
        self.points.insert(year, value);
    }

    /// Value at `year`; `None` when the year is absent or the value is missing.
    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied().flatten()
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = DataPoint> + '_ {
        self.points
            .iter()
            .map(|(&year, &value)| DataPoint { year, value })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Applies `f` to every present value, missing stays missing.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> TimeSeries {
        TimeSeries {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .map(|(&y, v)| (y, v.map(&f)))
                .collect(),
        }
    }

    pub fn scaled(&self, factor: f64) -> TimeSeries {
        self.map_values(|x| x * factor)
    }

    pub fn renamed(mut self, name: impl Into<String>) -> TimeSeries {
        self.name = name.into();
        self
    }

    /// Number of years carrying an actual value.
    pub fn observed_count(&self) -> usize {
        self.points.values().filter(|v| v.is_some()).count()
    }
}

/// Region code -> series, the shape every data-source adapter produces.
pub type RegionTable = BTreeMap<String, TimeSeries>;
