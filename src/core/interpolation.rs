//! Piecewise-linear response curves
//!
//! A curve maps a limit's severity value (x) to an adjustment factor (f).
//! Below the first control point the factor is always 1 (no reduction).
//! Above the last control point the behaviour depends on [`Extrapolation`]:
//! plain curves drop to 0, penalized curves keep going along a fixed slope
//! through the last point and may leave [0, 1].

use crate::error::{AdjustError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub f: f64,
}

impl From<(f64, f64)> for ControlPoint {
    fn from((x, f): (f64, f64)) -> Self {
        ControlPoint { x, f }
    }
}

/// What happens past the last control point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Factor is 0 beyond the last point
    Clamp,
    /// Straight line with the given slope through the last point
    Penalty(f64),
}

/// Plain-mode interpolation.
///
/// Precondition: `points` is non-empty and sorted by x ascending. The
/// caller is responsible for that; `None` only comes back when no segment
/// brackets `x`, which a well-formed point list never produces for a
/// finite `x`.
pub fn linear_interpolation(x: f64, points: &[ControlPoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;

    if x < first.x {
        return Some(1.0);
    }
    if x > last.x {
        return Some(0.0);
    }

    points.windows(2).find_map(|w| {
        let (a, b) = (w[0], w[1]);
        if a.x <= x && x <= b.x {
            Some(a.f + (b.f - a.f) * ((x - a.x) / (b.x - a.x)))
        } else {
            None
        }
    })
    // Single-point curve evaluated exactly at its point
    .or_else(|| (points.len() == 1 && x == first.x).then_some(first.f))
}

/// Penalized-extrapolation interpolation.
///
/// Same precondition as [`linear_interpolation`]. Beyond the last point the
/// result is `f_last + penalty_coef * (x - x_last)`, unbounded on purpose.
pub fn linear_interpolation_with_penalty(
    x: f64,
    points: &[ControlPoint],
    penalty_coef: f64,
) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;

    if x < first.x {
        return Some(1.0);
    }

    if let Some(p) = points.iter().find(|p| p.x == x) {
        return Some(p.f);
    }

    if x > last.x {
        return Some(last.f + penalty_coef * (x - last.x));
    }

    points.windows(2).find_map(|w| {
        let (a, b) = (w[0], w[1]);
        if a.x < x && x < b.x {
            Some(a.f + (b.f - a.f) * (x - a.x) / (b.x - a.x))
        } else {
            None
        }
    })
}

/// A validated response curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<ControlPoint>,
    extrapolation: Extrapolation,
}

impl Curve {
    /// Builds a curve, rejecting empty point lists and x values that are
    /// not strictly increasing.
    pub fn new(points: Vec<ControlPoint>, extrapolation: Extrapolation) -> Result<Self> {
        if points.is_empty() {
            return Err(AdjustError::MalformedCurve(
                "at least one control point is required".to_string(),
            ));
        }
        if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.f.is_finite()) {
            return Err(AdjustError::MalformedCurve(format!(
                "non-finite control point ({}, {})",
                p.x, p.f
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[0].x >= w[1].x) {
            return Err(AdjustError::MalformedCurve(format!(
                "x values must be strictly increasing ({} then {})",
                w[0].x, w[1].x
            )));
        }
        Ok(Self {
            points,
            extrapolation,
        })
    }

    pub fn from_pairs(pairs: &[(f64, f64)], extrapolation: Extrapolation) -> Result<Self> {
        Self::new(pairs.iter().map(|&p| p.into()).collect(), extrapolation)
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Adjustment factor for a severity value.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let value = match self.extrapolation {
            Extrapolation::Clamp => linear_interpolation(x, &self.points),
            Extrapolation::Penalty(coef) => linear_interpolation_with_penalty(x, &self.points, coef),
        };
        value.ok_or(AdjustError::CurveGap { x })
    }

    /// Evenly spaced samples for charting the curve.
    ///
    /// The range is widened to cover every control point for plain curves.
    /// Penalized curves keep `sup` as given so the extrapolated tail shows.
    pub fn sample(&self, inf: f64, sup: f64, steps: usize) -> Result<Vec<(f64, f64)>> {
        let first = self.points[0].x;
        let last = self.points[self.points.len() - 1].x;
        let lo = inf.min(first);
        let hi = match self.extrapolation {
            Extrapolation::Clamp => sup.max(last),
            Extrapolation::Penalty(_) => sup,
        };
        if steps < 2 || hi <= lo {
            let x = lo;
            return Ok(vec![(x, self.evaluate(x)?)]);
        }

        let step = (hi - lo) / (steps - 1) as f64;
        (0..steps)
            .map(|i| {
                let x = if i == steps - 1 { hi } else { lo + step * i as f64 };
                self.evaluate(x).map(|f| (x, f))
            })
            .collect()
    }
}
