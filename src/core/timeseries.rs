use crate::models::TimeSeries;

/// Aligns a secondary series onto the years of a base series.
///
/// Yearly data is not forward filled: a year the secondary series does not
/// report stays missing, so absence propagates instead of being imputed.
///
/// Returns a vector of tuples (year, base_value, other_value).
pub fn align_series(base: &TimeSeries, other: &TimeSeries) -> Vec<(i32, Option<f64>, Option<f64>)> {
    base.points
        .iter()
        .map(|(&year, &value)| (year, value, other.get(year)))
        .collect()
}

/// Sum of the present terms, `None` when no term is present.
/// Returns (sum, number_of_missing_terms).
pub fn sum_available(values: &[Option<f64>]) -> (Option<f64>, usize) {
    let missing = values.iter().filter(|v| v.is_none()).count();
    let sum = values
        .iter()
        .flatten()
        .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v));
    (sum, missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_keeps_base_years_only() {
        let base = TimeSeries::from_values("gdp", &[(2018, 1.0), (2019, 2.0), (2020, 3.0)]);
        let other = TimeSeries::from_values("water", &[(2017, 0.1), (2019, 0.2)]);

        let aligned = align_series(&base, &other);
        assert_eq!(
            aligned,
            vec![
                (2018, Some(1.0), None),
                (2019, Some(2.0), Some(0.2)),
                (2020, Some(3.0), None),
            ]
        );
    }

    #[test]
    fn test_sum_available() {
        assert_eq!(sum_available(&[Some(1.0), Some(2.5)]), (Some(3.5), 0));
        assert_eq!(sum_available(&[Some(1.0), None]), (Some(1.0), 1));
        assert_eq!(sum_available(&[None, None]), (None, 2));
        assert_eq!(sum_available(&[]), (None, 0));
    }
}
