use crate::config::AdjustmentPlan;
use serde::Serialize;

/// Name of the weighted, unadjusted share of `indicator` for `limit`.
pub fn sub_column(indicator: &str, limit: &str) -> String {
    format!("sub_{}_{}", indicator, limit)
}

/// Name of the limit-adjusted share of `indicator` for `limit`.
pub fn sub_adjusted_column(indicator: &str, limit: &str) -> String {
    format!("sub_{}_adjusted_{}", indicator, limit)
}

pub fn adjusted_column(indicator: &str) -> String {
    format!("{}_adjusted", indicator)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// One row per indicator year; columns in the order the pipeline wrote them:
/// the raw indicator, a sub / adjusted-sub pair per limit, the final
/// adjusted indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedTable {
    pub indicator_name: String,
    pub years: Vec<i32>,
    pub columns: Vec<Column>,
    /// Years where at least one limit had no adjusted value
    pub incomplete_years: Vec<i32>,
}

/// Cumulative per-limit series for stacked charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedLayer {
    pub label: String,
    pub sub: Vec<Option<f64>>,
    pub sub_adjusted: Vec<Option<f64>>,
}

impl AdjustedTable {
    pub fn new(indicator_name: impl Into<String>, years: Vec<i32>) -> Self {
        Self {
            indicator_name: indicator_name.into(),
            years,
            columns: Vec::new(),
            incomplete_years: Vec::new(),
        }
    }

    /// Appends a column; `values` must have one cell per year.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.years.len());
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell lookup; `None` for unknown column/year or a missing value.
    pub fn value(&self, column: &str, year: i32) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        self.column(column)?.get(row).copied().flatten()
    }

    pub fn adjusted(&self) -> Option<&[Option<f64>]> {
        self.column(&adjusted_column(&self.indicator_name))
    }

    pub fn row(&self, index: usize) -> Vec<Option<f64>> {
        self.columns.iter().map(|c| c.values[index]).collect()
    }

    /// Copy restricted to `from..=to`; either bound may be open.
    pub fn window(&self, from: Option<i32>, to: Option<i32>) -> AdjustedTable {
        let keep: Vec<usize> = self
            .years
            .iter()
            .enumerate()
            .filter(|&(_, &y)| from.map_or(true, |f| y >= f) && to.map_or(true, |t| y <= t))
            .map(|(i, _)| i)
            .collect();

        AdjustedTable {
            indicator_name: self.indicator_name.clone(),
            years: keep.iter().map(|&i| self.years[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: keep.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
            incomplete_years: self
                .incomplete_years
                .iter()
                .copied()
                .filter(|&y| from.map_or(true, |f| y >= f) && to.map_or(true, |t| y <= t))
                .collect(),
        }
    }

    /// First and last year whose row has no missing cell.
    pub fn complete_year_range(&self) -> Option<(i32, i32)> {
        let complete: Vec<i32> = (0..self.years.len())
            .filter(|&i| self.columns.iter().all(|c| c.values[i].is_some()))
            .map(|i| self.years[i])
            .collect();
        Some((*complete.first()?, *complete.last()?))
    }

    /// Running totals over the plan's limits: layer k holds the sum of the
    /// sub-indicators (and adjusted sub-indicators) of limits 0..=k.
    /// A missing addend makes the running total missing from there on.
    pub fn stacked(&self, plan: &AdjustmentPlan) -> Vec<StackedLayer> {
        let n = self.years.len();
        let mut layers: Vec<StackedLayer> = Vec::with_capacity(plan.limits.len());

        for name in plan.limit_names() {
            let sub = self.column(&sub_column(&self.indicator_name, name));
            let sub_adjusted = self.column(&sub_adjusted_column(&self.indicator_name, name));
            let (Some(sub), Some(sub_adjusted)) = (sub, sub_adjusted) else {
                continue;
            };

            let (prev_sub, prev_adj) = match layers.last() {
                Some(layer) => (layer.sub.clone(), layer.sub_adjusted.clone()),
                None => (vec![Some(0.0); n], vec![Some(0.0); n]),
            };

            layers.push(StackedLayer {
                label: name.to_string(),
                sub: add_cells(&prev_sub, sub),
                sub_adjusted: add_cells(&prev_adj, sub_adjusted),
            });
        }

        layers
    }

    /// Writes the table as CSV with a leading `year` column.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["year".to_string()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        wtr.write_record(&header)?;

        for (i, year) in self.years.iter().enumerate() {
            let mut record = vec![year.to_string()];
            record.extend(
                self.columns
                    .iter()
                    .map(|c| c.values[i].map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn add_cells(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x + y),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitConfig;
    use crate::limits::LimitParameters;

    fn sample_table() -> AdjustedTable {
        let mut table = AdjustedTable::new("gdp", vec![2017, 2018, 2019, 2020]);
        table.push_column("gdp", vec![Some(50.0), Some(100.0), Some(200.0), Some(300.0)]);
        table.push_column("sub_gdp_water", vec![Some(30.0), Some(60.0), Some(120.0), Some(180.0)]);
        table.push_column("sub_gdp_adjusted_water", vec![None, Some(100.0), Some(100.0), None]);
        table.push_column("sub_gdp_land", vec![Some(20.0), Some(40.0), Some(80.0), Some(120.0)]);
        table.push_column("sub_gdp_adjusted_land", vec![Some(50.0), Some(90.0), Some(150.0), None]);
        table.push_column("gdp_adjusted", vec![Some(50.0), Some(190.0), Some(250.0), None]);
        table.incomplete_years = vec![2017, 2020];
        table
    }

    fn plan() -> AdjustmentPlan {
        let limit = |coefficient| LimitConfig {
            coefficient,
            config_name: "water_general_wb".to_string(),
            parameters: LimitParameters::for_region("FRA"),
        };
        AdjustmentPlan::default()
            .with_limit("water", limit(0.6))
            .with_limit("land", limit(0.4))
    }

    #[test]
    fn test_lookup() {
        let table = sample_table();
        assert_eq!(table.value("gdp", 2019), Some(200.0));
        assert_eq!(table.value("sub_gdp_adjusted_water", 2017), None);
        assert_eq!(table.value("gdp", 1990), None);
        assert_eq!(table.adjusted().unwrap()[1], Some(190.0));
        assert_eq!(table.row(1), vec![Some(100.0), Some(60.0), Some(100.0), Some(40.0), Some(90.0), Some(190.0)]);
    }

    #[test]
    fn test_window_copies_and_filters() {
        let table = sample_table();
        let window = table.window(Some(2018), Some(2019));
        assert_eq!(window.years, vec![2018, 2019]);
        assert_eq!(window.column("gdp").unwrap(), &[Some(100.0), Some(200.0)]);
        assert!(window.incomplete_years.is_empty());
        // Source untouched
        assert_eq!(table.years.len(), 4);

        assert_eq!(table.window(None, Some(2017)).years, vec![2017]);
        assert_eq!(table.window(Some(2020), None).incomplete_years, vec![2020]);
    }

    #[test]
    fn test_complete_year_range() {
        assert_eq!(sample_table().complete_year_range(), Some((2018, 2019)));
        let empty = AdjustedTable::new("gdp", vec![]);
        assert_eq!(empty.complete_year_range(), None);
    }

    #[test]
    fn test_stacked_layers() {
        let layers = sample_table().stacked(&plan());
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].label, "water");
        assert_eq!(layers[0].sub[1], Some(60.0));
        assert_eq!(layers[1].label, "land");
        assert_eq!(layers[1].sub, vec![Some(50.0), Some(100.0), Some(200.0), Some(300.0)]);
        assert_eq!(layers[1].sub_adjusted, vec![None, Some(190.0), Some(250.0), None]);
    }

    #[test]
    fn test_write_csv() {
        let table = sample_table().window(Some(2017), Some(2017));
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "year,gdp,sub_gdp_water,sub_gdp_adjusted_water,sub_gdp_land,sub_gdp_adjusted_land,gdp_adjusted\n\
             2017,50,30,,20,50,50\n"
        );
    }
}
