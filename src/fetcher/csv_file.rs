use async_trait::async_trait;
use crate::models::{RegionTable, TimeSeries};
use super::DataSource;
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads World Bank bulk-download CSV exports from a local directory.
///
/// Files are wide: one row per country, one column per year, preceded by a
/// few lines of preamble. The file for a series is `<data_dir>/<code>.csv`.
pub struct WorldBankCsv {
    data_dir: PathBuf,
}

impl WorldBankCsv {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn path_for(&self, series_code: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", series_code))
    }

    /// Melts the wide year columns and pivots them back by country code.
    pub fn parse_wide_csv<R: std::io::Read>(reader: R, series_code: &str) -> Result<RegionTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut code_col: Option<usize> = None;
        let mut year_cols: Vec<(usize, i32)> = Vec::new();
        let mut table = RegionTable::new();

        for record in rdr.records() {
            let record = record?;

            let Some(code_idx) = code_col else {
                // Preamble ("Data Source", "Last Updated Date", ...) until the header row
                if record.get(0).map(|f| f.trim()) == Some("Country Name") {
                    code_col = record.iter().position(|f| f.trim() == "Country Code");
                    if code_col.is_none() {
                        return Err(anyhow!("Header row has no 'Country Code' column"));
                    }
                    year_cols = record
                        .iter()
                        .enumerate()
                        .filter_map(|(i, f)| f.trim().parse::<i32>().ok().map(|y| (i, y)))
                        .collect();
                }
                continue;
            };

            let Some(code) = record.get(code_idx).map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };

            let series = table
                .entry(code.to_string())
                .or_insert_with(|| TimeSeries::new(series_code));

            for &(idx, year) in &year_cols {
                let value = record
                    .get(idx)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse::<f64>().ok());
                series.insert(year, value);
            }
        }

        if code_col.is_none() {
            return Err(anyhow!("No 'Country Name' header row found"));
        }

        Ok(table)
    }

    fn read_file(path: &Path, series_code: &str) -> Result<RegionTable> {
        info!("Reading World Bank CSV: {}", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        Self::parse_wide_csv(file, series_code)
    }
}

#[async_trait]
impl DataSource for WorldBankCsv {
    fn name(&self) -> &str {
        "worldbank_csv"
    }

    async fn fetch_table(&self, series_code: &str) -> Result<RegionTable> {
        let path = self.path_for(series_code);
        let code = series_code.to_string();
        tokio::task::spawn_blocking(move || Self::read_file(&path, &code)).await?
    }
}
