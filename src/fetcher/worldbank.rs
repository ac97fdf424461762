use async_trait::async_trait;
use crate::models::{RegionTable, TimeSeries};
use super::{DataSource, RegionMissing};
use anyhow::{Result, anyhow};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://api.worldbank.org/v2";

pub struct WorldBankFetcher {
    client: Client,
    api_base: String,
}

impl WorldBankFetcher {
    pub fn new(api_base: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("PlanetaryAdjuster/0.1"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        info!("Fetching World Bank Data: {}", url);

        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(anyhow!("World Bank API Error: {}", resp.status()));
        }

        Ok(resp.json().await?)
    }

    /// Parses a v2 API response into one series per `countryiso3code`.
    ///
    /// The API returns an array: [Metadata, [Data...]]. Null values are kept
    /// as missing years rather than dropped.
    fn parse_observations(json: &Value, series_code: &str) -> Result<RegionTable> {
        if let Some(message) = json
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|meta| meta.get("message"))
        {
            return Err(anyhow!("World Bank API rejected request: {}", message));
        }

        let data_array = json.as_array()
            .and_then(|arr| arr.get(1))
            .and_then(|val| val.as_array())
            .ok_or_else(|| anyhow!("Invalid World Bank API response format"))?;

        let mut table = RegionTable::new();

        for obs in data_array {
            let region = obs["countryiso3code"]
                .as_str()
                .filter(|c| !c.is_empty())
                .or_else(|| obs["country"]["id"].as_str());
            let year = obs["date"].as_str().and_then(|d| d.trim().parse::<i32>().ok());

            let (Some(region), Some(year)) = (region, year) else {
                debug!("Skipping World Bank observation without region/year: {}", obs);
                continue;
            };

            // Value is usually a number, sometimes a string "123.45"
            let value = match &obs["value"] {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };

            table
                .entry(region.to_string())
                .or_insert_with(|| TimeSeries::new(series_code))
                .insert(year, value);
        }

        Ok(table)
    }

    /// Number of pages announced in the response metadata; 1 when absent.
    fn page_count(json: &Value) -> u32 {
        let pages = &json[0]["pages"];
        pages
            .as_u64()
            .map(|p| p as u32)
            .or_else(|| pages.as_str().and_then(|p| p.parse().ok()))
            .unwrap_or(1)
    }

    /// Fetches every page of `url` and merges the observations.
    async fn fetch_pages(&self, url: &str, series_code: &str) -> Result<RegionTable> {
        let first = self.get_json(&format!("{}&page=1", url)).await?;
        let pages = Self::page_count(&first);
        let mut table = Self::parse_observations(&first, series_code)?;

        if pages > 1 {
            info!("World Bank series {} spans {} pages", series_code, pages);
        }
        for page in 2..=pages {
            let json = self.get_json(&format!("{}&page={}", url, page)).await?;
            merge_tables(&mut table, Self::parse_observations(&json, series_code)?);
        }

        Ok(table)
    }
}

fn merge_tables(into: &mut RegionTable, other: RegionTable) {
    for (region, series) in other {
        let target = into
            .entry(region)
            .or_insert_with(|| TimeSeries::new(series.name.clone()));
        for (year, value) in series.points {
            target.insert(year, value);
        }
    }
}

#[async_trait]
impl DataSource for WorldBankFetcher {
    fn name(&self) -> &str {
        "worldbank"
    }

    async fn fetch_table(&self, series_code: &str) -> Result<RegionTable> {
        let url = format!(
            "{}/country/all/indicator/{}?format=json&per_page=20000",
            self.api_base, series_code
        );
        self.fetch_pages(&url, series_code).await
    }

    async fn fetch_region(&self, series_code: &str, region: &str) -> Result<TimeSeries> {
        let url = format!(
            "{}/country/{}/indicator/{}?format=json&per_page=1000",
            self.api_base, region, series_code
        );
        let mut table = self.fetch_pages(&url, series_code).await?;

        table
            .remove(region)
            .ok_or_else(|| anyhow!(RegionMissing(region.to_string())))
    }
}
