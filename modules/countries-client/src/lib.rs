pub mod error;
pub mod types;

pub use error::{CountriesError, Result};
pub use types::{parse_catalog, parse_gdp, CountryName, Flags, GdpCountryRef, GdpRow, RawCountry};

use std::collections::HashMap;
use std::time::Duration;

/// Read-only client for the two country data sources.
pub struct CountriesClient {
    client: reqwest::Client,
    countries_url: String,
    gdp_url: String,
}

impl CountriesClient {
    pub fn new(countries_url: &str, gdp_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            countries_url: countries_url.to_string(),
            gdp_url: gdp_url.to_string(),
        })
    }

    /// Fetch the raw country catalog.
    pub async fn fetch_catalog(&self) -> Result<Vec<RawCountry>> {
        tracing::info!(url = %self.countries_url, "Fetching country catalog");
        let body = self.get_text(&self.countries_url).await?;
        let catalog = parse_catalog(&body)?;
        tracing::info!(count = catalog.len(), "Fetched country catalog");
        Ok(catalog)
    }

    /// Fetch GDP values keyed by country code.
    pub async fn fetch_gdp(&self) -> Result<HashMap<String, f64>> {
        tracing::info!(url = %self.gdp_url, "Fetching GDP indicator");
        let body = self.get_text(&self.gdp_url).await?;
        let gdp = parse_gdp(&body)?;
        tracing::info!(count = gdp.len(), "Fetched GDP indicator");
        Ok(gdp)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CountriesError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.text().await?)
    }
}
