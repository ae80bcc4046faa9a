//! Country data loading and normalization.
//!
//! Two independent sources (catalog + GDP mapping) are fetched, the catalog
//! is filtered, GDP is joined by country code with a population-based
//! estimate as fallback, and the result must hold at least two countries.

use std::collections::HashMap;

use async_trait::async_trait;
use countries_client::{CountriesClient, RawCountry};
use geoduel_common::config::FilterConfig;
use geoduel_common::Country;
use tracing::info;

use crate::error::DataError;
use crate::session::Roster;

// ---------------------------------------------------------------------------
// CountrySource: the two external fetches
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Raw catalog entries, unfiltered.
    async fn catalog(&self) -> Result<Vec<RawCountry>, DataError>;

    /// GDP in current USD keyed by country code.
    async fn gdp_by_code(&self) -> Result<HashMap<String, f64>, DataError>;
}

#[async_trait]
impl CountrySource for CountriesClient {
    async fn catalog(&self) -> Result<Vec<RawCountry>, DataError> {
        Ok(self.fetch_catalog().await?)
    }

    async fn gdp_by_code(&self) -> Result<HashMap<String, f64>, DataError> {
        Ok(self.fetch_gdp().await?)
    }
}

/// In-memory source. No network; used by tests and offline fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub catalog: Vec<RawCountry>,
    pub gdp: HashMap<String, f64>,
    /// When set, both fetches fail with this message.
    pub failure: Option<String>,
}

impl StaticSource {
    pub fn new(catalog: Vec<RawCountry>, gdp: HashMap<String, f64>) -> Self {
        Self {
            catalog,
            gdp,
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CountrySource for StaticSource {
    async fn catalog(&self) -> Result<Vec<RawCountry>, DataError> {
        match &self.failure {
            Some(message) => Err(DataError::SourceUnavailable(message.clone())),
            None => Ok(self.catalog.clone()),
        }
    }

    async fn gdp_by_code(&self) -> Result<HashMap<String, f64>, DataError> {
        match &self.failure {
            Some(message) => Err(DataError::SourceUnavailable(message.clone())),
            None => Ok(self.gdp.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// GDP estimation
// ---------------------------------------------------------------------------

/// Fallback GDP for countries the GDP source does not cover.
pub trait GdpEstimator: Send + Sync {
    fn estimate(&self, population: u64) -> f64;
}

/// `population × usd_per_person`.
#[derive(Debug, Clone, Copy)]
pub struct PerCapita(pub f64);

impl GdpEstimator for PerCapita {
    fn estimate(&self, population: u64) -> f64 {
        population as f64 * self.0
    }
}

impl<F> GdpEstimator for F
where
    F: Fn(u64) -> f64 + Send + Sync,
{
    fn estimate(&self, population: u64) -> f64 {
        self(population)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Keep entries with population and area above the minimums (both
/// exclusive), a non-empty name, and a flag image. GDP is left at 0.
pub fn filter_catalog(catalog: &[RawCountry], filters: &FilterConfig) -> Vec<Country> {
    catalog
        .iter()
        .filter_map(|raw| {
            let population = raw.population.filter(|p| *p > filters.min_population)?;
            let area = raw.area.filter(|a| *a > filters.min_area)?;
            let name = raw.common_name()?;
            let flag = raw.flag_url()?;
            Some(Country {
                name: name.to_string(),
                population,
                area,
                gdp: 0.0,
                flag: flag.to_string(),
                code: raw.code().to_string(),
            })
        })
        .collect()
}

/// Join GDP by code, estimating where missing, and drop anything still at 0.
pub fn merge_gdp(
    countries: Vec<Country>,
    gdp: &HashMap<String, f64>,
    estimator: &dyn GdpEstimator,
) -> Vec<Country> {
    countries
        .into_iter()
        .map(|mut country| {
            let known = if country.code.is_empty() {
                None
            } else {
                gdp.get(&country.code).copied()
            };
            country.gdp = match known.filter(|v| v.is_finite() && *v > 0.0) {
                Some(value) => value,
                None => estimator.estimate(country.population),
            };
            country
        })
        .filter(|country| country.gdp.is_finite() && country.gdp > 0.0)
        .collect()
}

// ---------------------------------------------------------------------------
// DataProvider
// ---------------------------------------------------------------------------

pub struct DataProvider<S: CountrySource> {
    source: S,
    filters: FilterConfig,
    estimator: Box<dyn GdpEstimator>,
}

impl<S: CountrySource> DataProvider<S> {
    pub fn new(source: S, filters: FilterConfig) -> Self {
        let estimator = Box::new(PerCapita(filters.gdp_per_capita_estimate));
        Self {
            source,
            filters,
            estimator,
        }
    }

    pub fn with_estimator(mut self, estimator: impl GdpEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// Fetch, filter, merge. No retries; the first failure is returned.
    pub async fn load(&self) -> Result<Roster, DataError> {
        let (catalog, gdp) = tokio::try_join!(self.source.catalog(), self.source.gdp_by_code())?;

        let filtered = filter_catalog(&catalog, &self.filters);
        info!(
            fetched = catalog.len(),
            kept = filtered.len(),
            "Filtered country catalog"
        );

        let merged = merge_gdp(filtered, &gdp, self.estimator.as_ref());
        info!(count = merged.len(), gdp_entries = gdp.len(), "Merged GDP data");

        Roster::new(merged)
    }
}
