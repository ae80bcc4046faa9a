use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{CountriesError, Result};

// --- REST Countries catalog ---

/// A single catalog entry as returned by `restcountries.com/v3.1/all`.
/// Every field is optional; validation happens in the data provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCountry {
    pub name: Option<CountryName>,
    pub population: Option<u64>,
    pub area: Option<f64>,
    pub flags: Option<Flags>,
    pub cca2: Option<String>,
    pub cca3: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryName {
    pub common: Option<String>,
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Flags {
    pub png: Option<String>,
    pub svg: Option<String>,
    pub alt: Option<String>,
}

impl RawCountry {
    /// Trimmed common name, if present and non-empty.
    pub fn common_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(|n| n.common.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// PNG flag URL, SVG fallback.
    pub fn flag_url(&self) -> Option<&str> {
        let flags = self.flags.as_ref()?;
        flags
            .png
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| flags.svg.as_deref().filter(|u| !u.is_empty()))
    }

    /// Alpha-3 code, alpha-2 fallback, empty string when neither is present.
    pub fn code(&self) -> &str {
        self.cca3
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.cca2.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or("")
    }
}

/// Parse the catalog body. Anything other than a JSON array is an error.
pub fn parse_catalog(body: &str) -> Result<Vec<RawCountry>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(CountriesError::Shape(
            "country catalog is not a JSON array".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

// --- World Bank GDP indicator ---

/// One row of the `NY.GDP.MKTP.CD` indicator response.
#[derive(Debug, Clone, Deserialize)]
pub struct GdpRow {
    pub country: Option<GdpCountryRef>,
    pub countryiso3code: Option<String>,
    pub date: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GdpCountryRef {
    pub id: String,
    pub value: Option<String>,
}

/// Parse a World Bank body (`[meta, rows]`) into code → GDP.
///
/// Each row is keyed by both its ISO3 code and the inner `country.id`, so the
/// mapping joins against either alpha-3 or alpha-2 catalog codes. Rows with a
/// null value are skipped.
pub fn parse_gdp(body: &str) -> Result<HashMap<String, f64>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let rows = value
        .get(1)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            CountriesError::Shape("GDP response is missing its data array".to_string())
        })?;

    let mut gdp = HashMap::with_capacity(rows.len() * 2);
    for row in rows {
        let row: GdpRow = match serde_json::from_value(row.clone()) {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable GDP row");
                continue;
            }
        };
        let Some(amount) = row.value else { continue };

        if let Some(iso3) = row.countryiso3code.filter(|c| !c.is_empty()) {
            gdp.insert(iso3, amount);
        }
        if let Some(country) = row.country.filter(|c| !c.id.is_empty()) {
            gdp.entry(country.id).or_insert(amount);
        }
    }
    Ok(gdp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entry_accessors() {
        let body = r#"[
            {"name": {"common": " Chile ", "official": "Republic of Chile"},
             "population": 19116209, "area": 756102.0,
             "flags": {"png": "", "svg": "https://flagcdn.com/cl.svg"},
             "cca2": "CL", "cca3": "CHL"},
            {"name": {"common": ""}, "population": 10, "flags": {}, "cca2": "XX"}
        ]"#;
        let catalog = parse_catalog(body).unwrap();
        assert_eq!(catalog.len(), 2);

        assert_eq!(catalog[0].common_name(), Some("Chile"));
        assert_eq!(catalog[0].flag_url(), Some("https://flagcdn.com/cl.svg"));
        assert_eq!(catalog[0].code(), "CHL");

        assert_eq!(catalog[1].common_name(), None);
        assert_eq!(catalog[1].flag_url(), None);
        assert_eq!(catalog[1].code(), "XX");
        assert_eq!(catalog[1].area, None);
    }

    #[test]
    fn catalog_must_be_an_array() {
        let err = parse_catalog(r#"{"status": 404, "message": "Not Found"}"#).unwrap_err();
        assert!(matches!(err, CountriesError::Shape(_)));

        let err = parse_catalog("<html>").unwrap_err();
        assert!(matches!(err, CountriesError::Parse(_)));
    }

    #[test]
    fn gdp_rows_keyed_by_both_codes() {
        let body = r#"[
            {"page": 1, "pages": 1, "per_page": 300, "total": 3},
            [
                {"country": {"id": "CL", "value": "Chile"}, "countryiso3code": "CHL",
                 "date": "2022", "value": 301025000000.0},
                {"country": {"id": "ER", "value": "Eritrea"}, "countryiso3code": "ERI",
                 "date": "2022", "value": null},
                {"country": {"id": "1W", "value": "World"}, "countryiso3code": "",
                 "date": "2022", "value": 100.5}
            ]
        ]"#;
        let gdp = parse_gdp(body).unwrap();
        assert_eq!(gdp.get("CHL"), Some(&301_025_000_000.0));
        assert_eq!(gdp.get("CL"), Some(&301_025_000_000.0));
        assert!(!gdp.contains_key("ERI"));
        assert!(!gdp.contains_key("ER"));
        assert_eq!(gdp.get("1W"), Some(&100.5));
        assert!(!gdp.contains_key(""));
    }

    #[test]
    fn gdp_error_body_is_malformed() {
        let body = r#"[{"message": [{"id": "120", "key": "Invalid value"}]}]"#;
        let err = parse_gdp(body).unwrap_err();
        assert!(matches!(err, CountriesError::Shape(_)));
    }
}
