//! Startup configuration.
//!
//! Values come from built-in defaults, then an optional `.env` file and
//! `EUROIND_*` environment variables. Nothing here changes after startup.

use crate::models::YearRange;
use anyhow::{Context, Result, bail};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_PER_PAGE: u32 = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_CAPACITY: usize = 64;
pub const DEFAULT_YEARS: YearRange = YearRange::new(2000, 2024);

pub const DEFAULT_INDICATOR: &str = "GDP per capita (US$)";
pub const DEFAULT_COUNTRIES: &[&str] = &["Germany", "France", "United Kingdom", "Spain", "Italy"];
pub const DEFAULT_KPI_COUNTRY: &str = "Germany";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub per_page: u32,
    pub timeout: Duration,
    pub cache_capacity: usize,
    pub years: YearRange,
    pub default_indicator: String,
    pub default_countries: Vec<String>,
    pub kpi_country: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            years: DEFAULT_YEARS,
            default_indicator: DEFAULT_INDICATOR.into(),
            default_countries: DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect(),
            kpi_country: DEFAULT_KPI_COUNTRY.into(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `.env` and process environment.
    pub fn from_env() -> Result<Self> {
        let cfg = Self::from_env_unvalidated()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Like [`AppConfig::from_env`] but skips [`AppConfig::validate`], so
    /// callers can layer further overrides before validating once.
    pub fn from_env_unvalidated() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::overlay(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `EUROIND_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cfg = Self::overlay(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse `EUROIND_*` overrides onto the defaults. Values are parsed, not validated.
    pub fn overlay(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(base) = lookup("EUROIND_API_BASE") {
            cfg.api_base = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("EUROIND_PER_PAGE") {
            cfg.per_page = parse_var("EUROIND_PER_PAGE", &v)?;
        }
        if let Some(v) = lookup("EUROIND_TIMEOUT_SECS") {
            cfg.timeout = Duration::from_secs(parse_var("EUROIND_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("EUROIND_CACHE_CAPACITY") {
            cfg.cache_capacity = parse_var("EUROIND_CACHE_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("EUROIND_START_YEAR") {
            cfg.years.start = parse_var("EUROIND_START_YEAR", &v)?;
        }
        if let Some(v) = lookup("EUROIND_END_YEAR") {
            cfg.years.end = parse_var("EUROIND_END_YEAR", &v)?;
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base.is_empty() {
            bail!("api base url must not be empty");
        }
        if self.per_page == 0 {
            bail!("per_page must be at least 1");
        }
        if self.cache_capacity == 0 {
            bail!("cache capacity must be at least 1");
        }
        if self.timeout.is_zero() {
            bail!("timeout must be positive");
        }
        if self.years.start > self.years.end {
            bail!("invalid year range {}", self.years.to_query_param());
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid value for {key}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_dashboard() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.years, YearRange::new(2000, 2024));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.cache_capacity, 64);
        assert_eq!(cfg.default_countries.len(), 5);
        cfg.validate().unwrap();
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("EUROIND_API_BASE", "http://localhost:9000/v2/"),
            ("EUROIND_PER_PAGE", "500"),
            ("EUROIND_CACHE_CAPACITY", "8"),
            ("EUROIND_START_YEAR", "2010"),
        ]
        .into_iter()
        .collect();
        let cfg = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.api_base, "http://localhost:9000/v2");
        assert_eq!(cfg.per_page, 500);
        assert_eq!(cfg.cache_capacity, 8);
        assert_eq!(cfg.years, YearRange::new(2010, 2024));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = AppConfig::from_lookup(|k| (k == "EUROIND_PER_PAGE").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("EUROIND_PER_PAGE"));

        let err = AppConfig::from_lookup(|k| (k == "EUROIND_START_YEAR").then(|| "2030".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("invalid year range"));
    }

    #[test]
    fn overlay_defers_validation_to_later_overrides() {
        let mut cfg = AppConfig::overlay(|k| (k == "EUROIND_START_YEAR").then(|| "2030".to_string()))
            .unwrap();
        assert!(cfg.validate().is_err());
        cfg.years.end = 2035;
        cfg.validate().unwrap();
        assert_eq!(cfg.years, YearRange::new(2030, 2035));
    }
}
