//! Page fetcher for the **World Bank Indicators API (v2)**.
//!
//! One call fetches one page of `country/{codes}/indicator/{code}` and memoizes
//! it in a bounded LRU cache keyed by (countries, indicator, date range, page,
//! page size). Failures are returned, never retried; the caller decides.
//!
//! ### Notes
//! - The response is `[metadata, records]`. Anything else (an API error
//!   message, `null` records, an empty list) is reported as [`RawPage::NoData`]
//!   rather than as an error.
//! - Network timeouts default to 30s and surface as [`FetchError::Transport`].
//!
//! Typical usage:
//! ```no_run
//! # use euro_indicators::{AppConfig, Fetcher, YearRange};
//! let fetcher = Fetcher::from_config(&AppConfig::default())?;
//! let page = fetcher.fetch_page(&["DEU", "FRA"], "NY.GDP.PCAP.CD", YearRange::new(2020, 2021), 1, 2000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
use crate::cache::{CacheStats, PageCache, PageKey};
use crate::config::AppConfig;
use crate::error::{FetchError, ShapeError, TransportError};
use crate::models::{Meta, YearRange};
use anyhow::{Context, Result};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Network seam: one GET returning decoded JSON.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value, TransportError>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout) // total request timeout
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .redirect(Policy::limited(5))
            .user_agent(concat!("euro-indicators/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        resp.json::<Value>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// One decoded API page.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPage {
    Data { meta: Meta, records: Vec<Value> },
    /// The request succeeded but carried no usable records.
    NoData(ShapeError),
}

impl RawPage {
    /// Classify a decoded response body.
    pub fn from_json(v: &Value) -> Self {
        let arr = match v.as_array() {
            Some(arr) => arr,
            None => return RawPage::NoData(ShapeError::NotAnArray),
        };
        if arr.len() < 2 {
            return RawPage::NoData(ShapeError::MissingRecords(arr.len()));
        }
        let records = match arr[1].as_array() {
            Some(r) if !r.is_empty() => r.clone(),
            _ => return RawPage::NoData(ShapeError::EmptyRecords),
        };
        // A malformed metadata object only costs us the page count.
        let meta: Meta = serde_json::from_value(arr[0].clone()).unwrap_or_default();
        RawPage::Data { meta, records }
    }

    pub fn page_count(&self) -> u32 {
        match self {
            RawPage::Data { meta, .. } => meta.page_count(),
            RawPage::NoData(_) => 1,
        }
    }

    pub fn records(&self) -> &[Value] {
        match self {
            RawPage::Data { records, .. } => records,
            RawPage::NoData(_) => &[],
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, RawPage::Data { .. })
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Memoizing page fetcher over a [`Transport`].
#[derive(Debug)]
pub struct Fetcher<T: Transport = HttpTransport> {
    base_url: String,
    transport: T,
    cache: Mutex<PageCache<PageKey, Arc<RawPage>>>,
}

impl Fetcher<HttpTransport> {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::new(cfg.timeout)?;
        Ok(Self::new(&cfg.api_base, transport, cfg.cache_capacity))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(base_url: &str, transport: T, cache_capacity: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            cache: Mutex::new(PageCache::new(cache_capacity)),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stats()
    }

    /// Request URL for one page.
    pub fn page_url(
        &self,
        countries: &[&str],
        indicator_code: &str,
        range: YearRange,
        page: u32,
        per_page: u32,
    ) -> String {
        format!(
            "{}/country/{}/indicator/{}?date={}&format=json&per_page={}&page={}",
            self.base_url,
            enc_join(countries.iter().copied()),
            enc_join([indicator_code]),
            range.to_query_param(),
            per_page,
            page
        )
    }

    /// Fetch one page, serving repeated identical requests from the cache.
    ///
    /// Only successful responses are cached. Two threads missing on the same
    /// key may both reach the network; the later insert replaces the earlier
    /// identical value.
    pub fn fetch_page(
        &self,
        countries: &[&str],
        indicator_code: &str,
        range: YearRange,
        page: u32,
        per_page: u32,
    ) -> Result<Arc<RawPage>, FetchError> {
        let key = PageKey {
            countries: countries.join(";"),
            indicator: indicator_code.to_string(),
            date_range: range.to_query_param(),
            page,
            per_page,
        };

        // Lock is not held across network I/O.
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key);
        if let Some(hit) = cached {
            debug!("cache hit: {} page {}", indicator_code, page);
            return Ok(hit);
        }

        let url = self.page_url(countries, indicator_code, range, page, per_page);
        debug!("GET {}", url);
        let body = self
            .transport
            .get_json(&url)
            .map_err(|e| FetchError::from_transport(e, indicator_code, page))?;

        let raw = Arc::new(RawPage::from_json(&body));
        if let RawPage::NoData(reason) = raw.as_ref() {
            debug!("{} page {}: no data ({})", indicator_code, page, reason);
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&raw));
        Ok(raw)
    }
}
