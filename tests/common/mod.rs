//! In-memory stand-in for the World Bank API.
#![allow(dead_code)]

use euro_indicators::{Fetcher, Transport, TransportError};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned bodies keyed by (indicator code, page).
#[derive(Default)]
pub struct FakeApi {
    pages: HashMap<(String, u32), Value>,
    failing: HashSet<(String, u32)>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, code: &str, page: u32, body: Value) -> Self {
        self.pages.insert((code.to_string(), page), body);
        self
    }

    /// Answer HTTP 500 for this page.
    pub fn fail(mut self, code: &str, page: u32) -> Self {
        self.failing.insert((code.to_string(), page));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

fn parse_url(url: &str) -> (String, u32) {
    let after = url.split("/indicator/").nth(1).unwrap_or("");
    let code = after.split('?').next().unwrap_or("").to_string();
    let page = url
        .split("&page=")
        .nth(1)
        .and_then(|p| p.split('&').next())
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    (code, page)
}

impl Transport for FakeApi {
    fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let key = parse_url(url);
        if self.failing.contains(&key) {
            return Err(TransportError::Status(500));
        }
        Ok(self
            .pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| json!([{"message": [{"id": "120", "value": "Invalid value"}]}])))
    }
}

pub fn fetcher(api: FakeApi) -> Fetcher<FakeApi> {
    Fetcher::new("http://fake.local/v2", api, 64)
}

/// `[metadata, records]` body.
pub fn page_body(page: u32, pages: u32, records: Vec<Value>) -> Value {
    json!([
        {"page": page, "pages": pages, "per_page": "2", "total": records.len()},
        records
    ])
}

pub fn record(iso3: &str, api_name: &str, year: &str, value: Value) -> Value {
    json!({
        "indicator": {"id": "X", "value": "Some indicator"},
        "country": {"id": "XX", "value": api_name},
        "countryiso3code": iso3,
        "date": year,
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 1
    })
}
