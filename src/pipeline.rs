//! Fetch → normalize → assemble.
//!
//! [`aggregate_indicator`] walks every page of one indicator and turns raw
//! records into [`CanonicalRow`]s. [`build_dataset`] runs it for each
//! registered indicator, isolates failures, and returns the sorted dataset
//! together with a per-indicator [`BuildReport`].

use crate::api::{Fetcher, Transport};
use crate::dataset::CanonicalDataset;
use crate::error::FetchError;
use crate::models::{CanonicalRow, RawRecord, YearRange};
use crate::registry::{CountryRegistry, IndicatorRegistry};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

/// Safety cap to avoid pathological pagination metadata.
pub const MAX_PAGES: u32 = 1000;

/// Rows gathered for one indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedIndicator {
    pub rows: Vec<CanonicalRow>,
    /// Pages requested, including page 1.
    pub pages: u32,
    /// Records dropped because year or value was not numeric.
    pub dropped_rows: usize,
}

/// Fetch every page of one indicator and normalize it.
///
/// A first page without data yields an empty result. Any page failure aborts
/// this indicator with the failing page's error.
pub fn aggregate_indicator<T: Transport>(
    fetcher: &Fetcher<T>,
    countries: &CountryRegistry,
    indicator_name: &str,
    indicator_code: &str,
    range: YearRange,
    per_page: u32,
) -> Result<AggregatedIndicator, FetchError> {
    let codes: Vec<&str> = countries.codes().collect();

    let first = fetcher.fetch_page(&codes, indicator_code, range, 1, per_page)?;
    if !first.has_data() {
        return Ok(AggregatedIndicator {
            pages: 1,
            ..Default::default()
        });
    }

    let mut total_pages = first.page_count();
    if total_pages > MAX_PAGES {
        warn!(
            "{}: API reports {} pages, reading the first {}",
            indicator_name, total_pages, MAX_PAGES
        );
        total_pages = MAX_PAGES;
    }

    let mut out = AggregatedIndicator {
        pages: total_pages,
        ..Default::default()
    };
    normalize_records(first.records(), countries, indicator_name, &mut out);

    for page in 2..=total_pages {
        let raw = fetcher.fetch_page(&codes, indicator_code, range, page, per_page)?;
        normalize_records(raw.records(), countries, indicator_name, &mut out);
    }

    if out.dropped_rows > 0 {
        debug!(
            "{}: dropped {} record(s) with non-numeric year or value",
            indicator_name, out.dropped_rows
        );
    }
    Ok(out)
}

fn normalize_records(
    records: &[Value],
    countries: &CountryRegistry,
    indicator_name: &str,
    out: &mut AggregatedIndicator,
) {
    for rec in records {
        match normalize_record(rec, countries, indicator_name) {
            Some(row) => out.rows.push(row),
            None => out.dropped_rows += 1,
        }
    }
}

/// One raw record to a canonical row; `None` when it cannot be used.
///
/// Known ISO3 codes take the registry's display name; unknown ones keep the
/// name the API sent.
pub fn normalize_record(
    rec: &Value,
    countries: &CountryRegistry,
    indicator_name: &str,
) -> Option<CanonicalRow> {
    let raw: RawRecord = serde_json::from_value(rec.clone()).ok()?;
    let year = raw.year()?;
    let value = raw.numeric_value()?;
    let iso3 = raw.iso3().to_string();
    let country = countries
        .name_of(&iso3)
        .or_else(|| raw.api_country_name())
        .unwrap_or_default()
        .to_string();
    Some(CanonicalRow {
        iso3,
        country,
        year,
        value: Some(value),
        indicator: indicator_name.to_string(),
    })
}

/// What happened to one indicator during the build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorStatus {
    Loaded {
        rows: usize,
        pages: u32,
        dropped_rows: usize,
    },
    /// The API had nothing usable for this selection.
    Empty { dropped_rows: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorOutcome {
    pub indicator: String,
    pub code: String,
    #[serde(flatten)]
    pub status: IndicatorStatus,
}

/// Per-indicator outcomes of one build, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub outcomes: Vec<IndicatorOutcome>,
}

impl BuildReport {
    pub fn failed(&self) -> impl Iterator<Item = &IndicatorOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, IndicatorStatus::Failed { .. }))
    }

    pub fn outcome(&self, indicator: &str) -> Option<&IndicatorOutcome> {
        self.outcomes.iter().find(|o| o.indicator == indicator)
    }

    pub fn loaded_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                IndicatorStatus::Loaded { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    /// True when no indicator failed.
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub dataset: CanonicalDataset,
    pub report: BuildReport,
}

/// Aggregate every registered indicator and assemble the canonical dataset.
///
/// Indicators are processed in parallel; a failing indicator contributes no
/// rows and is recorded in the report. Never fails as a whole.
pub fn build_dataset<T: Transport>(
    fetcher: &Fetcher<T>,
    countries: &CountryRegistry,
    indicators: &IndicatorRegistry,
    range: YearRange,
    per_page: u32,
) -> BuildOutput {
    let jobs: Vec<(&str, &str)> = indicators.iter().collect();

    let results: Vec<(IndicatorOutcome, Vec<CanonicalRow>)> = jobs
        .par_iter()
        .map(|&(name, code)| {
            let (status, rows) =
                match aggregate_indicator(fetcher, countries, name, code, range, per_page) {
                    Ok(agg) if agg.rows.is_empty() => {
                        info!("{}: no data", name);
                        (
                            IndicatorStatus::Empty {
                                dropped_rows: agg.dropped_rows,
                            },
                            agg.rows,
                        )
                    }
                    Ok(agg) => {
                        info!("{}: {} rows from {} page(s)", name, agg.rows.len(), agg.pages);
                        (
                            IndicatorStatus::Loaded {
                                rows: agg.rows.len(),
                                pages: agg.pages,
                                dropped_rows: agg.dropped_rows,
                            },
                            agg.rows,
                        )
                    }
                    Err(e) => {
                        warn!("Error with {}: {}", name, e);
                        (
                            IndicatorStatus::Failed {
                                reason: e.to_string(),
                            },
                            Vec::new(),
                        )
                    }
                };
            let outcome = IndicatorOutcome {
                indicator: name.to_string(),
                code: code.to_string(),
                status,
            };
            (outcome, rows)
        })
        .collect();

    let mut report = BuildReport::default();
    let mut all_rows: Vec<CanonicalRow> = Vec::new();
    for (outcome, rows) in results {
        report.outcomes.push(outcome);
        all_rows.extend(rows);
    }

    BuildOutput {
        dataset: CanonicalDataset::from_rows(all_rows),
        report,
    }
}
