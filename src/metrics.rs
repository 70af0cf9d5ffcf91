//! KPI metrics for one indicator/country/year-range selection.
//!
//! Every numeric field is either a finite number or `None` ("unavailable");
//! division by zero and fractional powers of non-positive bases are mapped to
//! `None` before they can produce NaN or infinity.

use crate::dataset::{self, CanonicalDataset};
use crate::models::YearRange;
use num_format::{Locale, ToFormattedString};
use serde::Serialize;
use std::fmt;

/// Marker rendered for unavailable values.
pub const NOT_AVAILABLE: &str = "N/A";

/// 1-based position within a cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub position: usize,
    pub of: usize,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} of {}", self.position, self.of)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsResult {
    pub latest_value: Option<f64>,
    pub latest_year: Option<i32>,
    pub yoy_delta_pct: Option<f64>,
    pub yoy_delta_abs: Option<f64>,
    pub cagr_pct: Option<f64>,
    /// Selected range; set whenever any row matched.
    pub range: Option<YearRange>,
    pub rank: Option<Rank>,
    /// Year the rank was computed at (the selected country's latest year).
    pub rank_context_year: Option<i32>,
}

impl MetricsResult {
    /// Every field unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_unavailable(&self) -> bool {
        self.latest_year.is_none()
    }

    /// `"#1 of 3"` or `"N/A"`.
    pub fn rank_text(&self) -> String {
        self.rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Compute the KPI metrics for `country` and `indicator` within `range`.
///
/// The rank ignores the country selection: it compares every country that
/// has a value for the indicator at the selected country's latest year.
///
/// Duplicate rows for one year resolve as in [`dataset::first_per_year`].
pub fn compute_metrics(
    ds: &CanonicalDataset,
    indicator: &str,
    country: &str,
    range: YearRange,
) -> MetricsResult {
    // Table order is year ascending per country; duplicates collapse to one row per year.
    let rows = dataset::first_per_year(&dataset::filter(ds, indicator, &[country], range));
    if rows.is_empty() {
        return MetricsResult::unavailable();
    }

    let first = rows[0];
    let latest = rows[rows.len() - 1];
    let latest_value = latest.value.and_then(finite);

    let (yoy_delta_abs, yoy_delta_pct) = if rows.len() >= 2 {
        let prev = rows[rows.len() - 2].value;
        let abs = latest_value.zip(prev).and_then(|(l, p)| finite(l - p));
        let pct = match (abs, prev) {
            (Some(a), Some(p)) if p != 0.0 => finite(a / p * 100.0),
            _ => None,
        };
        (abs, pct)
    } else {
        (None, None)
    };

    // n >= 1 keeps a single-year span from dividing by zero.
    let n = latest.year.saturating_sub(first.year).max(1) as f64;
    let cagr_pct = match (first.value, latest_value) {
        (Some(fv), Some(lv)) if fv > 0.0 => finite(((lv / fv).powf(1.0 / n) - 1.0) * 100.0),
        _ => None,
    };

    let cross = dataset::cross_section(ds, indicator, latest.year);
    let (rank, rank_context_year) = if cross.is_empty() {
        (None, None)
    } else {
        let rank = cross
            .iter()
            .position(|r| r.country == country)
            .map(|i| Rank {
                position: i + 1,
                of: cross.len(),
            });
        (rank, Some(latest.year))
    };

    MetricsResult {
        latest_value,
        latest_year: Some(latest.year),
        yoy_delta_pct,
        yoy_delta_abs,
        cagr_pct,
        range: Some(range),
        rank,
        rank_context_year,
    }
}

/// `1234567.891` → `"1,234,567.89"`.
pub fn group_thousands(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let grouped = match int_part.parse::<u128>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    let sign = if v < 0.0 { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Render a value for display, keyed off the indicator name.
///
/// - unavailable or non-finite → `"N/A"`
/// - name contains `%` → `"12.34%"`
/// - name contains `US$` → `"US$ 1,234.56"`
/// - otherwise → `"1,234.56"`
pub fn format_value(indicator: &str, value: Option<f64>) -> String {
    let v = match value.and_then(finite) {
        Some(v) => v,
        None => return NOT_AVAILABLE.to_string(),
    };
    if indicator.contains('%') {
        format!("{}%", group_thousands(v, 2))
    } else if indicator.contains("US$") {
        format!("US$ {}", group_thousands(v, 2))
    } else {
        group_thousands(v, 2)
    }
}

fn format_pct(v: Option<f64>) -> String {
    match v.and_then(finite) {
        Some(v) => format!("{}%", group_thousands(v, 2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// The four KPI cards as display strings (title value + subtitle each).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiCards {
    pub latest_value: String,
    pub latest_year: String,
    pub yoy_pct: String,
    pub yoy_abs: String,
    pub cagr: String,
    pub range: String,
    pub rank: String,
    pub rank_context: String,
}

impl KpiCards {
    pub fn from_metrics(indicator: &str, m: &MetricsResult) -> Self {
        if m.is_unavailable() {
            let na = NOT_AVAILABLE.to_string();
            return Self {
                latest_value: na.clone(),
                latest_year: na.clone(),
                yoy_pct: na.clone(),
                yoy_abs: na.clone(),
                cagr: na.clone(),
                range: na.clone(),
                rank: na.clone(),
                rank_context: na,
            };
        }
        Self {
            latest_value: format_value(indicator, m.latest_value),
            latest_year: m
                .latest_year
                .map(|y| format!("Year {y}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            yoy_pct: format_pct(m.yoy_delta_pct),
            yoy_abs: format!("Δ {}", format_value(indicator, m.yoy_delta_abs)),
            cagr: format_pct(m.cagr_pct),
            range: m
                .range
                .map(|r| r.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            rank: m.rank_text(),
            rank_context: m
                .rank_context_year
                .map(|y| format!("Year {y}"))
                .unwrap_or_default(),
        }
    }
}
