//! The canonical long-form table and the read-only queries over it.
//!
//! A [`CanonicalDataset`] is built once and never mutated. Every query here
//! borrows from it, never fails, and returns an empty result for selections
//! that match nothing.

use crate::models::{CanonicalRow, YearRange};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Immutable table sorted by (indicator, country, year) ascending.
///
/// The sort is stable, so duplicate (indicator, country, year) rows keep the
/// order in which the source delivered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalDataset {
    rows: Vec<CanonicalRow>,
}

impl CanonicalDataset {
    pub fn from_rows(mut rows: Vec<CanonicalRow>) -> Self {
        rows.sort_by(|a, b| {
            a.indicator
                .cmp(&b.indicator)
                .then_with(|| a.country.cmp(&b.country))
                .then_with(|| a.year.cmp(&b.year))
        });
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct indicator names in table order.
    pub fn indicators(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.rows {
            if out.last() != Some(&r.indicator.as_str()) {
                out.push(&r.indicator);
            }
        }
        out
    }
}

/// Rows for one indicator, the given countries, and an inclusive year range.
pub fn filter<'a, S: AsRef<str>>(
    ds: &'a CanonicalDataset,
    indicator: &str,
    countries: &[S],
    range: YearRange,
) -> Vec<&'a CanonicalRow> {
    ds.rows
        .iter()
        .filter(|r| {
            r.indicator == indicator
                && range.contains(r.year)
                && countries.iter().any(|c| c.as_ref() == r.country)
        })
        .collect()
}

/// Every row of one indicator (export input).
pub fn indicator_rows<'a>(ds: &'a CanonicalDataset, indicator: &str) -> Vec<&'a CanonicalRow> {
    ds.rows.iter().filter(|r| r.indicator == indicator).collect()
}

/// Descending by value, ties by country name.
fn by_value_desc(a: &&CanonicalRow, b: &&CanonicalRow) -> Ordering {
    let (va, vb) = (a.value.unwrap_or(f64::NAN), b.value.unwrap_or(f64::NAN));
    vb.partial_cmp(&va)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.country.cmp(&b.country))
}

/// For each country, the non-missing row with the greatest year in range.
///
/// If a country has duplicate rows at its greatest year, the first one in
/// table order is taken. The result is ordered by value descending.
pub fn latest_per_country<'a>(
    ds: &'a CanonicalDataset,
    indicator: &str,
    range: YearRange,
) -> Vec<&'a CanonicalRow> {
    let mut best: HashMap<&str, &CanonicalRow> = HashMap::new();
    for r in &ds.rows {
        if r.indicator != indicator || !range.contains(r.year) || r.value.is_none() {
            continue;
        }
        best.entry(r.country.as_str())
            .and_modify(|cur| {
                if r.year > cur.year {
                    *cur = r;
                }
            })
            .or_insert(r);
    }
    let mut out: Vec<&CanonicalRow> = best.into_values().collect();
    out.sort_by(by_value_desc);
    out
}

/// Non-missing rows of one indicator at one year, one per country, value descending.
///
/// A country with duplicate rows contributes the first one in table order.
pub fn cross_section<'a>(
    ds: &'a CanonicalDataset,
    indicator: &str,
    year: i32,
) -> Vec<&'a CanonicalRow> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<&CanonicalRow> = ds
        .rows
        .iter()
        .filter(|r| r.indicator == indicator && r.year == year && r.value.is_some())
        .filter(|r| seen.insert(r.country.as_str()))
        .collect();
    out.sort_by(by_value_desc);
    out
}

/// Collapse a single country's year-ascending rows to one row per year.
///
/// Within a year the first non-missing row wins, falling back to the first
/// row when all are missing. Matches the choice made by
/// [`latest_per_country`] and [`cross_section`].
pub fn first_per_year<'a>(rows: &[&'a CanonicalRow]) -> Vec<&'a CanonicalRow> {
    let mut out: Vec<&CanonicalRow> = Vec::with_capacity(rows.len());
    for &r in rows {
        match out.last_mut() {
            Some(cur) if cur.year == r.year => {
                if cur.value.is_none() && r.value.is_some() {
                    *cur = r;
                }
            }
            _ => out.push(r),
        }
    }
    out
}

/// Rows at the latest year present for the indicator within range (map view).
pub fn map_snapshot<'a>(
    ds: &'a CanonicalDataset,
    indicator: &str,
    range: YearRange,
) -> Option<(i32, Vec<&'a CanonicalRow>)> {
    let year = ds
        .rows
        .iter()
        .filter(|r| r.indicator == indicator && range.contains(r.year))
        .map(|r| r.year)
        .max()?;
    let rows = ds
        .rows
        .iter()
        .filter(|r| r.indicator == indicator && r.year == year)
        .collect();
    Some((year, rows))
}

/// Smallest and largest year in the table.
pub fn year_bounds(ds: &CanonicalDataset) -> Option<YearRange> {
    let min = ds.rows.iter().map(|r| r.year).min()?;
    let max = ds.rows.iter().map(|r| r.year).max()?;
    Some(YearRange::new(min, max))
}

/// Initial year selection: the data's span, not starting before `configured.start`.
/// Falls back to `configured` for an empty table.
pub fn default_selection(ds: &CanonicalDataset, configured: YearRange) -> YearRange {
    match year_bounds(ds) {
        Some(b) => YearRange::new(configured.start.max(b.start), b.end),
        None => configured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ind: &str, country: &str, year: i32, value: Option<f64>) -> CanonicalRow {
        CanonicalRow {
            iso3: country[..3].to_uppercase(),
            country: country.into(),
            year,
            value,
            indicator: ind.into(),
        }
    }

    #[test]
    fn rows_are_sorted_and_stable() {
        let ds = CanonicalDataset::from_rows(vec![
            row("B", "Spain", 2001, Some(1.0)),
            row("A", "France", 2002, Some(2.0)),
            row("A", "France", 2001, Some(3.0)),
            row("A", "France", 2001, Some(4.0)),
        ]);
        let got: Vec<(&str, i32, Option<f64>)> = ds
            .rows()
            .iter()
            .map(|r| (r.indicator.as_str(), r.year, r.value))
            .collect();
        assert_eq!(
            got,
            vec![
                ("A", 2001, Some(3.0)),
                ("A", 2001, Some(4.0)),
                ("A", 2002, Some(2.0)),
                ("B", 2001, Some(1.0)),
            ]
        );
        assert_eq!(ds.indicators(), vec!["A", "B"]);
    }

    #[test]
    fn latest_per_country_takes_first_duplicate() {
        let ds = CanonicalDataset::from_rows(vec![
            row("X", "Germany", 2020, Some(5.0)),
            row("X", "Germany", 2021, Some(7.0)),
            row("X", "Germany", 2021, Some(9.0)),
            row("X", "France", 2021, None),
            row("X", "France", 2020, Some(8.0)),
        ]);
        let got = latest_per_country(&ds, "X", YearRange::new(2000, 2030));
        assert_eq!(got.len(), 2);
        assert_eq!((got[0].country.as_str(), got[0].year, got[0].value), ("France", 2020, Some(8.0)));
        assert_eq!((got[1].country.as_str(), got[1].year, got[1].value), ("Germany", 2021, Some(7.0)));
    }

    #[test]
    fn cross_section_counts_each_country_once() {
        let ds = CanonicalDataset::from_rows(vec![
            row("X", "Germany", 2021, Some(7.0)),
            row("X", "Germany", 2021, Some(9.0)),
        ]);
        let got = cross_section(&ds, "X", 2021);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value, Some(7.0));
    }

    #[test]
    fn first_per_year_prefers_first_present_value() {
        let a = row("X", "Italy", 2019, Some(1.0));
        let b = row("X", "Italy", 2020, None);
        let c = row("X", "Italy", 2020, Some(2.0));
        let d = row("X", "Italy", 2020, Some(3.0));
        let got = first_per_year(&[&a, &b, &c, &d]);
        let got: Vec<(i32, Option<f64>)> = got.iter().map(|r| (r.year, r.value)).collect();
        assert_eq!(got, vec![(2019, Some(1.0)), (2020, Some(2.0))]);
    }

    #[test]
    fn default_selection_clamps_to_configured_start() {
        let ds = CanonicalDataset::from_rows(vec![
            row("X", "Germany", 1995, Some(1.0)),
            row("X", "Germany", 2022, Some(1.0)),
        ]);
        assert_eq!(
            default_selection(&ds, YearRange::new(2000, 2024)),
            YearRange::new(2000, 2022)
        );
        assert_eq!(
            default_selection(&CanonicalDataset::empty(), YearRange::new(2000, 2024)),
            YearRange::new(2000, 2024)
        );
    }
}
