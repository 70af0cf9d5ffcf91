use euro_indicators::dataset::{self, CanonicalDataset};
use euro_indicators::metrics::{KpiCards, Rank, compute_metrics};
use euro_indicators::{CanonicalRow, YearRange};

const X: &str = "GDP per capita (US$)";

fn row(ind: &str, iso3: &str, country: &str, year: i32, value: Option<f64>) -> CanonicalRow {
    CanonicalRow {
        iso3: iso3.into(),
        country: country.into(),
        year,
        value,
        indicator: ind.into(),
    }
}

fn sample() -> CanonicalDataset {
    CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", 2020, Some(100.0)),
        row(X, "DEU", "Germany", 2021, Some(110.0)),
        row(X, "FRA", "France", 2021, Some(90.0)),
        row(X, "ESP", "Spain", 2021, Some(80.0)),
        row(X, "ESP", "Spain", 2020, Some(0.0)),
        row(X, "ITA", "Italy", 2018, Some(-5.0)),
        row(X, "ITA", "Italy", 2021, Some(20.0)),
        row("Other", "DEU", "Germany", 2021, Some(1.0e9)),
    ])
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn germany_two_years() {
    let m = compute_metrics(&sample(), X, "Germany", YearRange::new(2020, 2021));
    assert_eq!(m.latest_value, Some(110.0));
    assert_eq!(m.latest_year, Some(2021));
    assert!(close(m.yoy_delta_abs, 10.0));
    assert!(close(m.yoy_delta_pct, 10.0));
    assert!(close(m.cagr_pct, 10.0));
    assert_eq!(m.range, Some(YearRange::new(2020, 2021)));

    let cards = KpiCards::from_metrics(X, &m);
    assert_eq!(cards.latest_value, "US$ 110.00");
    assert_eq!(cards.latest_year, "Year 2021");
    assert_eq!(cards.yoy_pct, "10.00%");
    assert_eq!(cards.yoy_abs, "Δ US$ 10.00");
    assert_eq!(cards.cagr, "10.00%");
    assert_eq!(cards.range, "2020–2021");
}

#[test]
fn rank_is_computed_across_all_countries() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", 2021, Some(110.0)),
        row(X, "FRA", "France", 2021, Some(90.0)),
        row(X, "ESP", "Spain", 2021, Some(80.0)),
    ]);
    let m = compute_metrics(&ds, X, "Germany", YearRange::new(2020, 2021));
    assert_eq!(m.rank, Some(Rank { position: 1, of: 3 }));
    assert_eq!(m.rank_text(), "#1 of 3");
    assert_eq!(m.rank_context_year, Some(2021));

    let m = compute_metrics(&ds, X, "Spain", YearRange::new(2021, 2021));
    assert_eq!(m.rank_text(), "#3 of 3");
}

#[test]
fn rank_ignores_missing_values() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", 2021, Some(110.0)),
        row(X, "FRA", "France", 2021, None),
        row(X, "ESP", "Spain", 2021, Some(180.0)),
    ]);
    let m = compute_metrics(&ds, X, "Germany", YearRange::new(2000, 2024));
    assert_eq!(m.rank_text(), "#2 of 2");

    let m = compute_metrics(&ds, X, "France", YearRange::new(2000, 2024));
    assert_eq!(m.latest_year, Some(2021));
    assert_eq!(m.latest_value, None);
    assert_eq!(m.rank, None);
    assert_eq!(m.rank_context_year, Some(2021));
    let cards = KpiCards::from_metrics(X, &m);
    assert_eq!(cards.latest_value, "N/A");
    assert_eq!(cards.rank, "N/A");
    assert_eq!(cards.rank_context, "Year 2021");
}

#[test]
fn zero_previous_value_leaves_pct_unavailable() {
    let m = compute_metrics(&sample(), X, "Spain", YearRange::new(2020, 2021));
    assert!(close(m.yoy_delta_abs, 80.0));
    assert_eq!(m.yoy_delta_pct, None);
    // first value 0 → no CAGR either
    assert_eq!(m.cagr_pct, None);
    assert_eq!(KpiCards::from_metrics(X, &m).yoy_pct, "N/A");
}

#[test]
fn negative_first_value_leaves_cagr_unavailable() {
    let m = compute_metrics(&sample(), X, "Italy", YearRange::new(2000, 2024));
    assert_eq!(m.latest_value, Some(20.0));
    assert_eq!(m.cagr_pct, None);
    assert!(close(m.yoy_delta_abs, 25.0));
    assert!(close(m.yoy_delta_pct, -500.0));
}

#[test]
fn single_row_has_no_yoy_and_flat_cagr() {
    let m = compute_metrics(&sample(), X, "France", YearRange::new(2000, 2024));
    assert_eq!(m.latest_value, Some(90.0));
    assert_eq!(m.yoy_delta_abs, None);
    assert_eq!(m.yoy_delta_pct, None);
    assert!(close(m.cagr_pct, 0.0));
    let cards = KpiCards::from_metrics(X, &m);
    assert_eq!(cards.yoy_abs, "Δ N/A");
}

#[test]
fn cagr_uses_year_span() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", 2000, Some(100.0)),
        row(X, "DEU", "Germany", 2010, Some(200.0)),
    ]);
    let m = compute_metrics(&ds, X, "Germany", YearRange::new(2000, 2024));
    let expected = (2f64.powf(0.1) - 1.0) * 100.0;
    assert!(close(m.cagr_pct, expected));
}

#[test]
fn range_past_the_data_is_unavailable_not_an_error() {
    let ds = sample();
    let range = YearRange::new(2030, 2035);
    let m = compute_metrics(&ds, X, "Germany", range);
    assert!(m.is_unavailable());
    assert_eq!(m.range, None);
    assert!(dataset::filter(&ds, X, &["Germany"], range).is_empty());
    assert!(dataset::latest_per_country(&ds, X, range).is_empty());
    assert!(dataset::map_snapshot(&ds, X, range).is_none());

    let cards = KpiCards::from_metrics(X, &m);
    assert!(
        [
            &cards.latest_value,
            &cards.latest_year,
            &cards.yoy_pct,
            &cards.yoy_abs,
            &cards.cagr,
            &cards.range,
            &cards.rank,
            &cards.rank_context
        ]
        .iter()
        .all(|s| s.as_str() == "N/A")
    );
}

#[test]
fn unknown_selection_is_unavailable() {
    let ds = sample();
    assert!(compute_metrics(&ds, "Nope", "Germany", YearRange::new(2000, 2024)).is_unavailable());
    assert!(compute_metrics(&ds, X, "Atlantis", YearRange::new(2000, 2024)).is_unavailable());
    assert!(
        compute_metrics(&CanonicalDataset::empty(), X, "Germany", YearRange::new(2000, 2024))
            .is_unavailable()
    );
}

#[test]
fn every_numeric_field_is_finite_or_unavailable() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "AAA", "A", 2000, Some(0.0)),
        row(X, "AAA", "A", 2001, Some(-3.0)),
        row(X, "BBB", "B", 2000, Some(1e-300)),
        row(X, "BBB", "B", 2001, Some(1e300)),
        row(X, "CCC", "C", 2000, Some(5.0)),
        row(X, "CCC", "C", 2001, Some(-5.0)),
        row(X, "DDD", "D", 2001, None),
        row(X, "DDD", "D", 2002, Some(7.0)),
    ]);
    for country in ["A", "B", "C", "D"] {
        for start in 1999..=2002 {
            for end in start..=2003 {
                let m = compute_metrics(&ds, X, country, YearRange::new(start, end));
                for v in [m.latest_value, m.yoy_delta_abs, m.yoy_delta_pct, m.cagr_pct]
                    .into_iter()
                    .flatten()
                {
                    assert!(v.is_finite(), "{country} {start}-{end}: {m:?}");
                }
            }
        }
    }
}

#[test]
fn duplicate_year_rows_agree_with_comparison_view() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", 2020, Some(100.0)),
        row(X, "DEU", "Germany", 2021, Some(7.0)),
        row(X, "DEU", "Germany", 2021, Some(9.0)),
    ]);
    let range = YearRange::new(2000, 2030);
    let m = compute_metrics(&ds, X, "Germany", range);
    let latest = dataset::latest_per_country(&ds, X, range);

    assert_eq!(latest[0].value, Some(7.0));
    assert_eq!(m.latest_value, Some(7.0));
    assert_eq!(m.latest_year, Some(2021));
    assert!(close(m.yoy_delta_abs, -93.0));
    assert!(close(m.yoy_delta_pct, -93.0));
    assert_eq!(m.rank, Some(Rank { position: 1, of: 1 }));
    assert_eq!(m.rank_text(), "#1 of 1");
}

#[test]
fn extreme_years_do_not_overflow() {
    let ds = CanonicalDataset::from_rows(vec![
        row(X, "DEU", "Germany", i32::MIN, Some(1.0)),
        row(X, "DEU", "Germany", i32::MAX, Some(2.0)),
    ]);
    let m = compute_metrics(&ds, X, "Germany", YearRange::new(i32::MIN, i32::MAX));
    assert_eq!(m.latest_year, Some(i32::MAX));
    assert!(m.cagr_pct.is_some_and(f64::is_finite));
}
