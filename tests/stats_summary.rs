use euro_indicators::CanonicalRow;
use euro_indicators::stats::{GroupKey, grouped_summary};

fn row(indicator: &str, country: &str, year: i32, v: Option<f64>) -> CanonicalRow {
    CanonicalRow {
        iso3: "XXX".into(),
        country: country.into(),
        year,
        value: v,
        indicator: indicator.into(),
    }
}

#[test]
fn grouped_stats_handle_missing_and_median_even_odd() {
    // Two groups: (IND1, Austria) with values [1,2,3,4] -> median = (2+3)/2 = 2.5
    //             (IND1, Belgium) with [10, None, 30] -> missing = 1, median = 20
    let rows = vec![
        row("IND1", "Austria", 2018, Some(1.0)),
        row("IND1", "Austria", 2019, Some(2.0)),
        row("IND1", "Austria", 2020, Some(3.0)),
        row("IND1", "Austria", 2021, Some(4.0)),
        row("IND1", "Belgium", 2018, Some(10.0)),
        row("IND1", "Belgium", 2019, None),
        row("IND1", "Belgium", 2020, Some(30.0)),
    ];
    let got = grouped_summary(&rows);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(
        a.key,
        GroupKey {
            indicator: "IND1".into(),
            country: "Austria".into()
        }
    );
    assert_eq!(a.count, 4);
    assert_eq!(a.missing, 0);
    assert_eq!((a.first_year, a.last_year), (Some(2018), Some(2021)));
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(4.0));
    assert!((a.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((a.median.unwrap() - 2.5).abs() < 1e-9);

    let b = &got[1];
    assert_eq!(b.key.country, "Belgium");
    assert_eq!(b.count, 2);
    assert_eq!(b.missing, 1);
    assert_eq!(b.min, Some(10.0));
    assert_eq!(b.max, Some(30.0));
    assert_eq!(b.mean.unwrap(), 20.0);
    assert_eq!(b.median.unwrap(), 20.0);
}

#[test]
fn all_missing_group_has_no_values() {
    let rows = vec![row("IND2", "Malta", 2020, None)];
    let got = grouped_summary(&rows);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].missing, 1);
    assert_eq!(got[0].mean, None);
    assert_eq!(got[0].median, None);
}
