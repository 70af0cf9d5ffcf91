use crate::models::CanonicalRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grouping key used in stats: one series per (indicator, country).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub indicator: String,
    pub country: String,
}

/// Summary statistics for a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: GroupKey,
    pub count: usize,
    pub missing: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute grouped statistics by (indicator, country).
pub fn grouped_summary<'a>(rows: impl IntoIterator<Item = &'a CanonicalRow>) -> Vec<Summary> {
    let mut groups: BTreeMap<GroupKey, (Vec<f64>, usize, Option<i32>, Option<i32>)> =
        BTreeMap::new();
    for r in rows {
        let key = GroupKey {
            indicator: r.indicator.clone(),
            country: r.country.clone(),
        };
        let (vals, missing, first, last) = groups.entry(key).or_default();
        match r.value {
            Some(v) => vals.push(v),
            None => *missing += 1,
        }
        *first = Some(first.map_or(r.year, |y| y.min(r.year)));
        *last = Some(last.map_or(r.year, |y| y.max(r.year)));
    }

    let mut out = Vec::new();
    for (key, (mut vals, missing, first_year, last_year)) in groups {
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let min = vals.first().copied();
        let max = vals.last().copied();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            key,
            count,
            missing,
            first_year,
            last_year,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
