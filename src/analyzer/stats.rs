use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive statistics for one group of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation (n - 1). `None` for a single value.
    pub std: Option<f64>,
}

/// Statistics over a series, ignoring NaN. `None` when no values remain.
pub fn describe<I>(values: I) -> Option<GroupStats>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let std = (count > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    Some(GroupStats {
        count,
        mean,
        max,
        min,
        std,
    })
}

/// Grouped statistics, keyed and ordered by group.
///
/// Rows whose value is missing are skipped; a group left with no values is
/// omitted from the result.
pub fn summary_stats<R, K, G, V>(rows: &[R], group: G, value: V) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    G: Fn(&R) -> K,
    V: Fn(&R) -> Option<f64>,
{
    let mut grouped: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(v) = value(row) {
            grouped.entry(group(row)).or_default().push(v);
        }
    }

    grouped
        .into_iter()
        .filter_map(|(key, values)| describe(values).map(|stats| (key, stats)))
        .collect()
}
