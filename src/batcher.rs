use crate::model::{FetchError, KeywordGroup, NormalizedTable, TimeSeriesRow, MAX_GROUP_SIZE};
use serde::Deserialize;
use tracing::{debug, warn};

/// How a keyword list longer than [`MAX_GROUP_SIZE`] is handled.
///
/// Chunking is purely sequential (first five, next five, ...). Upstream scales
/// every request to its own peak, so values from different groups are not on a
/// common scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Issue one request per group of five until every keyword is covered.
    #[default]
    Batch,
    /// Keep only the first five keywords and drop the rest.
    Truncate,
}

/// Splits `keywords` into request-sized groups.
///
/// Keywords are trimmed and blank entries dropped; order is preserved and
/// duplicates are kept. An empty input yields no groups.
pub fn plan_groups<S: AsRef<str>>(keywords: &[S], mode: BatchMode) -> Vec<KeywordGroup> {
    let cleaned: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if mode == BatchMode::Truncate && cleaned.len() > MAX_GROUP_SIZE {
        warn!(
            "Truncating {} keywords to the first {}",
            cleaned.len(),
            MAX_GROUP_SIZE
        );
    }

    let limit = match mode {
        BatchMode::Batch => usize::MAX,
        BatchMode::Truncate => 1,
    };

    let groups: Vec<KeywordGroup> = cleaned
        .chunks(MAX_GROUP_SIZE)
        .take(limit)
        .enumerate()
        .filter_map(|(i, chunk)| KeywordGroup::new(format!("group-{}", i + 1), chunk.to_vec()))
        .collect();

    debug!("Planned {} keyword group(s) in {:?} mode", groups.len(), mode);
    groups
}

/// A group whose request failed; its rows are absent from the combined table.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFailure {
    pub group: KeywordGroup,
    pub error: FetchError,
}

/// Combined result of every group's request.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendOutcome {
    pub groups: Vec<KeywordGroup>,
    pub table: NormalizedTable<TimeSeriesRow>,
    pub failures: Vec<GroupFailure>,
}

impl TrendOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && self.failures.len() < self.groups.len()
    }

    pub fn all_failed(&self) -> bool {
        !self.groups.is_empty() && self.failures.len() == self.groups.len()
    }
}

/// Concatenates per-group tables in group order and collects failures.
pub fn reconcile(
    outcomes: Vec<(KeywordGroup, Result<NormalizedTable<TimeSeriesRow>, FetchError>)>,
) -> TrendOutcome {
    let mut groups = Vec::with_capacity(outcomes.len());
    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for (group, result) in outcomes {
        match result {
            Ok(table) => rows.extend(table.rows),
            Err(error) => failures.push(GroupFailure {
                group: group.clone(),
                error,
            }),
        }
        groups.push(group);
    }

    let table = if rows.is_empty() {
        NormalizedTable::empty("no data for the requested keywords")
    } else {
        NormalizedTable::new(rows)
    };

    TrendOutcome {
        groups,
        table,
        failures,
    }
}
