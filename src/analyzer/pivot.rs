use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Min,
    Max,
    Count,
}

impl Aggregation {
    /// `values` is never empty here; empty cells are handled by the caller.
    fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Count => values.len() as f64,
        }
    }
}

/// Dense 2D table with sorted row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable<RK, CK> {
    pub row_labels: Vec<RK>,
    pub col_labels: Vec<CK>,
    /// `cells[row][col]`; `None` where no observation exists.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl<RK: Ord, CK: Ord> PivotTable<RK, CK> {
    pub fn get(&self, row: &RK, col: &CK) -> Option<f64> {
        let r = self.row_labels.binary_search(row).ok()?;
        let c = self.col_labels.binary_search(col).ok()?;
        self.cells[r][c]
    }
}

impl<RK, CK> PivotTable<RK, CK> {
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn column(&self, col: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[col]).collect()
    }
}

/// Builds a pivot of `value` by `row_key` × `col_key` using one aggregation.
///
/// Labels are collected from every row, so a label whose rows all lack a
/// value still appears with empty cells.
pub fn pivot<R, RK, CK, FR, FC, FV>(
    rows: &[R],
    row_key: FR,
    col_key: FC,
    value: FV,
    aggregation: Aggregation,
) -> PivotTable<RK, CK>
where
    RK: Ord + Clone,
    CK: Ord + Clone,
    FR: Fn(&R) -> RK,
    FC: Fn(&R) -> CK,
    FV: Fn(&R) -> Option<f64>,
{
    let mut row_set: BTreeSet<RK> = BTreeSet::new();
    let mut col_set: BTreeSet<CK> = BTreeSet::new();
    let mut observed: BTreeMap<(RK, CK), Vec<f64>> = BTreeMap::new();

    for row in rows {
        let r = row_key(row);
        let c = col_key(row);
        row_set.insert(r.clone());
        col_set.insert(c.clone());
        if let Some(v) = value(row).filter(|v| !v.is_nan()) {
            observed.entry((r, c)).or_default().push(v);
        }
    }

    let row_labels: Vec<RK> = row_set.into_iter().collect();
    let col_labels: Vec<CK> = col_set.into_iter().collect();
    let mut cells = vec![vec![None; col_labels.len()]; row_labels.len()];

    for ((r, c), values) in observed {
        // Both labels were inserted above, so the searches succeed.
        if let (Ok(ri), Ok(ci)) = (row_labels.binary_search(&r), col_labels.binary_search(&c)) {
            cells[ri][ci] = Some(aggregation.apply(&values));
        }
    }

    PivotTable {
        row_labels,
        col_labels,
        cells,
    }
}
