use crate::analyzer::pivot::PivotTable;

/// Symmetric matrix of Pearson coefficients between pivot columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix<CK> {
    pub labels: Vec<CK>,
    /// `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl<CK: PartialEq> CorrelationMatrix<CK> {
    pub fn get(&self, a: &CK, b: &CK) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation coefficient between two equal-length slices.
/// Returns `None` for fewer than two points or when either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let numerator: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let denominator_x: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let denominator_y: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let denominator = (denominator_x * denominator_y).sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some((numerator / denominator).clamp(-1.0, 1.0))
    }
}

/// Pairwise-complete correlation over a pivot's columns.
///
/// Each pair uses only the rows where both columns have a value. The diagonal
/// is exactly 1.0 for a column with at least two values and non-zero variance,
/// and `None` otherwise.
pub fn correlation_matrix<RK, CK: Clone>(table: &PivotTable<RK, CK>) -> CorrelationMatrix<CK> {
    let columns: Vec<Vec<Option<f64>>> = (0..table.n_cols()).map(|c| table.column(c)).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                .iter()
                .zip(columns[j].iter())
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();

            let r = pearson(&x, &y);
            values[i][j] = if i == j { r.map(|_| 1.0) } else { r };
            values[j][i] = values[i][j];
        }
    }

    CorrelationMatrix {
        labels: table.col_labels.clone(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::pivot::{pivot, Aggregation};

    #[test]
    fn pearson_basics() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), Some(1.0));
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), Some(-1.0));
        assert_eq!(pearson(&[1.0, 1.0], &[1.0, 2.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn symmetric_with_unit_diagonal() {
        let rows = [
            (1, "a", 10.0),
            (2, "a", 20.0),
            (3, "a", 25.0),
            (1, "b", 3.0),
            (2, "b", 1.0),
            (3, "b", 2.0),
            (1, "c", 7.0),
            (2, "c", 7.0),
            (3, "c", 7.0),
        ];
        let table = pivot(&rows, |r| r.0, |r| r.1, |r| Some(r.2), Aggregation::Mean);
        let corr = correlation_matrix(&table);

        assert_eq!(corr.labels, vec!["a", "b", "c"]);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(corr.values[i][j], corr.values[j][i]);
            }
        }
        assert_eq!(corr.get(&"a", &"a"), Some(1.0));
        assert_eq!(corr.get(&"b", &"b"), Some(1.0));
        assert_eq!(corr.get(&"c", &"c"), None);
        assert_eq!(corr.get(&"a", &"c"), None);
        assert!(corr.get(&"a", &"b").unwrap() < 0.0);
    }

    #[test]
    fn uses_pairwise_complete_rows() {
        // Row 4 has no "b"; it must not drop "a" x "c" below three points.
        let rows = [
            (1, "a", Some(1.0)),
            (2, "a", Some(2.0)),
            (3, "a", Some(3.0)),
            (4, "a", Some(4.0)),
            (1, "b", Some(5.0)),
            (2, "b", Some(1.0)),
            (3, "b", Some(9.0)),
            (4, "b", None),
            (1, "c", Some(2.0)),
            (2, "c", Some(4.0)),
            (3, "c", Some(6.0)),
            (4, "c", Some(8.0)),
        ];
        let table = pivot(&rows, |r| r.0, |r| r.1, |r| r.2, Aggregation::Mean);
        let corr = correlation_matrix(&table);

        assert_eq!(corr.get(&"a", &"c"), Some(1.0));
        let ab = corr.get(&"a", &"b").unwrap();
        let expected = pearson(&[1.0, 2.0, 3.0], &[5.0, 1.0, 9.0]).unwrap();
        assert!((ab - expected).abs() < 1e-12);
    }
}
