use super::pivot::PivotTable;

// ---------------------------------------------------------------------------
// CorrelationMatrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation between the effect columns of a pivot.
///
/// A column with zero variance (or a pivot with fewer than two rows) has no
/// defined correlation: every entry in its row and column, including the
/// diagonal, is `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]`, symmetric, each finite value in `[-1, 1]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Entry for a pair of labels, `None` if either label is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Correlate the count columns of `pivot`.
pub fn correlate(pivot: &PivotTable) -> CorrelationMatrix {
    let n = pivot.columns.len();
    let centered: Vec<Option<Vec<f64>>> = (0..n).map(|j| center(&pivot.column(j))).collect();

    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        let Some(a) = &centered[i] else { continue };
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let Some(b) = &centered[j] else { continue };
            let r = pearson(a, b);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: pivot.columns.clone(),
        values,
    }
}

/// Deviations from the mean, or `None` when the column has no variance.
fn center(column: &[f64]) -> Option<Vec<f64>> {
    if column.len() < 2 {
        return None;
    }
    let mean = column.iter().sum::<f64>() / column.len() as f64;
    let dev: Vec<f64> = column.iter().map(|v| v - mean).collect();
    let ss: f64 = dev.iter().map(|d| d * d).sum();
    (ss > 0.0).then_some(dev)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let cov: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let ss_a: f64 = a.iter().map(|x| x * x).sum();
    let ss_b: f64 = b.iter().map(|y| y * y).sum();
    (cov / (ss_a * ss_b).sqrt()).clamp(-1.0, 1.0)
}
