//! Partition comparison: contingency tables, chi-squared, NMI and ARI.
//!
//! Used to compare SBM block assignments with the monkeys' covariates.
//!
//! | Measure | Range | Independence | Identical partitions |
//! |---------|-------|--------------|----------------------|
//! | [`ContingencyTable::chi_squared`] | p in [0, 1] | large p | small p |
//! | [`nmi`] | [0, 1] | 0 | 1 |
//! | [`ari`] | [-1, 1] | ~0 | 1 |
//!
//! ```rust
//! use troop::metrics::{ari, nmi, ContingencyTable};
//!
//! let blocks = [0, 0, 0, 1, 1, 1];
//! let sex = [0, 0, 0, 1, 1, 1];
//! assert!((nmi(&blocks, &sex) - 1.0).abs() < 1e-12);
//! assert!((ari(&blocks, &sex) - 1.0).abs() < 1e-12);
//!
//! let table = ContingencyTable::from_labels(&blocks, 2, &sex, 2).unwrap();
//! assert_eq!(table.counts()[0][0], 3);
//! ```
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)
//! - Strehl & Ghosh (2002). "Cluster ensembles" (NMI)
//! - Yates (1934). Continuity correction for 2x2 tables

use crate::error::{Error, Result};
use crate::special::chi_squared_sf;
use serde::Serialize;
use std::collections::HashMap;

/// Cross-tabulation of two labellings over the same nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<usize>>,
}

/// Result of a Pearson chi-squared independence test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquaredTest {
    /// Test statistic.
    pub statistic: f64,
    /// Degrees of freedom after dropping empty rows and columns.
    pub df: usize,
    /// Upper tail probability.
    pub p_value: f64,
    /// Whether the Yates correction was applied.
    pub corrected: bool,
    /// Smallest expected cell count.
    pub min_expected: f64,
}

impl ContingencyTable {
    /// Count co-occurrences of `rows[i]` and `cols[i]`.
    ///
    /// Labels are level indices below `n_rows` / `n_cols`; row and column
    /// names default to the indices.
    pub fn from_labels(rows: &[usize], n_rows: usize, cols: &[usize], n_cols: usize) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(Error::DimensionMismatch {
                expected: rows.len(),
                found: cols.len(),
            });
        }
        let mut counts = vec![vec![0usize; n_cols]; n_rows];
        for (&r, &c) in rows.iter().zip(cols) {
            if r >= n_rows {
                return Err(Error::InvalidParameter {
                    name: "rows",
                    message: format!("label {r} out of range for {n_rows} levels"),
                });
            }
            if c >= n_cols {
                return Err(Error::InvalidParameter {
                    name: "cols",
                    message: format!("label {c} out of range for {n_cols} levels"),
                });
            }
            counts[r][c] += 1;
        }
        Ok(Self {
            row_labels: (0..n_rows).map(|r| r.to_string()).collect(),
            col_labels: (0..n_cols).map(|c| c.to_string()).collect(),
            counts,
        })
    }

    /// Replace the row names.
    pub fn with_row_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.row_labels = labels.into_iter().map(Into::into).collect();
        self.row_labels.resize(self.counts.len(), String::new());
        self
    }

    /// Replace the column names.
    pub fn with_col_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        let n_cols = self.n_cols();
        self.col_labels = labels.into_iter().map(Into::into).collect();
        self.col_labels.resize(n_cols, String::new());
        self
    }

    /// Cell counts, rows first.
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Row names.
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Column names.
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.counts.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.counts.first().map_or(0, Vec::len)
    }

    /// Grand total.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Row sums.
    pub fn row_totals(&self) -> Vec<usize> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    /// Column sums.
    pub fn col_totals(&self) -> Vec<usize> {
        (0..self.n_cols())
            .map(|c| self.counts.iter().map(|r| r[c]).sum())
            .collect()
    }

    /// Pearson chi-squared test of independence.
    ///
    /// Empty rows and columns are dropped first. With `yates` set, a 2x2
    /// table gets the continuity correction `(|O - E| - min(0.5, |O - E|))²`.
    /// Fails with [`Error::Undefined`] when fewer than two non-empty rows or
    /// columns remain.
    pub fn chi_squared(&self, yates: bool) -> Result<ChiSquaredTest> {
        let row_tot = self.row_totals();
        let col_tot = self.col_totals();
        let rows: Vec<usize> = (0..self.n_rows()).filter(|&r| row_tot[r] > 0).collect();
        let cols: Vec<usize> = (0..self.n_cols()).filter(|&c| col_tot[c] > 0).collect();
        if rows.len() < 2 || cols.len() < 2 {
            return Err(Error::Undefined {
                statistic: "chi-squared",
                reason: "fewer than two non-empty rows or columns",
            });
        }

        let n = self.total() as f64;
        let corrected = yates && rows.len() == 2 && cols.len() == 2;
        let mut statistic = 0.0;
        let mut min_expected = f64::INFINITY;
        for &r in &rows {
            for &c in &cols {
                let expected = row_tot[r] as f64 * col_tot[c] as f64 / n;
                min_expected = min_expected.min(expected);
                let mut diff = (self.counts[r][c] as f64 - expected).abs();
                if corrected {
                    diff -= diff.min(0.5);
                }
                statistic += diff * diff / expected;
            }
        }

        if min_expected < 5.0 {
            tracing::warn!(
                min_expected,
                "chi-squared approximation may be inaccurate: expected counts below 5"
            );
        }

        let df = (rows.len() - 1) * (cols.len() - 1);
        Ok(ChiSquaredTest {
            statistic,
            df,
            p_value: chi_squared_sf(statistic, df as f64),
            corrected,
            min_expected,
        })
    }
}

impl std::fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .row_labels
            .iter()
            .chain(&self.col_labels)
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(5);
        write!(f, "{:>width$}", "")?;
        for c in &self.col_labels {
            write!(f, " {:>width$}", c)?;
        }
        writeln!(f)?;
        for (label, row) in self.row_labels.iter().zip(&self.counts) {
            write!(f, "{:>width$}", label)?;
            for count in row {
                write!(f, " {:>width$}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Joint counts keyed by `(pred, truth)`.
fn joint_counts(pred: &[usize], truth: &[usize]) -> HashMap<(usize, usize), usize> {
    let mut joint = HashMap::new();
    for (&p, &t) in pred.iter().zip(truth) {
        *joint.entry((p, t)).or_insert(0) += 1;
    }
    joint
}

fn marginals(labels: &[usize]) -> HashMap<usize, usize> {
    let mut counts = HashMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0) += 1;
    }
    counts
}

fn entropy(counts: &HashMap<usize, usize>, n: f64) -> f64 {
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            if p > 0.0 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

/// Normalized Mutual Information between two labellings.
///
/// ```text
/// NMI(U, V) = 2 * I(U; V) / (H(U) + H(V))
/// ```
///
/// Two constant labellings score 1. Mismatched lengths or empty input
/// score 0.
pub fn nmi(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }
    let n = pred.len() as f64;
    let joint = joint_counts(pred, truth);
    let p_pred = marginals(pred);
    let p_truth = marginals(truth);

    let mut mi = 0.0;
    for (&(p, t), &count) in &joint {
        let p_joint = count as f64 / n;
        let p_p = p_pred.get(&p).copied().unwrap_or(0) as f64 / n;
        let p_t = p_truth.get(&t).copied().unwrap_or(0) as f64 / n;
        if p_joint > 0.0 && p_p > 0.0 && p_t > 0.0 {
            mi += p_joint * (p_joint / (p_p * p_t)).ln();
        }
    }

    let denom = entropy(&p_pred, n) + entropy(&p_truth, n);
    if denom > 0.0 {
        (2.0 * mi / denom).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

/// Adjusted Rand Index between two labellings.
///
/// 0 for chance-level agreement, 1 for identical partitions.
pub fn ari(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }
    let joint = joint_counts(pred, truth);

    let sum_comb_ij: f64 = joint.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = marginals(pred).values().map(|&a| comb2(a) as f64).sum();
    let sum_comb_b: f64 = marginals(truth).values().map(|&b| comb2(b) as f64).sum();
    let comb_n = comb2(pred.len()) as f64;
    if comb_n == 0.0 {
        return 1.0;
    }

    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;
    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }
    (sum_comb_ij - expected) / denom
}
