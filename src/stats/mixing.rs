//! Attribute mixing: modularity and nominal assortativity.
//!
//! ## Modularity
//!
//! Computed on the undirected collapse of the graph. For a labelling `c`:
//!
//! ```text
//! Q = Σ_c [ L_c / m - γ (D_c / 2m)² ]
//! ```
//!
//! where `m` is the number of undirected edges, `L_c` the number of edges
//! inside category `c`, and `D_c` the degree sum of its members. `γ = 1`
//! gives the standard Newman-Girvan modularity; `Q` lies in `[-1/2, 1)`.
//!
//! ## Nominal assortativity
//!
//! Newman (2003): with `e_ij` the fraction of edges running from category
//! `i` to category `j`, `a_i = Σ_j e_ij` and `b_j = Σ_i e_ij`,
//!
//! ```text
//! r = (Σ_i e_ii - Σ_i a_i b_i) / (1 - Σ_i a_i b_i)
//! ```
//!
//! `r = 1` for perfect homophily, `0` for random mixing, negative for
//! disassortative mixing.

use super::adjacency::Adjacency;
use crate::error::{Error, Result};

fn check_labels(adj: &Adjacency, labels: &[usize]) -> Result<usize> {
    if labels.len() != adj.node_count() {
        return Err(Error::DimensionMismatch {
            expected: adj.node_count(),
            found: labels.len(),
        });
    }
    Ok(labels.iter().copied().max().map_or(0, |m| m + 1))
}

/// Modularity of `labels` at resolution `gamma`.
pub fn modularity_with_resolution(adj: &Adjacency, labels: &[usize], gamma: f64) -> Result<f64> {
    let k = check_labels(adj, labels)?;
    let m = adj.undirected_edge_count() as f64;
    if m == 0.0 {
        return Err(Error::Undefined {
            statistic: "modularity",
            reason: "graph has no edges",
        });
    }

    let mut internal = vec![0.0; k];
    let mut degree_sum = vec![0.0; k];
    for i in 0..adj.node_count() {
        let ci = labels[i];
        degree_sum[ci] += adj.neighbors(i).len() as f64;
        for &j in adj.neighbors(i) {
            if j > i && labels[j] == ci {
                internal[ci] += 1.0;
            }
        }
    }

    Ok(internal
        .iter()
        .zip(&degree_sum)
        .map(|(&l, &d)| l / m - gamma * (d / (2.0 * m)).powi(2))
        .sum())
}

/// Standard (`γ = 1`) modularity of `labels`.
pub fn modularity(adj: &Adjacency, labels: &[usize]) -> Result<f64> {
    modularity_with_resolution(adj, labels, 1.0)
}

/// Mixing matrix `e_ij`: fraction of edges from category `i` to `j`.
///
/// With `directed = false` each undirected edge contributes to both
/// `e_ij` and `e_ji`, making the matrix symmetric.
pub fn mixing_matrix(adj: &Adjacency, labels: &[usize], directed: bool) -> Result<Vec<Vec<f64>>> {
    let k = check_labels(adj, labels)?;
    let mut e = vec![vec![0.0; k]; k];
    let mut total = 0.0;
    if directed {
        for (i, j) in adj.edges() {
            e[labels[i]][labels[j]] += 1.0;
            total += 1.0;
        }
    } else {
        for i in 0..adj.node_count() {
            for &j in adj.neighbors(i) {
                e[labels[i]][labels[j]] += 1.0;
                total += 1.0;
            }
        }
    }
    if total == 0.0 {
        return Err(Error::Undefined {
            statistic: "assortativity",
            reason: "graph has no edges",
        });
    }
    for row in &mut e {
        for v in row.iter_mut() {
            *v /= total;
        }
    }
    Ok(e)
}

/// Newman's nominal assortativity coefficient for `labels`.
pub fn nominal_assortativity(adj: &Adjacency, labels: &[usize], directed: bool) -> Result<f64> {
    let e = mixing_matrix(adj, labels, directed)?;
    let k = e.len();
    let trace: f64 = (0..k).map(|i| e[i][i]).sum();
    let ab: f64 = (0..k)
        .map(|i| {
            let a: f64 = e[i].iter().sum();
            let b: f64 = e.iter().map(|row| row[i]).sum();
            a * b
        })
        .sum();
    let denom = 1.0 - ab;
    if denom.abs() < 1e-12 {
        return Err(Error::Undefined {
            statistic: "assortativity",
            reason: "all edge endpoints share one category",
        });
    }
    Ok((trace - ab) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangles() -> Adjacency {
        Adjacency::from_edges(
            6,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
        )
    }

    #[test]
    fn modularity_of_natural_split() {
        let adj = two_triangles();
        // m = 7, L = [3, 3], D = [7, 7]
        let q = modularity(&adj, &[0, 0, 0, 1, 1, 1]).unwrap();
        assert_relative_eq!(q, 6.0 / 7.0 - 0.5, epsilon = 1e-12);
    }

    #[test]
    fn single_category_has_zero_modularity() {
        let adj = two_triangles();
        let q = modularity(&adj, &[0; 6]).unwrap();
        assert_relative_eq!(q, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn modularity_direction_is_collapsed() {
        let a = Adjacency::from_edges(4, &[(0, 1), (2, 3)]);
        let b = Adjacency::from_edges(4, &[(0, 1), (1, 0), (3, 2)]);
        let labels = [0, 0, 1, 1];
        assert_relative_eq!(
            modularity(&a, &labels).unwrap(),
            modularity(&b, &labels).unwrap()
        );
    }

    #[test]
    fn higher_resolution_lowers_modularity() {
        let adj = two_triangles();
        let labels = [0, 0, 0, 1, 1, 1];
        let q1 = modularity_with_resolution(&adj, &labels, 1.0).unwrap();
        let q2 = modularity_with_resolution(&adj, &labels, 2.0).unwrap();
        assert!(q2 < q1);
    }

    #[test]
    fn label_length_is_checked() {
        let err = modularity(&two_triangles(), &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 6, found: 2 }));
    }

    #[test]
    fn perfect_homophily_is_one() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 0), (2, 3)]);
        let r = nominal_assortativity(&adj, &[0, 0, 1, 1], true).unwrap();
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bipartite_mixing_is_negative() {
        let adj = Adjacency::from_edges(4, &[(0, 2), (1, 3), (2, 1)]);
        let r = nominal_assortativity(&adj, &[0, 0, 1, 1], true).unwrap();
        assert!(r < 0.0);
        assert!(r >= -1.0);
    }

    #[test]
    fn single_category_assortativity_is_undefined() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let err = nominal_assortativity(&adj, &[0, 0, 0], true).unwrap_err();
        assert!(matches!(err, Error::Undefined { .. }));
    }

    #[test]
    fn undirected_mixing_is_symmetric() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let e = mixing_matrix(&adj, &[0, 1, 1], false).unwrap();
        assert_relative_eq!(e[0][1], e[1][0]);
        let total: f64 = e.iter().flatten().sum();
        assert_relative_eq!(total, 1.0);
    }
}
