//! Starting memberships for variational EM.

use ndarray::{Array2, ArrayView1};
use rand::prelude::*;
use rand_distr::Exp1;

/// Weight given to the k-means label when smoothing a hard start.
const HARD_START_WEIGHT: f64 = 0.9;

/// Connection profile of every node: its out-row followed by its in-column.
pub(crate) fn profiles(x: &Array2<f64>) -> Array2<f64> {
    let n = x.nrows();
    let mut out = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            out[[i, j]] = x[[i, j]];
            out[[i, n + j]] = x[[j, i]];
        }
    }
    out
}

fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// k-means++ seeding.
fn init_centroids(data: &Array2<f64>, k: usize, rng: &mut impl Rng) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::zeros((k, data.ncols()));

    let first = rng.random_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    for i in 1..k {
        let distances: Vec<f64> = (0..n)
            .map(|j| {
                (0..i)
                    .map(|c| squared_distance(&data.row(j), &centroids.row(c)))
                    .fold(f64::MAX, f64::min)
            })
            .collect();

        let total: f64 = distances.iter().sum();
        if total == 0.0 {
            let idx = rng.random_range(0..n);
            centroids.row_mut(i).assign(&data.row(idx));
            continue;
        }

        let threshold = rng.random::<f64>() * total;
        let mut cumsum = 0.0;
        let mut selected = n - 1;
        for (j, &d) in distances.iter().enumerate() {
            cumsum += d;
            if cumsum >= threshold {
                selected = j;
                break;
            }
        }
        centroids.row_mut(i).assign(&data.row(selected));
    }

    centroids
}

/// Lloyd iterations from a k-means++ start; returns one label per row.
pub(crate) fn kmeans_labels(data: &Array2<f64>, k: usize, max_iter: usize, rng: &mut impl Rng) -> Vec<usize> {
    let n = data.nrows();
    let d = data.ncols();
    let mut centroids = init_centroids(data, k, rng);
    let mut labels = vec![usize::MAX; n];

    for _ in 0..max_iter {
        let mut changed = false;
        for (i, label) in labels.iter_mut().enumerate() {
            let point = data.row(i);
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for c in 0..k {
                let dist = squared_distance(&point, &centroids.row(c));
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = vec![0usize; k];
        for (i, &c) in labels.iter().enumerate() {
            let mut row = sums.row_mut(c);
            row += &data.row(i);
            counts[c] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                let mut row = sums.row_mut(c);
                row /= counts[c] as f64;
                centroids.row_mut(c).assign(&row);
            } else {
                // Empty cluster: reseed from a random point.
                let idx = rng.random_range(0..n);
                centroids.row_mut(c).assign(&data.row(idx));
            }
        }
    }

    labels
}

/// Soft memberships concentrated on the given hard labels.
pub(crate) fn smoothed_one_hot(labels: &[usize], k: usize) -> Array2<f64> {
    let n = labels.len();
    let off = if k > 1 {
        (1.0 - HARD_START_WEIGHT) / (k - 1) as f64
    } else {
        0.0
    };
    let mut tau = Array2::from_elem((n, k), off);
    for (i, &c) in labels.iter().enumerate() {
        tau[[i, c]] = if k > 1 { HARD_START_WEIGHT } else { 1.0 };
    }
    tau
}

/// Memberships drawn row-wise from a flat Dirichlet.
pub(crate) fn random_memberships(n: usize, k: usize, rng: &mut impl Rng) -> Array2<f64> {
    let mut tau = Array2::zeros((n, k));
    for mut row in tau.rows_mut() {
        for v in row.iter_mut() {
            let e: f64 = rng.sample(Exp1);
            *v = e + 1e-12;
        }
        let s = row.sum();
        row /= s;
    }
    tau
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kmeans_separates_obvious_groups() {
        let data = Array2::from_shape_vec(
            (4, 2),
            vec![0.0, 0.0, 0.1, 0.1, 10.0, 10.0, 10.1, 10.1],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let labels = kmeans_labels(&data, 2, 50, &mut rng);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn profiles_stack_rows_and_columns() {
        let x = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 0.0, 0.0]).unwrap();
        let p = profiles(&x);
        assert_eq!(p.row(0).to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(p.row(1).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn starting_rows_are_distributions() {
        let mut rng = StdRng::seed_from_u64(7);
        for tau in [smoothed_one_hot(&[0, 2, 1], 3), random_memberships(5, 3, &mut rng)] {
            for row in tau.rows() {
                assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
                assert!(row.iter().all(|&v| v > 0.0));
            }
        }
    }
}
