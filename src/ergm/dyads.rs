//! Dyad-level sufficient statistics.
//!
//! Every supported term is a sum over unordered dyads `{i, j}` of a
//! function of the dyad's state alone. A dyad has four states:
//!
//! | State | Edges | Statistic |
//! |-------|-------|-----------|
//! | 0 | none | `0` |
//! | 1 | `i → j` | `h(i, j)` |
//! | 2 | `j → i` | `h(j, i)` |
//! | 3 | both | `h(i, j) + h(j, i) + e_mutual` |
//!
//! so under parameters `θ` the dyads are independent with state
//! log-weights `0, θ·h(i,j), θ·h(j,i), θ·(h(i,j) + h(j,i) + e_mutual)`.

use super::terms::ModelSpec;
use crate::attributes::Covariate;
use crate::error::{Error, Result};
use crate::special::softmax_in_place;
use crate::network::GroomingNetwork;
use crate::stats::Adjacency;
use rand::Rng;
use std::collections::BTreeMap;

/// A directed graph with the categorical covariates terms can refer to.
#[derive(Debug, Clone)]
pub struct ErgmData {
    adj: Adjacency,
    levels: BTreeMap<Covariate, Vec<usize>>,
}

impl ErgmData {
    /// Pair a graph with per-node level indices.
    ///
    /// Every label vector must have one entry per node, below the
    /// covariate's level count.
    pub fn new(adj: Adjacency, levels: BTreeMap<Covariate, Vec<usize>>) -> Result<Self> {
        let n = adj.node_count();
        for (&c, labels) in &levels {
            if labels.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: labels.len(),
                });
            }
            if let Some(&bad) = labels.iter().find(|&&l| l >= c.n_levels()) {
                return Err(Error::InvalidParameter {
                    name: "levels",
                    message: format!("level {bad} out of range for {c}"),
                });
            }
        }
        Ok(Self { adj, levels })
    }

    /// Graph and every covariate of a grooming network.
    pub fn from_network(network: &GroomingNetwork) -> Self {
        Self {
            adj: network.adjacency(),
            levels: Covariate::ALL
                .iter()
                .map(|&c| (c, network.labels(c)))
                .collect(),
        }
    }

    /// The observed graph.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adj
    }

    /// Level indices for `covariate`, if present.
    pub fn levels(&self, covariate: Covariate) -> Option<&[usize]> {
        self.levels.get(&covariate).map(Vec::as_slice)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adj.node_count()
    }
}

/// Log-likelihood, score and information at one parameter vector.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub log_likelihood: f64,
    pub gradient: Vec<f64>,
    /// Row-major `p x p`.
    pub information: Vec<f64>,
}

/// Per-dyad edge statistics for one model on one graph.
#[derive(Debug, Clone)]
pub(crate) struct DyadTable {
    n: usize,
    p: usize,
    mutual: Option<usize>,
    pairs: Vec<(usize, usize)>,
    /// `h(i, j)` for each pair, `p` values apiece.
    forward: Vec<f64>,
    /// `h(j, i)` for each pair.
    backward: Vec<f64>,
    /// Observed state of each pair.
    observed: Vec<u8>,
}

impl DyadTable {
    pub fn new(spec: &ModelSpec, data: &ErgmData) -> Result<Self> {
        for c in spec.covariates() {
            if data.levels(c).is_none() {
                return Err(Error::InvalidModel(format!(
                    "term refers to {c}, which the data does not carry"
                )));
            }
        }
        let n = data.node_count();
        if n < 2 {
            return Err(Error::EmptyInput);
        }
        let p = spec.dimension();
        let n_pairs = n * (n - 1) / 2;
        let mut pairs = Vec::with_capacity(n_pairs);
        let mut forward = vec![0.0; n_pairs * p];
        let mut backward = vec![0.0; n_pairs * p];
        let mut observed = Vec::with_capacity(n_pairs);

        let level_pair = |c: Covariate, a: usize, b: usize| {
            data.levels(c).map_or((0, 0), |l| (l[a], l[b]))
        };

        for i in 0..n {
            for j in (i + 1)..n {
                let d = pairs.len();
                let f = &mut forward[d * p..(d + 1) * p];
                let b = &mut backward[d * p..(d + 1) * p];
                for (offset, term) in spec.offsets() {
                    let dim = term.dimension();
                    term.edge_contribution(|c| level_pair(c, i, j), &mut f[offset..offset + dim]);
                    term.edge_contribution(|c| level_pair(c, j, i), &mut b[offset..offset + dim]);
                }
                let ij = data.adj.has_edge(i, j) as u8;
                let ji = data.adj.has_edge(j, i) as u8;
                observed.push(ij | (ji << 1));
                pairs.push((i, j));
            }
        }

        Ok(Self {
            n,
            p,
            mutual: spec.mutual_index(),
            pairs,
            forward,
            backward,
            observed,
        })
    }

    pub fn dimension(&self) -> usize {
        self.p
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// The same dyads with only the statistic columns in `keep`.
    pub fn restrict(&self, keep: &[usize]) -> Self {
        let p = self.p;
        let pick = |values: &[f64]| -> Vec<f64> {
            (0..self.pairs.len())
                .flat_map(|d| keep.iter().map(move |&k| values[d * p + k]))
                .collect()
        };
        Self {
            n: self.n,
            p: keep.len(),
            mutual: self.mutual.and_then(|m| keep.iter().position(|&k| k == m)),
            pairs: self.pairs.clone(),
            forward: pick(&self.forward),
            backward: pick(&self.backward),
            observed: self.observed.clone(),
        }
    }

    /// Add the statistic of `state` for dyad `d` into `out`.
    fn add_state_stats(&self, d: usize, state: u8, out: &mut [f64]) {
        let p = self.p;
        if state & 1 != 0 {
            for (o, v) in out.iter_mut().zip(&self.forward[d * p..(d + 1) * p]) {
                *o += v;
            }
        }
        if state & 2 != 0 {
            for (o, v) in out.iter_mut().zip(&self.backward[d * p..(d + 1) * p]) {
                *o += v;
            }
        }
        if state == 3 {
            if let Some(m) = self.mutual {
                out[m] += 1.0;
            }
        }
    }

    /// Sufficient statistics of the observed graph.
    pub fn observed_stats(&self) -> Vec<f64> {
        let mut g = vec![0.0; self.p];
        for (d, &s) in self.observed.iter().enumerate() {
            self.add_state_stats(d, s, &mut g);
        }
        g
    }

    /// Sufficient statistics of a graph given as dyad states.
    pub fn stats_of(&self, states: &[u8]) -> Vec<f64> {
        let mut g = vec![0.0; self.p];
        for (d, &s) in states.iter().enumerate() {
            self.add_state_stats(d, s, &mut g);
        }
        g
    }

    /// Log-weights of the four states of dyad `d`.
    fn log_weights(&self, d: usize, theta: &[f64]) -> [f64; 4] {
        let p = self.p;
        let dot = |v: &[f64]| v.iter().zip(theta).map(|(a, b)| a * b).sum::<f64>();
        let a = dot(&self.forward[d * p..(d + 1) * p]);
        let b = dot(&self.backward[d * p..(d + 1) * p]);
        let c = self.mutual.map_or(0.0, |m| theta[m]);
        [0.0, a, b, a + b + c]
    }

    fn state_probs(weights: &[f64; 4]) -> ([f64; 4], f64) {
        let mut probs = *weights;
        let log_z = softmax_in_place(&mut probs);
        (probs, log_z)
    }

    /// Log-likelihood, score and Fisher information at `theta`.
    pub fn evaluate(&self, theta: &[f64]) -> Evaluation {
        let p = self.p;
        let mut log_likelihood = 0.0;
        let mut gradient = self.observed_stats();
        let mut information = vec![0.0; p * p];
        let mut stats = [vec![0.0; p], vec![0.0; p], vec![0.0; p], vec![0.0; p]];
        let mut mean = vec![0.0; p];

        for d in 0..self.pairs.len() {
            let weights = self.log_weights(d, theta);
            let (probs, log_z) = Self::state_probs(&weights);
            log_likelihood += weights[self.observed[d] as usize] - log_z;

            for (s, g) in stats.iter_mut().enumerate() {
                g.iter_mut().for_each(|v| *v = 0.0);
                self.add_state_stats(d, s as u8, g);
            }
            for k in 0..p {
                mean[k] = (1..4).map(|s| probs[s] * stats[s][k]).sum();
                gradient[k] -= mean[k];
            }
            for s in 1..4 {
                if probs[s] == 0.0 {
                    continue;
                }
                for a in 0..p {
                    let ga = stats[s][a];
                    if ga == 0.0 {
                        continue;
                    }
                    for b in 0..p {
                        information[a * p + b] += probs[s] * ga * stats[s][b];
                    }
                }
            }
            for a in 0..p {
                for b in 0..p {
                    information[a * p + b] -= mean[a] * mean[b];
                }
            }
        }

        Evaluation {
            log_likelihood,
            gradient,
            information,
        }
    }

    /// Draw every dyad's state independently under `theta`.
    pub fn sample_states(&self, theta: &[f64], rng: &mut impl Rng) -> Vec<u8> {
        (0..self.pairs.len())
            .map(|d| {
                let (probs, _) = Self::state_probs(&self.log_weights(d, theta));
                let u: f64 = rng.random();
                let mut acc = 0.0;
                for (s, &pr) in probs.iter().enumerate() {
                    acc += pr;
                    if u < acc {
                        return s as u8;
                    }
                }
                3
            })
            .collect()
    }

    /// Directed graph with the given dyad states.
    pub fn graph_of(&self, states: &[u8]) -> Adjacency {
        let mut edges = Vec::new();
        for (&(i, j), &s) in self.pairs.iter().zip(states) {
            if s & 1 != 0 {
                edges.push((i, j));
            }
            if s & 2 != 0 {
                edges.push((j, i));
            }
        }
        Adjacency::from_edges(self.n, &edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ergm::terms::Term;
    use approx::assert_relative_eq;

    fn data() -> ErgmData {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 0), (1, 2), (2, 3)]);
        let levels = BTreeMap::from([(Covariate::Gender, vec![0, 0, 1, 1])]);
        ErgmData::new(adj, levels).unwrap()
    }

    #[test]
    fn observed_statistics() {
        let spec = ModelSpec::new(vec![
            Term::Edges,
            Term::Mutual,
            Term::nodematch(Covariate::Gender),
            Term::nodefactor(Covariate::Gender),
        ])
        .unwrap();
        let table = DyadTable::new(&spec, &data()).unwrap();
        // 4 edges, 1 mutual pair, matches: 0-1, 1-0, 2-3; male endpoints: 1-2 (1), 2-3 (2).
        assert_eq!(table.observed_stats(), vec![4.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn graph_round_trip_of_observed_states() {
        let spec = ModelSpec::new(vec![Term::Edges]).unwrap();
        let d = data();
        let table = DyadTable::new(&spec, &d).unwrap();
        assert_eq!(&table.graph_of(&table.observed), d.adjacency());
    }

    #[test]
    fn edges_only_likelihood_at_zero() {
        let spec = ModelSpec::new(vec![Term::Edges]).unwrap();
        let table = DyadTable::new(&spec, &data()).unwrap();
        let eval = table.evaluate(&[0.0]);
        // Every ordered pair is a fair coin.
        assert_relative_eq!(eval.log_likelihood, -12.0 * 2f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(eval.gradient[0], 4.0 - 6.0, epsilon = 1e-12);
        assert_relative_eq!(eval.information[0], 12.0 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn missing_covariate_is_rejected() {
        let spec = ModelSpec::new(vec![Term::nodematch(Covariate::Age)]).unwrap();
        assert!(matches!(
            DyadTable::new(&spec, &data()),
            Err(Error::InvalidModel(_))
        ));
    }

    #[test]
    fn bad_levels_are_rejected() {
        let adj = Adjacency::from_edges(2, &[(0, 1)]);
        let short = BTreeMap::from([(Covariate::Age, vec![0])]);
        assert!(ErgmData::new(adj.clone(), short).is_err());
        let wide = BTreeMap::from([(Covariate::Age, vec![0, 2])]);
        assert!(ErgmData::new(adj, wide).is_err());
    }

    #[test]
    fn restriction_keeps_selected_columns() {
        let spec = ModelSpec::new(vec![
            Term::Edges,
            Term::Mutual,
            Term::nodematch(Covariate::Gender),
        ])
        .unwrap();
        let table = DyadTable::new(&spec, &data()).unwrap();
        let reduced = table.restrict(&[1, 2]);
        assert_eq!(reduced.dimension(), 2);
        assert_eq!(reduced.observed_stats(), vec![1.0, 3.0]);
        assert_eq!(table.restrict(&[0, 2]).observed_stats(), vec![4.0, 3.0]);
    }
}
