//! Directed Bernoulli stochastic block model.
//!
//! # The Model
//!
//! Each node draws a latent block `zᵢ ~ Categorical(α)`; each ordered pair
//! `i ≠ j` then carries an edge independently with probability `π[zᵢ, zⱼ]`.
//!
//! # Variational EM
//!
//! The posterior over `Z` is replaced by a product of per-node
//! distributions `τᵢ`, and the bound
//!
//! ```text
//! J(τ, α, π) = Σᵢₖ τᵢₖ log αₖ
//!            + Σ_{i≠j} Σₖₗ τᵢₖ τⱼₗ [Xᵢⱼ log πₖₗ + (1 − Xᵢⱼ) log(1 − πₖₗ)]
//!            − Σᵢₖ τᵢₖ log τᵢₖ
//! ```
//!
//! is maximized by alternating:
//!
//! **E-step** (fixed point, normalized with log-sum-exp):
//! ```text
//! log τᵢₖ ∝ log αₖ + Σ_{j≠i} Σₗ τⱼₗ [b(Xᵢⱼ; πₖₗ) + b(Xⱼᵢ; πₗₖ)]
//! ```
//!
//! **M-step** (closed form):
//! - αₖ = (1/n) Σᵢ τᵢₖ
//! - πₖₗ = Σ_{i≠j} τᵢₖ τⱼₗ Xᵢⱼ / Σ_{i≠j} τᵢₖ τⱼₗ
//!
//! # Failure Modes
//!
//! - **Local optima**: handled with a k-means++ start on connection profiles
//!   plus seeded random restarts; the best bound wins.
//! - **Empty blocks**: memberships are floored so no block's weight reaches
//!   exactly zero.
//! - **Iteration limit**: the fit is still returned, flagged `converged = false`.

use super::init::{kmeans_labels, profiles, random_memberships, smoothed_one_hot};
use super::traits::BlockModelEstimator;
use super::{icl_penalty, BlockModelFit};
use crate::error::{Error, Result};
use crate::special::softmax_in_place;
use crate::stats::Adjacency;
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;

/// Smallest membership probability kept after an E-step.
const TAU_FLOOR: f64 = 1e-10;
/// Connectivity probabilities are kept inside `[PI_FLOOR, 1 - PI_FLOOR]`.
const PI_FLOOR: f64 = 1e-10;
/// Inner fixed-point sweeps per E-step.
const FIXED_POINT_ITER: usize = 20;
const FIXED_POINT_TOL: f64 = 1e-9;

/// Bernoulli SBM estimated by variational EM.
#[derive(Debug, Clone)]
pub struct BernoulliSbm {
    /// Maximum EM iterations per start.
    max_iter: usize,
    /// Relative change in the bound that counts as converged.
    tol: f64,
    /// Random starts in addition to the k-means++ start.
    restarts: usize,
    /// Lloyd iterations for the k-means++ start.
    kmeans_iter: usize,
    /// Random seed.
    seed: Option<u64>,
}

impl BernoulliSbm {
    /// Estimator with default settings.
    pub fn new() -> Self {
        Self {
            max_iter: 500,
            tol: 1e-8,
            restarts: 4,
            kmeans_iter: 50,
            seed: None,
        }
    }

    /// Set maximum EM iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of random restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn trivial_fit(x: &Array2<f64>) -> BlockModelFit {
        let n = x.nrows();
        let pairs = (n * (n - 1)) as f64;
        let p = (x.sum() / pairs).clamp(PI_FLOOR, 1.0 - PI_FLOOR);
        let edges = x.sum();
        let ll = edges * p.ln() + (pairs - edges) * (1.0 - p).ln();
        BlockModelFit {
            n_blocks: 1,
            proportions: vec![1.0],
            connectivity: vec![vec![p]],
            memberships: vec![vec![1.0]; n],
            elbo: ll,
            complete_log_likelihood: ll,
            icl: ll - icl_penalty(n, 1),
            iterations: 0,
            converged: true,
        }
    }

    /// One variational EM run from `tau`.
    fn run(&self, x: &Array2<f64>, xt: &Array2<f64>, tau: Array2<f64>) -> Result<Vem> {
        let mut state = Vem::from_memberships(x, xt, tau);
        let mut prev = state.elbo;

        for iter in 1..=self.max_iter {
            state.e_step(x, xt);
            state.m_step(x);
            state.evaluate(x, xt);
            state.iterations = iter;

            if !state.elbo.is_finite() {
                return Err(Error::ConvergenceFailure {
                    algorithm: "SBM variational EM",
                    iterations: iter,
                });
            }
            let delta = (state.elbo - prev).abs();
            tracing::trace!(iter, elbo = state.elbo, delta, "vem step");
            if delta <= self.tol * (1.0 + state.elbo.abs()) {
                state.converged = true;
                break;
            }
            prev = state.elbo;
        }
        Ok(state)
    }
}

impl Default for BernoulliSbm {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockModelEstimator for BernoulliSbm {
    fn estimate(&self, adj: &Adjacency, n_blocks: usize) -> Result<BlockModelFit> {
        let n = adj.node_count();
        if n < 2 {
            return Err(Error::EmptyInput);
        }
        if n_blocks == 0 || n_blocks > n {
            return Err(Error::InvalidParameter {
                name: "n_blocks",
                message: format!("must be in 1..={n}, got {n_blocks}"),
            });
        }

        let x = adj.to_matrix();
        if n_blocks == 1 {
            return Ok(Self::trivial_fit(&x));
        }
        let xt = x.t().to_owned();

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut starts = Vec::with_capacity(self.restarts + 1);
        let labels = kmeans_labels(&profiles(&x), n_blocks, self.kmeans_iter, &mut rng);
        starts.push(smoothed_one_hot(&labels, n_blocks));
        for _ in 0..self.restarts {
            starts.push(random_memberships(n, n_blocks, &mut rng));
        }

        let mut best: Option<Vem> = None;
        let mut last_err = None;
        for (start, tau) in starts.into_iter().enumerate() {
            match self.run(&x, &xt, tau) {
                Ok(state) => {
                    tracing::debug!(
                        n_blocks,
                        start,
                        elbo = state.elbo,
                        iterations = state.iterations,
                        converged = state.converged,
                        "sbm start finished"
                    );
                    if best.as_ref().map_or(true, |b| state.elbo > b.elbo) {
                        best = Some(state);
                    }
                }
                Err(e) => last_err = Some(e),
            }
        }

        let state = match (best, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => return Err(e),
            (None, None) => return Err(Error::EmptyInput),
        };
        if !state.converged {
            tracing::warn!(
                n_blocks,
                iterations = state.iterations,
                "SBM variational EM hit the iteration limit"
            );
        }
        Ok(state.into_fit(n))
    }
}

/// Working state of one EM run.
struct Vem {
    tau: Array2<f64>,
    alpha: Array1<f64>,
    pi: Array2<f64>,
    elbo: f64,
    complete: f64,
    iterations: usize,
    converged: bool,
}

impl Vem {
    fn from_memberships(x: &Array2<f64>, xt: &Array2<f64>, tau: Array2<f64>) -> Self {
        let k = tau.ncols();
        let mut state = Self {
            tau,
            alpha: Array1::zeros(k),
            pi: Array2::zeros((k, k)),
            elbo: f64::NEG_INFINITY,
            complete: f64::NEG_INFINITY,
            iterations: 0,
            converged: false,
        };
        state.m_step(x);
        state.evaluate(x, xt);
        state
    }

    fn m_step(&mut self, x: &Array2<f64>) {
        let n = self.tau.nrows() as f64;
        let k = self.tau.ncols();
        let sums = self.tau.sum_axis(Axis(0));
        self.alpha = &sums / n;

        let edges = self.tau.t().dot(&x.dot(&self.tau));
        let same_node = self.tau.t().dot(&self.tau);
        for a in 0..k {
            for b in 0..k {
                let pairs = sums[a] * sums[b] - same_node[[a, b]];
                let p = if pairs > 0.0 { edges[[a, b]] / pairs } else { 0.5 };
                self.pi[[a, b]] = p.clamp(PI_FLOOR, 1.0 - PI_FLOOR);
            }
        }
    }

    /// Expected log-likelihood contributions `(outgoing, incoming)` per node and block.
    fn edge_terms(&self, x: &Array2<f64>, xt: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let log_pi = self.pi.mapv(f64::ln);
        let log_not = self.pi.mapv(|p| (1.0 - p).ln());
        let sums = self.tau.sum_axis(Axis(0));

        let x_tau = x.dot(&self.tau);
        let xt_tau = xt.dot(&self.tau);
        let mut no_out = -&self.tau;
        no_out += &sums;
        no_out -= &x_tau;
        let mut no_in = -&self.tau;
        no_in += &sums;
        no_in -= &xt_tau;

        let outgoing = x_tau.dot(&log_pi.t()) + no_out.dot(&log_not.t());
        let incoming = xt_tau.dot(&log_pi) + no_in.dot(&log_not);
        (outgoing, incoming)
    }

    fn e_step(&mut self, x: &Array2<f64>, xt: &Array2<f64>) {
        let k = self.tau.ncols();
        let log_alpha = self.alpha.mapv(|a| a.max(TAU_FLOOR).ln());
        let mut row = vec![0.0; k];

        for _ in 0..FIXED_POINT_ITER {
            let (outgoing, incoming) = self.edge_terms(x, xt);
            let mut delta: f64 = 0.0;
            let mut next = Array2::zeros(self.tau.raw_dim());
            for i in 0..self.tau.nrows() {
                for c in 0..k {
                    row[c] = log_alpha[c] + outgoing[[i, c]] + incoming[[i, c]];
                }
                softmax_in_place(&mut row);
                let mut total = 0.0;
                for c in 0..k {
                    let v = row[c].max(TAU_FLOOR);
                    next[[i, c]] = v;
                    total += v;
                }
                for c in 0..k {
                    next[[i, c]] /= total;
                    delta = delta.max((next[[i, c]] - self.tau[[i, c]]).abs());
                }
            }
            self.tau = next;
            if delta < FIXED_POINT_TOL {
                break;
            }
        }
    }

    fn evaluate(&mut self, x: &Array2<f64>, xt: &Array2<f64>) {
        let log_alpha = self.alpha.mapv(|a| a.max(TAU_FLOOR).ln());
        let (outgoing, _) = self.edge_terms(x, xt);
        let prior: f64 = self.tau.dot(&log_alpha).sum();
        let edges: f64 = (&self.tau * &outgoing).sum();
        let entropy: f64 = self
            .tau
            .iter()
            .filter(|&&t| t > 0.0)
            .map(|&t| -t * t.ln())
            .sum();
        self.complete = prior + edges;
        self.elbo = self.complete + entropy;
    }

    /// Final fit with blocks ordered by decreasing proportion.
    fn into_fit(self, n: usize) -> BlockModelFit {
        let k = self.alpha.len();
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| {
            self.alpha[b]
                .partial_cmp(&self.alpha[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        BlockModelFit {
            n_blocks: k,
            proportions: order.iter().map(|&a| self.alpha[a]).collect(),
            connectivity: order
                .iter()
                .map(|&a| order.iter().map(|&b| self.pi[[a, b]]).collect())
                .collect(),
            memberships: self
                .tau
                .rows()
                .into_iter()
                .map(|row| order.iter().map(|&a| row[a]).collect())
                .collect(),
            elbo: self.elbo,
            complete_log_likelihood: self.complete,
            icl: self.complete - icl_penalty(n, k),
            iterations: self.iterations,
            converged: self.converged,
        }
    }
}
