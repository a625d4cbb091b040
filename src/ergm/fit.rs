//! Maximum likelihood for dyad-independent ERGMs.
//!
//! The log-likelihood of a dyad-independent model is an exact sum over
//! dyads, so Newton-Raphson on it needs no simulation:
//!
//! ```text
//! ℓ(θ)   = θ·g(y) − Σ_d log Z_d(θ)
//! ∇ℓ(θ)  = g(y) − Σ_d E_θ[g_d]
//! I(θ)   = Σ_d Cov_θ[g_d]
//! θ ← θ + I(θ)⁻¹ ∇ℓ(θ)
//! ```
//!
//! Each step is halved until the likelihood does not decrease. Standard
//! errors come from the inverse information at the optimum.
//!
//! Statistics that are linear combinations of earlier ones (a `nodefactor`
//! next to per-level `nodematch` on a two-level attribute, or `nodematch`
//! on an attribute every monkey shares) leave the information singular
//! for every `θ`. Such columns are found up front, in term order, and
//! reported as aliased with no estimate; the rest of the model is fitted
//! without them.

use super::dyads::{DyadTable, ErgmData, Evaluation};
use super::terms::ModelSpec;
use super::traits::ErgmEstimator;
use crate::error::{Error, Result};
use crate::special::normal_two_sided_p;
use faer::prelude::*;
use faer::Mat;
use serde::Serialize;
use std::fmt;

/// One estimated coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    /// Coefficient label, e.g. `nodematch.Gender`.
    pub term: String,
    /// Maximum likelihood estimate.
    pub estimate: f64,
    /// Standard error from the inverse Fisher information.
    pub std_error: f64,
    /// Wald statistic.
    pub z_value: f64,
    /// Two-sided p-value of the Wald statistic.
    pub p_value: f64,
    /// Linearly dependent on earlier statistics; estimate and errors are NaN.
    pub aliased: bool,
}

impl Coefficient {
    /// Conventional significance code.
    pub fn stars(&self) -> &'static str {
        if self.aliased {
            return "";
        }
        match self.p_value {
            p if p < 0.001 => "***",
            p if p < 0.01 => "**",
            p if p < 0.05 => "*",
            p if p < 0.1 => ".",
            _ => "",
        }
    }
}

/// A fitted ERGM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErgmFit {
    /// Model terms.
    pub model: ModelSpec,
    /// Coefficients in parameter order.
    pub coefficients: Vec<Coefficient>,
    /// Inverse Fisher information.
    pub covariance: Vec<Vec<f64>>,
    /// Sufficient statistics of the observed graph.
    pub observed: Vec<f64>,
    /// Maximized log-likelihood.
    pub log_likelihood: f64,
    /// Deviance of the model with every coefficient zero.
    pub null_deviance: f64,
    /// `-2` times the log-likelihood.
    pub residual_deviance: f64,
    /// Number of identifiable (non-aliased) coefficients.
    pub rank: usize,
    /// Akaike information criterion.
    pub aic: f64,
    /// Bayesian information criterion, with `n(n - 1)` observations.
    pub bic: f64,
    /// Number of nodes.
    pub n_nodes: usize,
    /// Newton iterations taken.
    pub iterations: usize,
}

impl ErgmFit {
    /// Coefficient vector, with aliased coefficients at zero.
    pub fn theta(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|c| if c.aliased { 0.0 } else { c.estimate })
            .collect()
    }

    /// Labels of the aliased coefficients.
    pub fn aliased(&self) -> Vec<&str> {
        self.coefficients
            .iter()
            .filter(|c| c.aliased)
            .map(|c| c.term.as_str())
            .collect()
    }

    /// Coefficient by label.
    pub fn coefficient(&self, term: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }

    /// Ordered pairs modelled.
    pub fn n_observations(&self) -> usize {
        self.n_nodes * self.n_nodes.saturating_sub(1)
    }
}

impl fmt::Display for ErgmFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Formula: {}", self.model)?;
        writeln!(
            f,
            "{:<28} {:>10} {:>10} {:>8} {:>10}",
            "", "Estimate", "Std.Error", "z", "Pr(>|z|)"
        )?;
        for c in &self.coefficients {
            if c.aliased {
                writeln!(f, "{:<28} {:>10} {:>10} {:>8} {:>10}", c.term, "NA", "NA", "NA", "NA")?;
                continue;
            }
            writeln!(
                f,
                "{:<28} {:>10.4} {:>10.4} {:>8.3} {:>10.3e} {}",
                c.term,
                c.estimate,
                c.std_error,
                c.z_value,
                c.p_value,
                c.stars()
            )?;
        }
        let df_null = self.n_observations();
        let df_resid = df_null.saturating_sub(self.rank);
        writeln!(f, "Null deviance:     {:.1} on {} df", self.null_deviance, df_null)?;
        writeln!(f, "Residual deviance: {:.1} on {} df", self.residual_deviance, df_resid)?;
        write!(f, "AIC: {:.1}  BIC: {:.1}", self.aic, self.bic)?;
        let aliased = self.aliased();
        if !aliased.is_empty() {
            write!(f, "\nAliased (not estimable): {}", aliased.join(", "))?;
        }
        Ok(())
    }
}

/// Newton-Raphson maximum likelihood on the exact dyadic likelihood.
#[derive(Debug, Clone)]
pub struct DyadicMle {
    /// Maximum Newton iterations.
    max_iter: usize,
    /// Largest coefficient change that counts as converged.
    tol: f64,
    /// Step halvings before accepting a step.
    max_halvings: usize,
    /// Coefficients beyond this magnitude indicate separation.
    max_coefficient: f64,
}

impl DyadicMle {
    /// Estimator with default settings.
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-8,
            max_halvings: 30,
            max_coefficient: 50.0,
        }
    }

    /// Set maximum Newton iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    fn failure(iterations: usize) -> Error {
        Error::ConvergenceFailure {
            algorithm: "ERGM Newton-Raphson",
            iterations,
        }
    }

    /// Solve `info · x = rhs`, or `None` if `info` is singular.
    fn solve(info: &Mat<f64>, rhs: &Mat<f64>) -> Option<Mat<f64>> {
        let p = info.nrows();
        let max_diag = (0..p).map(|i| info[(i, i)]).fold(0.0, f64::max);
        if (0..p).any(|i| !(info[(i, i)] > 1e-10 * max_diag.max(1e-300))) {
            return None;
        }

        let x = info.full_piv_lu().solve(rhs);
        let residual = info * &x - rhs;
        let scale = 1.0
            + (0..rhs.ncols())
                .flat_map(|j| (0..p).map(move |i| (i, j)))
                .map(|ij| rhs[ij].abs())
                .fold(0.0, f64::max);
        for j in 0..x.ncols() {
            for i in 0..p {
                if !x[(i, j)].is_finite() || residual[(i, j)].abs() > 1e-6 * scale {
                    return None;
                }
            }
        }
        Some(x)
    }

    /// Columns whose statistic is not a linear combination of earlier
    /// columns, judged on the information at `θ = 0` (every dyad state has
    /// positive probability there, so its null space is the design's).
    fn identifiable(table: &DyadTable) -> Vec<usize> {
        let p = table.dimension();
        let info = table.evaluate(&vec![0.0; p]).information;
        let at = |i: usize, j: usize| info[i * p + j];
        let max_diag = (0..p).map(|k| at(k, k)).fold(0.0, f64::max);

        let mut keep: Vec<usize> = Vec::with_capacity(p);
        for k in 0..p {
            let own = at(k, k);
            if !(own > 1e-10 * max_diag) {
                continue;
            }
            let residual = if keep.is_empty() {
                own
            } else {
                let m = keep.len();
                let a = Mat::from_fn(m, m, |i, j| at(keep[i], keep[j]));
                let b = Mat::from_fn(m, 1, |i, _| at(keep[i], k));
                let x = a.full_piv_lu().solve(&b);
                own - (0..m).map(|i| b[(i, 0)] * x[(i, 0)]).sum::<f64>()
            };
            if residual > 1e-8 * own {
                keep.push(k);
            }
        }
        keep
    }

    fn newton(&self, table: &DyadTable) -> Result<(Vec<f64>, Evaluation, usize)> {
        let p = table.dimension();
        let mut theta = vec![0.0; p];
        let mut eval = table.evaluate(&theta);

        for iter in 1..=self.max_iter {
            let info = Mat::from_fn(p, p, |i, j| eval.information[i * p + j]);
            let grad = Mat::from_fn(p, 1, |i, _| eval.gradient[i]);
            let step = Self::solve(&info, &grad).ok_or_else(|| Self::failure(iter))?;

            let mut scale = 1.0;
            let mut candidate;
            let mut next;
            let mut halvings = 0;
            loop {
                candidate = (0..p).map(|i| theta[i] + scale * step[(i, 0)]).collect::<Vec<_>>();
                next = table.evaluate(&candidate);
                let slack = 1e-10 * (1.0 + eval.log_likelihood.abs());
                if next.log_likelihood >= eval.log_likelihood - slack || halvings >= self.max_halvings {
                    break;
                }
                scale *= 0.5;
                halvings += 1;
            }

            let change = (0..p)
                .map(|i| (candidate[i] - theta[i]).abs())
                .fold(0.0, f64::max);
            theta = candidate;
            eval = next;
            tracing::debug!(iter, log_likelihood = eval.log_likelihood, change, halvings, "newton step");

            if !eval.log_likelihood.is_finite()
                || theta.iter().any(|t| !t.is_finite() || t.abs() > self.max_coefficient)
            {
                return Err(Self::failure(iter));
            }
            if change < self.tol {
                return Ok((theta, eval, iter));
            }
        }
        Err(Self::failure(self.max_iter))
    }
}

impl Default for DyadicMle {
    fn default() -> Self {
        Self::new()
    }
}

impl ErgmEstimator for DyadicMle {
    fn fit(&self, data: &ErgmData, model: &ModelSpec) -> Result<ErgmFit> {
        let full = DyadTable::new(model, data)?;
        let p = full.dimension();
        let n = full.node_count();
        let labels = model.labels();

        let keep = Self::identifiable(&full);
        if keep.is_empty() {
            return Err(Error::InvalidModel(format!(
                "no term of {model} varies on this network"
            )));
        }
        if keep.len() < p {
            let dropped: Vec<&str> = (0..p)
                .filter(|k| !keep.contains(k))
                .map(|k| labels[k].as_str())
                .collect();
            tracing::warn!(model = %model, aliased = ?dropped, "aliased statistics not estimated");
        }
        let table = full.restrict(&keep);
        let r = keep.len();
        let (theta, eval, iterations) = self.newton(&table)?;

        let info = Mat::from_fn(r, r, |i, j| eval.information[i * r + j]);
        let inverse =
            Self::solve(&info, &Mat::<f64>::identity(r, r)).ok_or_else(|| Self::failure(iterations))?;

        // Position of each full column among the estimated ones.
        let slot: Vec<Option<usize>> = (0..p).map(|k| keep.iter().position(|&c| c == k)).collect();

        let coefficients = labels
            .into_iter()
            .zip(&slot)
            .map(|(term, s)| match *s {
                Some(i) => {
                    let variance = inverse[(i, i)];
                    let std_error = if variance > 0.0 { variance.sqrt() } else { f64::NAN };
                    let z_value = theta[i] / std_error;
                    Coefficient {
                        term,
                        estimate: theta[i],
                        std_error,
                        z_value,
                        p_value: normal_two_sided_p(z_value),
                        aliased: false,
                    }
                }
                None => Coefficient {
                    term,
                    estimate: f64::NAN,
                    std_error: f64::NAN,
                    z_value: f64::NAN,
                    p_value: f64::NAN,
                    aliased: true,
                },
            })
            .collect();

        let covariance = slot
            .iter()
            .map(|a| {
                slot.iter()
                    .map(|b| match (a, b) {
                        (Some(i), Some(j)) => inverse[(*i, *j)],
                        _ => f64::NAN,
                    })
                    .collect()
            })
            .collect();

        let pairs = (n * (n - 1)) as f64;
        let residual_deviance = -2.0 * eval.log_likelihood;
        let fit = ErgmFit {
            model: model.clone(),
            coefficients,
            covariance,
            observed: full.observed_stats(),
            log_likelihood: eval.log_likelihood,
            null_deviance: 2.0 * pairs * std::f64::consts::LN_2,
            residual_deviance,
            rank: r,
            aic: residual_deviance + 2.0 * r as f64,
            bic: residual_deviance + r as f64 * pairs.ln(),
            n_nodes: n,
            iterations,
        };
        tracing::debug!(model = %model, aic = fit.aic, iterations, "fitted ergm");
        Ok(fit)
    }
}
