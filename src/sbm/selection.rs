use super::traits::BlockModelEstimator;
use super::BlockModelFit;
use crate::error::{Error, Result};
use crate::stats::{Adjacency, Computed};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Outcome for one candidate block count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockCountResult {
    /// Candidate block count.
    pub n_blocks: usize,
    /// Fit, or why it failed.
    pub fit: Computed<BlockModelFit>,
}

impl BlockCountResult {
    /// ICL of the fit, if it succeeded.
    pub fn icl(&self) -> Option<f64> {
        self.fit.value().map(|f| f.icl)
    }
}

/// Fits over a range of block counts and the ICL-selected winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockModelSelection {
    candidates: Vec<BlockCountResult>,
    best: Option<usize>,
}

impl BlockModelSelection {
    /// Every candidate, in increasing block count.
    pub fn candidates(&self) -> &[BlockCountResult] {
        &self.candidates
    }

    /// ICL per candidate; `None` where the fit failed.
    pub fn icl_sequence(&self) -> Vec<Option<f64>> {
        self.candidates.iter().map(BlockCountResult::icl).collect()
    }

    /// Position of the selected candidate in [`candidates`](Self::candidates).
    pub fn best_index(&self) -> Option<usize> {
        self.best
    }

    /// Selected fit.
    pub fn best(&self) -> Option<&BlockModelFit> {
        self.best
            .and_then(|i| self.candidates.get(i))
            .and_then(|c| c.fit.value())
    }

    /// Selected block count.
    pub fn best_n_blocks(&self) -> Option<usize> {
        self.best.map(|i| self.candidates[i].n_blocks)
    }
}

/// Index of the largest ICL; ties go to the earliest (lowest count).
///
/// Failed fits (`None`) and NaN scores are skipped.
pub fn argmax_icl(icl: &[Option<f64>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in icl.iter().enumerate() {
        let Some(s) = *score else { continue };
        if s.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

/// Fit every block count in `range` and select by ICL.
///
/// Individual fit failures are recorded, not propagated; the selection
/// fails only if the range is empty or every fit failed.
pub fn select_blocks<E: BlockModelEstimator>(
    estimator: &E,
    adj: &Adjacency,
    range: RangeInclusive<usize>,
) -> Result<BlockModelSelection> {
    if range.is_empty() || *range.start() == 0 {
        return Err(Error::InvalidParameter {
            name: "block range",
            message: format!("{}..={} is empty or starts at zero", range.start(), range.end()),
        });
    }

    let mut candidates = Vec::with_capacity(range.clone().count());
    for k in range {
        let fit = estimator.estimate(adj, k);
        match &fit {
            Ok(f) => tracing::info!(n_blocks = k, icl = f.icl, elbo = f.elbo, "fitted block model"),
            Err(e) => tracing::warn!(n_blocks = k, error = %e, "block model fit failed"),
        }
        candidates.push(BlockCountResult {
            n_blocks: k,
            fit: fit.into(),
        });
    }

    let icl: Vec<Option<f64>> = candidates.iter().map(BlockCountResult::icl).collect();
    let best = argmax_icl(&icl);
    if best.is_none() {
        return Err(Error::ConvergenceFailure {
            algorithm: "block model selection",
            iterations: candidates.len(),
        });
    }
    Ok(BlockModelSelection { candidates, best })
}
