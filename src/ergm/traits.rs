//! ERGM estimation traits.

use super::dyads::ErgmData;
use super::fit::ErgmFit;
use super::terms::ModelSpec;
use crate::error::Result;

/// Fits an exponential random graph model.
pub trait ErgmEstimator {
    /// Estimate the coefficients of `model` on `data`.
    fn fit(&self, data: &ErgmData, model: &ModelSpec) -> Result<ErgmFit>;
}
