//! Block model traits.

use super::BlockModelFit;
use crate::error::Result;
use crate::stats::Adjacency;

/// Estimates a stochastic block model with a fixed number of blocks.
pub trait BlockModelEstimator {
    /// Fit `n_blocks` blocks to the directed graph `adj`.
    fn estimate(&self, adj: &Adjacency, n_blocks: usize) -> Result<BlockModelFit>;
}

impl<E: BlockModelEstimator + ?Sized> BlockModelEstimator for &E {
    fn estimate(&self, adj: &Adjacency, n_blocks: usize) -> Result<BlockModelFit> {
        (**self).estimate(adj, n_blocks)
    }
}
