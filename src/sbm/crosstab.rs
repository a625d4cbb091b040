//! Block assignments against node covariates.

use super::BlockModelFit;
use crate::attributes::Covariate;
use crate::error::Result;
use crate::metrics::{ari, nmi, ChiSquaredTest, ContingencyTable};
use crate::network::GroomingNetwork;
use crate::stats::Computed;
use serde::Serialize;

/// How strongly the block partition tracks one covariate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovariateAssociation {
    /// Covariate compared.
    pub covariate: Covariate,
    /// Blocks (rows) by covariate levels (columns).
    pub table: ContingencyTable,
    /// Independence test.
    pub chi_squared: Computed<ChiSquaredTest>,
    /// Normalized mutual information.
    pub nmi: f64,
    /// Adjusted Rand index.
    pub ari: f64,
}

/// Cross-tabulate hard block assignments against `labels` of `covariate`.
pub fn cross_tabulate(
    assignments: &[usize],
    n_blocks: usize,
    covariate: Covariate,
    labels: &[usize],
    yates: bool,
) -> Result<CovariateAssociation> {
    let table = ContingencyTable::from_labels(assignments, n_blocks, labels, covariate.n_levels())?
        .with_row_labels((1..=n_blocks).map(|k| format!("block {k}")))
        .with_col_labels(covariate.levels().iter().copied());
    let chi_squared = table.chi_squared(yates).into();
    Ok(CovariateAssociation {
        covariate,
        chi_squared,
        nmi: nmi(assignments, labels),
        ari: ari(assignments, labels),
        table,
    })
}

/// Cross-tabulate a fit against every covariate of `network`.
pub fn cross_tabulate_all(
    fit: &BlockModelFit,
    network: &GroomingNetwork,
    yates: bool,
) -> Result<Vec<CovariateAssociation>> {
    let assignments = fit.hard_assignments();
    Covariate::ALL
        .iter()
        .map(|&c| cross_tabulate(&assignments, fit.n_blocks, c, &network.labels(c), yates))
        .collect()
}
