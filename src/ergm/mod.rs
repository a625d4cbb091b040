//! Exponential random graph models.
//!
//! An ERGM assigns each possible graph `y` on the observed monkeys the
//! probability
//!
//! ```text
//! P(Y = y) ∝ exp(θ · g(y))
//! ```
//!
//! where `g` collects the model's [`Term`] statistics. The supported terms
//! (`edges`, `mutual`, `nodematch`, `nodefactor`) all decompose over
//! unordered dyads, which makes the likelihood exact and the fit a
//! deterministic Newton iteration ([`DyadicMle`]). Goodness of fit is
//! checked by exact simulation ([`goodness_of_fit`]).
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use troop::attributes::Covariate;
//! use troop::ergm::{DyadicMle, ErgmData, ErgmEstimator, ModelSpec, Term};
//! use troop::stats::Adjacency;
//!
//! let adj = Adjacency::from_edges(4, &[(0, 1), (1, 0), (2, 3), (1, 2)]);
//! let data = ErgmData::new(adj, BTreeMap::from([(Covariate::Gender, vec![0, 0, 1, 1])])).unwrap();
//! let model = ModelSpec::new(vec![Term::Edges, Term::nodematch(Covariate::Gender)]).unwrap();
//! let fit = DyadicMle::new().fit(&data, &model).unwrap();
//! assert!(fit.coefficient("nodematch.Gender").unwrap().estimate > 0.0);
//! ```

mod dyads;
mod fit;
mod gof;
mod terms;
pub mod traits;

pub use dyads::ErgmData;
pub use fit::{Coefficient, DyadicMle, ErgmFit};
pub use gof::{
    edgewise_shared_partners, geodesic_distribution, goodness_of_fit, GofBin, GofStatistic,
    GoodnessOfFit,
};
pub use terms::{ModelSpec, NamedModel, Term};
pub use traits::ErgmEstimator;
