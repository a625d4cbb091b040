//! Goodness of fit by simulation from the fitted model.
//!
//! Graphs are drawn exactly from the fitted dyad distribution and compared
//! with the observed graph on statistics the model does not fix: in- and
//! out-degree distributions, edgewise shared partners (outgoing two-paths)
//! and geodesic distances, plus the model's own statistics as a sanity
//! check.

use super::dyads::{DyadTable, ErgmData};
use super::fit::ErgmFit;
use crate::error::{Error, Result};
use crate::stats::{all_pairs_distances, in_degrees, out_degrees, quantile_sorted, Adjacency};
use rand::prelude::*;
use serde::Serialize;
use std::fmt;

/// Observed vs simulated values of one bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GofBin {
    /// Bin label (degree, partner count, distance, or term).
    pub label: String,
    /// Observed value.
    pub observed: f64,
    /// Smallest simulated value.
    pub min: f64,
    /// Mean simulated value.
    pub mean: f64,
    /// Largest simulated value.
    pub max: f64,
    /// 2.5% simulated quantile.
    pub lower: f64,
    /// 97.5% simulated quantile.
    pub upper: f64,
    /// Two-sided Monte Carlo p-value.
    pub p_value: f64,
}

impl GofBin {
    fn new(label: String, observed: f64, simulated: &mut [f64]) -> Self {
        simulated.sort_by(|a, b| a.total_cmp(b));
        let k = simulated.len() as f64;
        let below = simulated.iter().filter(|&&s| s <= observed).count() as f64;
        let above = simulated.iter().filter(|&&s| s >= observed).count() as f64;
        Self {
            label,
            observed,
            min: simulated[0],
            mean: simulated.iter().sum::<f64>() / k,
            max: simulated[simulated.len() - 1],
            lower: quantile_sorted(simulated, 0.025),
            upper: quantile_sorted(simulated, 0.975),
            p_value: (2.0 * (below / k).min(above / k)).min(1.0),
        }
    }

    /// Observed value outside the central 95% of simulations.
    pub fn is_outlier(&self) -> bool {
        self.observed < self.lower || self.observed > self.upper
    }
}

/// One diagnostic statistic, binned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GofStatistic {
    /// Statistic name.
    pub name: String,
    /// Bins in natural order.
    pub bins: Vec<GofBin>,
}

impl GofStatistic {
    /// Bins whose observed value falls outside the simulated 95% band.
    pub fn outliers(&self) -> impl Iterator<Item = &GofBin> + '_ {
        self.bins.iter().filter(|b| b.is_outlier())
    }
}

/// Goodness-of-fit diagnostics for one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodnessOfFit {
    /// Number of simulated graphs.
    pub simulations: usize,
    /// Seed used for simulation.
    pub seed: u64,
    /// Model statistics, in-degree, out-degree, shared partners, distances.
    pub statistics: Vec<GofStatistic>,
}

impl GoodnessOfFit {
    /// Statistic by name.
    pub fn statistic(&self, name: &str) -> Option<&GofStatistic> {
        self.statistics.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for GoodnessOfFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Goodness of fit ({} simulations)", self.simulations)?;
        for stat in &self.statistics {
            let outliers: Vec<&str> = stat.outliers().map(|b| b.label.as_str()).collect();
            if outliers.is_empty() {
                writeln!(f, "  {}: observed within the simulated 95% band", stat.name)?;
            } else {
                writeln!(f, "  {}: outside the 95% band at {}", stat.name, outliers.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Edgewise shared partners: for each edge `i → j`, the number of `k`
/// with `i → k → j`. Returns the count of edges per partner number.
pub fn edgewise_shared_partners(adj: &Adjacency) -> Vec<usize> {
    let mut hist = Vec::new();
    for (i, j) in adj.edges() {
        let partners = adj
            .successors(i)
            .iter()
            .filter(|&&k| k != j && adj.has_edge(k, j))
            .count();
        if hist.len() <= partners {
            hist.resize(partners + 1, 0);
        }
        hist[partners] += 1;
    }
    hist
}

/// Count of ordered pairs at each directed distance (index 0 unused) and
/// the number of unreachable ordered pairs.
pub fn geodesic_distribution(adj: &Adjacency) -> (Vec<usize>, usize) {
    let mut hist = vec![0];
    let mut unreachable = 0;
    for (s, row) in all_pairs_distances(adj).into_iter().enumerate() {
        for (t, d) in row.into_iter().enumerate() {
            if s == t {
                continue;
            }
            match d {
                Some(d) => {
                    if hist.len() <= d {
                        hist.resize(d + 1, 0);
                    }
                    hist[d] += 1;
                }
                None => unreachable += 1,
            }
        }
    }
    (hist, unreachable)
}

fn histogram(values: &[usize]) -> Vec<usize> {
    let mut hist = Vec::new();
    for &v in values {
        if hist.len() <= v {
            hist.resize(v + 1, 0);
        }
        hist[v] += 1;
    }
    hist
}

/// Graph summaries compared by the diagnostics.
struct Profile {
    model: Vec<f64>,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
    espartners: Vec<usize>,
    distance: Vec<usize>,
    unreachable: usize,
}

impl Profile {
    fn of(adj: &Adjacency, model: Vec<f64>) -> Self {
        let (distance, unreachable) = geodesic_distribution(adj);
        Self {
            model,
            in_degree: histogram(&in_degrees(adj)),
            out_degree: histogram(&out_degrees(adj)),
            espartners: edgewise_shared_partners(adj),
            distance,
            unreachable,
        }
    }
}

fn binned<F>(name: &str, observed: &Profile, sims: &[Profile], first: usize, get: F) -> GofStatistic
where
    F: Fn(&Profile) -> &[usize],
{
    let width = sims
        .iter()
        .chain(std::iter::once(observed))
        .map(|p| get(p).len())
        .max()
        .unwrap_or(0);
    let at = |p: &Profile, k: usize| get(p).get(k).copied().unwrap_or(0) as f64;
    let bins = (first..width)
        .map(|k| {
            let mut simulated: Vec<f64> = sims.iter().map(|p| at(p, k)).collect();
            GofBin::new(k.to_string(), at(observed, k), &mut simulated)
        })
        .collect();
    GofStatistic {
        name: name.to_string(),
        bins,
    }
}

/// Simulate `simulations` graphs from `fit` and compare them with `data`.
pub fn goodness_of_fit(fit: &ErgmFit, data: &ErgmData, simulations: usize, seed: u64) -> Result<GoodnessOfFit> {
    if simulations == 0 {
        return Err(Error::InvalidParameter {
            name: "simulations",
            message: "must be > 0".into(),
        });
    }
    let table = DyadTable::new(&fit.model, data)?;
    let theta = fit.theta();
    let mut rng = StdRng::seed_from_u64(seed);

    let observed = Profile::of(data.adjacency(), table.observed_stats());
    let sims: Vec<Profile> = (0..simulations)
        .map(|_| {
            let states = table.sample_states(&theta, &mut rng);
            Profile::of(&table.graph_of(&states), table.stats_of(&states))
        })
        .collect();

    let model = GofStatistic {
        name: "model".into(),
        bins: fit
            .model
            .labels()
            .into_iter()
            .enumerate()
            .map(|(k, label)| {
                let mut simulated: Vec<f64> = sims.iter().map(|p| p.model[k]).collect();
                GofBin::new(label, observed.model[k], &mut simulated)
            })
            .collect(),
    };

    let mut distance = binned("distance", &observed, &sims, 1, |p| &p.distance);
    let mut unreachable: Vec<f64> = sims.iter().map(|p| p.unreachable as f64).collect();
    distance.bins.push(GofBin::new(
        "NR".into(),
        observed.unreachable as f64,
        &mut unreachable,
    ));

    let gof = GoodnessOfFit {
        simulations,
        seed,
        statistics: vec![
            model,
            binned("idegree", &observed, &sims, 0, |p| &p.in_degree),
            binned("odegree", &observed, &sims, 0, |p| &p.out_degree),
            binned("espartners", &observed, &sims, 0, |p| &p.espartners),
            distance,
        ],
    };
    tracing::debug!(simulations, seed, "goodness of fit simulated");
    Ok(gof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Covariate;
    use crate::ergm::fit::DyadicMle;
    use crate::ergm::terms::{ModelSpec, Term};
    use crate::ergm::traits::ErgmEstimator;
    use std::collections::BTreeMap;

    fn data() -> ErgmData {
        let adj = Adjacency::from_edges(
            6,
            &[(0, 1), (1, 0), (1, 2), (2, 3), (3, 4), (4, 3), (4, 5), (5, 0), (0, 3)],
        );
        let levels = BTreeMap::from([(Covariate::Gender, vec![0, 0, 0, 1, 1, 1])]);
        ErgmData::new(adj, levels).unwrap()
    }

    #[test]
    fn shared_partners_count_two_paths() {
        // 0 -> 1 -> 2 and 0 -> 2: edge 0 -> 2 has one partner.
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(edgewise_shared_partners(&adj), vec![2, 1]);
    }

    #[test]
    fn geodesics_split_reachable_and_not() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let (hist, nr) = geodesic_distribution(&adj);
        assert_eq!(hist, vec![0, 2, 1]);
        assert_eq!(nr, 3);
    }

    #[test]
    fn bins_summarize_simulations() {
        let mut sims = vec![1.0, 2.0, 3.0, 4.0];
        let bin = GofBin::new("x".into(), 1.0, &mut sims);
        assert_eq!(bin.min, 1.0);
        assert_eq!(bin.max, 4.0);
        assert!((bin.mean - 2.5).abs() < 1e-12);
        assert!((bin.p_value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gof_is_seeded_and_complete() {
        let data = data();
        let spec = ModelSpec::new(vec![Term::Edges, Term::nodematch(Covariate::Gender)]).unwrap();
        let fit = DyadicMle::new().fit(&data, &spec).unwrap();
        let a = goodness_of_fit(&fit, &data, 50, 7).unwrap();
        let b = goodness_of_fit(&fit, &data, 50, 7).unwrap();
        assert_eq!(a, b);

        let names: Vec<&str> = a.statistics.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["model", "idegree", "odegree", "espartners", "distance"]);
        let model = a.statistic("model").unwrap();
        assert_eq!(model.bins.len(), 2);
        assert_eq!(model.bins[0].observed, 9.0);
        assert_eq!(a.statistic("distance").unwrap().bins.last().unwrap().label, "NR");
        for stat in &a.statistics {
            for bin in &stat.bins {
                assert!(bin.min <= bin.mean && bin.mean <= bin.max);
                assert!((0.0..=1.0).contains(&bin.p_value));
            }
        }
    }

    #[test]
    fn zero_simulations_rejected() {
        let data = data();
        let spec = ModelSpec::new(vec![Term::Edges]).unwrap();
        let fit = DyadicMle::new().fit(&data, &spec).unwrap();
        assert!(goodness_of_fit(&fit, &data, 0, 1).is_err());
    }
}
