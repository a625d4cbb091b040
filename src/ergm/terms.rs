//! Model terms and validated term lists.

use crate::attributes::Covariate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One ERGM term.
///
/// In configuration files terms are tables tagged by `term`:
///
/// ```toml
/// terms = [
///     { term = "edges" },
///     { term = "mutual" },
///     { term = "nodematch", covariate = "age", per_level = true },
///     { term = "nodefactor", covariate = "gender" },
/// ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "term", rename_all = "snake_case")]
pub enum Term {
    /// Number of edges.
    Edges,
    /// Number of reciprocated dyads.
    Mutual,
    /// Edges between monkeys sharing a level of `covariate`.
    #[serde(rename = "nodematch", alias = "node_match")]
    NodeMatch {
        /// Matched attribute.
        covariate: Covariate,
        /// One statistic per level instead of one pooled statistic.
        #[serde(default)]
        per_level: bool,
    },
    /// Edge endpoints at each non-base level of `covariate`.
    #[serde(rename = "nodefactor", alias = "node_factor")]
    NodeFactor {
        /// Attribute whose levels are counted.
        covariate: Covariate,
    },
}

impl Term {
    /// Pooled `nodematch` on `covariate`.
    pub fn nodematch(covariate: Covariate) -> Self {
        Term::NodeMatch {
            covariate,
            per_level: false,
        }
    }

    /// Per-level `nodematch` on `covariate`.
    pub fn nodematch_per_level(covariate: Covariate) -> Self {
        Term::NodeMatch {
            covariate,
            per_level: true,
        }
    }

    /// `nodefactor` on `covariate`.
    pub fn nodefactor(covariate: Covariate) -> Self {
        Term::NodeFactor { covariate }
    }

    /// Number of coefficients this term contributes.
    pub fn dimension(&self) -> usize {
        match *self {
            Term::Edges | Term::Mutual => 1,
            Term::NodeMatch {
                covariate,
                per_level,
            } => {
                if per_level {
                    covariate.n_levels()
                } else {
                    1
                }
            }
            Term::NodeFactor { covariate } => covariate.n_levels() - 1,
        }
    }

    /// Coefficient labels, e.g. `nodematch.Age.Juvenile`.
    pub fn labels(&self) -> Vec<String> {
        match *self {
            Term::Edges => vec!["edges".into()],
            Term::Mutual => vec!["mutual".into()],
            Term::NodeMatch {
                covariate,
                per_level: false,
            } => vec![format!("nodematch.{covariate}")],
            Term::NodeMatch {
                covariate,
                per_level: true,
            } => covariate
                .levels()
                .iter()
                .map(|l| format!("nodematch.{covariate}.{l}"))
                .collect(),
            Term::NodeFactor { covariate } => covariate.levels()[1..]
                .iter()
                .map(|l| format!("nodefactor.{covariate}.{l}"))
                .collect(),
        }
    }

    /// Contribution of the directed edge `i -> j` given the endpoint levels.
    ///
    /// `level` maps a covariate to `(level of i, level of j)`. `Mutual`
    /// writes nothing here: it depends on the dyad, not the edge.
    pub(crate) fn edge_contribution<F>(&self, level: F, out: &mut [f64])
    where
        F: Fn(Covariate) -> (usize, usize),
    {
        match *self {
            Term::Edges => out[0] += 1.0,
            Term::Mutual => {}
            Term::NodeMatch {
                covariate,
                per_level,
            } => {
                let (li, lj) = level(covariate);
                if li == lj {
                    if per_level {
                        out[li] += 1.0;
                    } else {
                        out[0] += 1.0;
                    }
                }
            }
            Term::NodeFactor { covariate } => {
                let (li, lj) = level(covariate);
                for l in [li, lj] {
                    if l > 0 {
                        out[l - 1] += 1.0;
                    }
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Term::Edges => f.write_str("edges"),
            Term::Mutual => f.write_str("mutual"),
            Term::NodeMatch {
                covariate,
                per_level: false,
            } => write!(f, "nodematch(\"{covariate}\")"),
            Term::NodeMatch {
                covariate,
                per_level: true,
            } => write!(f, "nodematch(\"{covariate}\", diff = TRUE)"),
            Term::NodeFactor { covariate } => write!(f, "nodefactor(\"{covariate}\")"),
        }
    }
}

/// A validated list of terms.
///
/// Construction rejects empty lists, repeated terms, and a covariate used
/// by both a pooled and a per-level `nodematch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Term>", into = "Vec<Term>")]
pub struct ModelSpec {
    terms: Vec<Term>,
}

impl ModelSpec {
    /// Validate and wrap `terms`.
    pub fn new(terms: Vec<Term>) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::InvalidModel("a model needs at least one term".into()));
        }
        let mut seen = HashSet::new();
        let mut matched = HashSet::new();
        for term in &terms {
            if !seen.insert(*term) {
                return Err(Error::InvalidModel(format!("term {term} appears twice")));
            }
            if let Term::NodeMatch { covariate, .. } = term {
                if !matched.insert(*covariate) {
                    return Err(Error::InvalidModel(format!(
                        "nodematch on {covariate} is both pooled and per-level"
                    )));
                }
            }
        }
        Ok(Self { terms })
    }

    /// The terms, in order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Total number of coefficients.
    pub fn dimension(&self) -> usize {
        self.terms.iter().map(Term::dimension).sum()
    }

    /// Coefficient labels, in parameter order.
    pub fn labels(&self) -> Vec<String> {
        self.terms.iter().flat_map(Term::labels).collect()
    }

    /// Parameter index of the `mutual` coefficient, if present.
    pub fn mutual_index(&self) -> Option<usize> {
        let mut offset = 0;
        for term in &self.terms {
            if *term == Term::Mutual {
                return Some(offset);
            }
            offset += term.dimension();
        }
        None
    }

    /// Terms paired with their starting parameter index.
    pub(crate) fn offsets(&self) -> impl Iterator<Item = (usize, &Term)> + '_ {
        self.terms.iter().scan(0, |offset, term| {
            let start = *offset;
            *offset += term.dimension();
            Some((start, term))
        })
    }

    /// Covariates referenced by any term.
    pub fn covariates(&self) -> Vec<Covariate> {
        let mut out: Vec<Covariate> = self
            .terms
            .iter()
            .filter_map(|t| match *t {
                Term::NodeMatch { covariate, .. } | Term::NodeFactor { covariate } => {
                    Some(covariate)
                }
                _ => None,
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// `edges + nodematch` on every covariate.
    pub fn homophily() -> Self {
        let mut terms = vec![Term::Edges];
        terms.extend(Covariate::ALL.iter().map(|&c| Term::nodematch(c)));
        Self { terms }
    }

    /// [`homophily`](Self::homophily) plus `mutual`.
    pub fn reciprocity() -> Self {
        let mut spec = Self::homophily();
        spec.terms.insert(1, Term::Mutual);
        spec
    }

    /// `edges + mutual` and per-level `nodematch` on every covariate.
    ///
    /// No `nodefactor`: with two levels it is `edges` minus the first
    /// level's match count plus the second's.
    pub fn differential() -> Self {
        let mut terms = vec![Term::Edges, Term::Mutual];
        terms.extend(Covariate::ALL.iter().map(|&c| Term::nodematch_per_level(c)));
        Self { terms }
    }
}

impl TryFrom<Vec<Term>> for ModelSpec {
    type Error = Error;

    fn try_from(terms: Vec<Term>) -> Result<Self> {
        Self::new(terms)
    }
}

impl From<ModelSpec> for Vec<Term> {
    fn from(spec: ModelSpec) -> Self {
        spec.terms
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        write!(f, "{}", parts.join(" + "))
    }
}

/// A model specification with a name for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedModel {
    /// Report name.
    pub name: String,
    /// Terms.
    pub terms: ModelSpec,
}

impl NamedModel {
    /// Name a specification.
    pub fn new(name: impl Into<String>, terms: ModelSpec) -> Self {
        Self {
            name: name.into(),
            terms,
        }
    }

    /// The three default models: homophily, reciprocity, differential.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("homophily", ModelSpec::homophily()),
            Self::new("reciprocity", ModelSpec::reciprocity()),
            Self::new("differential", ModelSpec::differential()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_convention() {
        let spec = ModelSpec::differential();
        let labels = spec.labels();
        assert_eq!(labels.len(), spec.dimension());
        assert_eq!(labels[0], "edges");
        assert_eq!(labels[1], "mutual");
        assert!(labels.contains(&"nodematch.Age.Juvenile".to_string()));
        assert!(labels.contains(&"nodematch.SleepLoc.Loc2".to_string()));
        assert!(labels.iter().all(|l| !l.starts_with("nodefactor")));
        assert_eq!(spec.dimension(), 2 + 6);
    }

    #[test]
    fn rejects_invalid_specs() {
        assert!(matches!(ModelSpec::new(vec![]), Err(Error::InvalidModel(_))));
        assert!(ModelSpec::new(vec![Term::Edges, Term::Edges]).is_err());
        assert!(ModelSpec::new(vec![
            Term::Edges,
            Term::nodematch(Covariate::Age),
            Term::nodematch_per_level(Covariate::Age),
        ])
        .is_err());
    }

    #[test]
    fn mutual_index_accounts_for_dimensions() {
        let spec = ModelSpec::new(vec![
            Term::Edges,
            Term::nodematch_per_level(Covariate::Gender),
            Term::Mutual,
        ])
        .unwrap();
        assert_eq!(spec.mutual_index(), Some(3));
        assert_eq!(ModelSpec::homophily().mutual_index(), None);
        assert_eq!(ModelSpec::reciprocity().mutual_index(), Some(1));
    }

    #[test]
    fn edge_contributions() {
        let level = |c: Covariate| match c {
            Covariate::Age => (1, 1),
            Covariate::Gender => (0, 1),
            Covariate::SleepLoc => (0, 0),
        };
        let mut out = [0.0; 2];
        Term::nodematch_per_level(Covariate::Age).edge_contribution(level, &mut out);
        assert_eq!(out, [0.0, 1.0]);
        let mut out = [0.0; 1];
        Term::nodematch(Covariate::Gender).edge_contribution(level, &mut out);
        assert_eq!(out, [0.0]);
        let mut out = [0.0; 1];
        Term::nodefactor(Covariate::Age).edge_contribution(level, &mut out);
        assert_eq!(out, [2.0]);
    }

    #[test]
    fn parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            terms: ModelSpec,
        }
        let text = r#"
            terms = [
                { term = "edges" },
                { term = "nodematch", covariate = "sleep_loc", per_level = true },
                { term = "nodefactor", covariate = "age" },
            ]
        "#;
        let w: Wrapper = toml::from_str(text).unwrap();
        assert_eq!(w.terms.dimension(), 1 + 2 + 1);

        let bad = r#"terms = [{ term = "edges" }, { term = "edges" }]"#;
        assert!(toml::from_str::<Wrapper>(bad).is_err());
    }

    #[test]
    fn display_reads_like_a_formula() {
        assert_eq!(
            ModelSpec::homophily().to_string(),
            "edges + nodematch(\"Age\") + nodematch(\"Gender\") + nodematch(\"SleepLoc\")"
        );
    }
}
