//! Data checks run before any statistics.
//!
//! Problems are graded:
//! - **error**: a sleeping location with no monkeys. The per-site report
//!   and the pipeline cannot run.
//! - **warning**: the network still loads, but some figures will be
//!   degenerate. This covers isolated monkeys, weak disconnection, a
//!   covariate observed at one level only, and no reciprocated pair.
//! - **note**: observations discarded while building.
//!
//! ```rust
//! use troop::attributes::{Age, Gender, Monkey, SleepLoc};
//! use troop::network::{HealthCheck, NetworkBuilder, Observation};
//!
//! let monkeys = vec![
//!     Monkey::new("a", Age::Senior, Gender::Female, SleepLoc::Loc1),
//!     Monkey::new("b", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
//! ];
//! let obs = [Observation::new("a", "b"), Observation::new("b", "a")];
//! let net = NetworkBuilder::new().build(monkeys, &obs).unwrap();
//! let report = net.health_check();
//! assert!(report.is_healthy(), "{}", report);
//! ```

use super::GroomingNetwork;
use crate::attributes::{Covariate, SleepLoc};
use crate::stats::{dyad_census, weak_components};
use serde::Serialize;
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Bookkeeping.
    Note,
    /// Results will contain degenerate or unavailable figures.
    Warning,
    /// The analysis cannot run.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Grade.
    pub severity: Severity,
    /// What was found.
    pub message: String,
    /// Monkey concerned, for per-monkey findings.
    pub monkey: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.monkey {
            Some(name) => write!(f, "{}: {}: {}", self.severity, name, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Findings in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Every finding.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, severity: Severity, monkey: Option<&str>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity,
            message: message.into(),
            monkey: monkey.map(str::to_string),
        });
    }

    /// Number of findings at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// No error-level findings.
    pub fn is_healthy(&self) -> bool {
        self.count(Severity::Error) == 0
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "No data problems found.");
        }
        writeln!(
            f,
            "{} error(s), {} warning(s), {} note(s):",
            self.count(Severity::Error),
            self.count(Severity::Warning),
            self.count(Severity::Note)
        )?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

/// Findings plus headline counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Findings.
    pub validation: ValidationReport,
    /// Number of monkeys.
    pub order: usize,
    /// Number of grooming edges.
    pub size: usize,
    /// Monkeys with no grooming in either direction.
    pub isolated: usize,
    /// Number of weak components.
    pub weak_components: usize,
}

impl HealthReport {
    /// No error-level findings.
    pub fn is_healthy(&self) -> bool {
        self.validation.is_healthy()
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Data: {} monkeys ({} isolated), {} grooming edges, {} weak component(s).",
            self.order, self.isolated, self.size, self.weak_components
        )?;
        write!(f, "{}", self.validation)
    }
}

/// Types that can be checked before analysis.
pub trait HealthCheck {
    /// Run every check.
    fn health_check(&self) -> HealthReport;
}

impl HealthCheck for GroomingNetwork {
    fn health_check(&self) -> HealthReport {
        let mut report = ValidationReport::default();
        let adj = self.adjacency();

        for loc in SleepLoc::ALL {
            if !self.monkeys().any(|m| m.sleep_loc == loc) {
                report.push(Severity::Error, None, format!("no monkeys sleep at {loc}"));
            }
        }

        for covariate in Covariate::ALL {
            let labels = self.labels(covariate);
            if let Some(&first) = labels.first() {
                if labels.iter().all(|&l| l == first) {
                    report.push(
                        Severity::Warning,
                        None,
                        format!(
                            "every monkey has {covariate} = {}; its mixing figures are undefined",
                            covariate.levels()[first]
                        ),
                    );
                }
            }
        }

        let mut isolated = 0;
        for (i, m) in self.monkeys().enumerate() {
            if adj.neighbors(i).is_empty() {
                isolated += 1;
                report.push(Severity::Warning, Some(&m.name), "neither grooms nor is groomed");
            }
        }

        let weak = weak_components(&adj).count();
        if weak > 1 {
            report.push(
                Severity::Warning,
                None,
                format!("network is disconnected ({weak} weak components); path statistics cover reachable pairs only"),
            );
        }

        if adj.edge_count() > 0 && dyad_census(&adj).mutual == 0 {
            report.push(
                Severity::Warning,
                None,
                "no pair grooms each other; models with a mutual term cannot be fitted",
            );
        }

        let summary = self.build_summary();
        if summary.duplicate_observations > 0 {
            report.push(
                Severity::Note,
                None,
                format!("{} repeated observations collapsed", summary.duplicate_observations),
            );
        }
        if summary.self_loops > 0 {
            report.push(
                Severity::Note,
                None,
                format!("{} self-grooming observations dropped", summary.self_loops),
            );
        }

        HealthReport {
            validation: report,
            order: self.order(),
            size: self.size(),
            isolated,
            weak_components: weak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Age, Gender, Monkey};
    use crate::network::{NetworkBuilder, Observation};

    fn build(monkeys: Vec<Monkey>, pairs: &[(&str, &str)]) -> GroomingNetwork {
        let obs: Vec<Observation> = pairs.iter().map(|(s, t)| Observation::new(*s, *t)).collect();
        NetworkBuilder::new().build(monkeys, &obs).unwrap()
    }

    #[test]
    fn empty_sleep_location_is_an_error() {
        let net = build(
            vec![
                Monkey::new("a", Age::Senior, Gender::Female, SleepLoc::Loc1),
                Monkey::new("b", Age::Juvenile, Gender::Male, SleepLoc::Loc1),
                Monkey::new("c", Age::Juvenile, Gender::Male, SleepLoc::Loc1),
            ],
            &[("a", "b"), ("a", "b")],
        );
        let report = net.health_check();
        assert!(!report.is_healthy());
        assert_eq!(report.validation.count(Severity::Error), 1);
        assert_eq!(report.isolated, 1);
        assert_eq!(report.weak_components, 2);
        let text = report.to_string();
        assert!(text.contains("no monkeys sleep at Loc2"));
        assert!(text.contains("every monkey has SleepLoc = Loc1"));
        assert!(text.contains("warning: c: neither grooms nor is groomed"));
        assert!(text.contains("note: 1 repeated observations collapsed"));
    }

    #[test]
    fn missing_reciprocity_is_a_warning_only() {
        let net = build(
            vec![
                Monkey::new("a", Age::Senior, Gender::Female, SleepLoc::Loc1),
                Monkey::new("b", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
            ],
            &[("a", "b")],
        );
        let report = net.health_check();
        assert!(report.is_healthy());
        assert_eq!(report.validation.count(Severity::Warning), 1);
        assert!(report.validation.issues[0].message.contains("mutual"));
    }

    #[test]
    fn clean_network_reports_nothing() {
        let net = build(
            vec![
                Monkey::new("a", Age::Senior, Gender::Female, SleepLoc::Loc1),
                Monkey::new("b", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
            ],
            &[("a", "b"), ("b", "a")],
        );
        let report = net.health_check();
        assert!(report.validation.issues.is_empty());
        assert!(report.to_string().contains("No data problems found."));
        assert!(Severity::Note < Severity::Warning && Severity::Warning < Severity::Error);
    }
}
