//! CSV loading for the attribute and observation tables.
//!
//! Node table: one row per monkey with columns `name`, `age`, `gender`,
//! `sleep_loc` (header names are matched case-insensitively, and common
//! aliases such as `id` or `SleepLoc` are accepted). Edge table: one row
//! per observation with `groomer`, `groomed` (or `from`/`to`,
//! `source`/`target`).

use crate::attributes::{Age, Gender, Monkey, SleepLoc};
use crate::error::{Error, Result};
use crate::network::{DuplicatePolicy, GroomingNetwork, NetworkBuilder, Observation};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NodeRow {
    #[serde(alias = "id", alias = "monkey")]
    name: String,
    #[serde(alias = "agecat", alias = "age_category")]
    age: String,
    #[serde(alias = "sex")]
    gender: String,
    #[serde(alias = "sleeploc", alias = "sleep_location", alias = "location")]
    sleep_loc: String,
}

impl NodeRow {
    fn into_monkey(self) -> Result<Monkey> {
        Ok(Monkey {
            age: self.age.parse::<Age>()?,
            gender: self.gender.parse::<Gender>()?,
            sleep_loc: self.sleep_loc.parse::<SleepLoc>()?,
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    #[serde(alias = "from", alias = "source")]
    groomer: String,
    #[serde(alias = "to", alias = "target")]
    groomed: String,
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(rdr)
}

/// Lower-case and snake-case the header row so aliases match loosely.
fn normalize_headers<R: Read>(rdr: &mut csv::Reader<R>) -> Result<()> {
    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| {
            let mut out = String::with_capacity(h.len() + 2);
            let mut prev_lower = false;
            for ch in h.trim().chars() {
                if ch.is_ascii_uppercase() && prev_lower {
                    out.push('_');
                }
                if ch == ' ' || ch == '-' || ch == '.' {
                    out.push('_');
                } else {
                    out.push(ch.to_ascii_lowercase());
                }
                prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            }
            out
        })
        .collect();
    rdr.set_headers(headers);
    Ok(())
}

/// Read the node table.
pub fn read_monkeys<R: Read>(rdr: R) -> Result<Vec<Monkey>> {
    let mut rdr = reader(rdr);
    normalize_headers(&mut rdr)?;
    rdr.deserialize::<NodeRow>()
        .map(|row| row.map_err(Error::from).and_then(NodeRow::into_monkey))
        .collect()
}

/// Read the observation table.
pub fn read_observations<R: Read>(rdr: R) -> Result<Vec<Observation>> {
    let mut rdr = reader(rdr);
    normalize_headers(&mut rdr)?;
    rdr.deserialize::<EdgeRow>()
        .map(|row| {
            let row = row?;
            Ok(Observation::new(row.groomer, row.groomed))
        })
        .collect()
}

/// Both input tables.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Attribute table.
    pub monkeys: Vec<Monkey>,
    /// Observation table.
    pub observations: Vec<Observation>,
}

impl Dataset {
    /// Load both tables from CSV files.
    pub fn load(nodes: impl AsRef<Path>, edges: impl AsRef<Path>) -> Result<Self> {
        let nodes = nodes.as_ref();
        let edges = edges.as_ref();
        let monkeys = read_monkeys(std::fs::File::open(nodes)?)?;
        let observations = read_observations(std::fs::File::open(edges)?)?;
        tracing::info!(
            monkeys = monkeys.len(),
            observations = observations.len(),
            nodes = %nodes.display(),
            edges = %edges.display(),
            "loaded dataset"
        );
        Ok(Self {
            monkeys,
            observations,
        })
    }

    /// Build the grooming network.
    pub fn build(self, policy: DuplicatePolicy) -> Result<GroomingNetwork> {
        NetworkBuilder::new()
            .duplicates(policy)
            .build(self.monkeys, &self.observations)
    }
}
