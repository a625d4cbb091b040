//! Per-monkey categorical attributes.
//!
//! Every categorical statistic in the crate (modularity, assortativity,
//! ERGM terms, cross-tabulations) addresses attributes through
//! [`Covariate`], which maps a [`Monkey`] to a dense level index. Level
//! order is fixed and is the order of [`Covariate::levels`]; the first
//! level is the reference level wherever a model needs one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Age {
    /// Juvenile.
    Juvenile,
    /// Senior.
    Senior,
}

/// Sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    /// Female.
    Female,
    /// Male.
    Male,
}

/// Sleeping location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SleepLoc {
    /// First location.
    Loc1,
    /// Second location.
    Loc2,
}

impl SleepLoc {
    /// Both locations, in level order.
    pub const ALL: [SleepLoc; 2] = [SleepLoc::Loc1, SleepLoc::Loc2];
}

macro_rules! categorical {
    ($ty:ident, $attr:literal, [$($variant:ident => $label:literal),+ $(,)?]) => {
        impl $ty {
            /// Display label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($label) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(Error::InvalidAttribute {
                    attribute: $attr,
                    value: s.to_string(),
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical!(Age, "age", [Juvenile => "Juvenile", Senior => "Senior"]);
categorical!(Gender, "gender", [Female => "Female", Male => "Male"]);
categorical!(SleepLoc, "sleep_loc", [Loc1 => "Loc1", Loc2 => "Loc2"]);

/// One monkey (node) and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monkey {
    /// Unique identifier.
    pub name: String,
    /// Age class.
    pub age: Age,
    /// Sex.
    pub gender: Gender,
    /// Sleeping location.
    pub sleep_loc: SleepLoc,
}

impl Monkey {
    /// Create a monkey record.
    pub fn new(name: impl Into<String>, age: Age, gender: Gender, sleep_loc: SleepLoc) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            sleep_loc,
        }
    }
}

/// A categorical node attribute usable as a model covariate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    /// [`Age`].
    Age,
    /// [`Gender`].
    Gender,
    /// [`SleepLoc`].
    SleepLoc,
}

impl Covariate {
    /// All covariates, in report order.
    pub const ALL: [Covariate; 3] = [Covariate::Age, Covariate::Gender, Covariate::SleepLoc];

    /// Attribute name as used in coefficient labels.
    pub fn name(self) -> &'static str {
        match self {
            Covariate::Age => "Age",
            Covariate::Gender => "Gender",
            Covariate::SleepLoc => "SleepLoc",
        }
    }

    /// Level labels, in index order.
    pub fn levels(self) -> &'static [&'static str] {
        match self {
            Covariate::Age => &["Juvenile", "Senior"],
            Covariate::Gender => &["Female", "Male"],
            Covariate::SleepLoc => &["Loc1", "Loc2"],
        }
    }

    /// Number of levels.
    pub fn n_levels(self) -> usize {
        self.levels().len()
    }

    /// Level index of `monkey` for this covariate.
    pub fn level_of(self, monkey: &Monkey) -> usize {
        match self {
            Covariate::Age => monkey.age as usize,
            Covariate::Gender => monkey.gender as usize,
            Covariate::SleepLoc => monkey.sleep_loc as usize,
        }
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
