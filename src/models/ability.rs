//! Capability flags carried by a personal access token.
//!
//! Every token issued today grants [`Ability::All`]. Named scopes exist so that
//! narrower tokens can be introduced without a schema change: the column keeps
//! the same comma-separated encoding either way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single permission scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Ability {
    /// Wildcard, stored as `*`
    All,

    Scope(String),
}

impl Ability {
    const WILDCARD: &'static str = "*";
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::WILDCARD),
            Self::Scope(scope) => f.write_str(scope),
        }
    }
}

impl From<String> for Ability {
    fn from(value: String) -> Self {
        if value == Self::WILDCARD {
            Self::All
        } else {
            Self::Scope(value)
        }
    }
}

impl From<Ability> for String {
    fn from(ability: Ability) -> Self {
        ability.to_string()
    }
}

/// Ordered, de-duplicated set of abilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities(BTreeSet<Ability>);

impl Abilities {
    /// The full-access set granted at login.
    #[must_use]
    pub fn all() -> Self {
        Self(BTreeSet::from([Ability::All]))
    }

    #[must_use]
    pub fn allows(&self, scope: &str) -> bool {
        self.0.iter().any(|ability| match ability {
            Ability::All => true,
            Ability::Scope(s) => s == scope,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.0.iter()
    }
}

impl FromIterator<Ability> for Abilities {
    fn from_iter<I: IntoIterator<Item = Ability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Abilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ability in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{ability}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Abilities {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Ability::from(part.to_string()))
            .collect())
    }
}
