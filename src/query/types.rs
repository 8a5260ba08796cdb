use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};

/// How the id sets of several sub-queries are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conditions {
    /// Intersection of every sub-query.
    #[default]
    All,
    /// Union of every sub-query.
    Any,
    /// First sub-query minus the union of the rest.
    Diff,
    /// Every known id minus the union of all sub-queries.
    None,
}

impl Conditions {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conditions::All => "all",
            Conditions::Any => "any",
            Conditions::Diff => "diff",
            Conditions::None => "none",
        }
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conditions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Conditions::All),
            "any" => Ok(Conditions::Any),
            "diff" => Ok(Conditions::Diff),
            "none" => Ok(Conditions::None),
            _ => Err(Error::invalid_option(format!("unknown condition mode {:?}", s))),
        }
    }
}

/// Per-search options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Falls back to the engine's configured mode when unset.
    pub conditions: Option<Conditions>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Builds options from a condition string such as `"any"`.
    pub fn parse(conditions: &str) -> Result<Self> {
        Ok(SearchOptions::new().with_conditions(conditions.parse()?))
    }
}

impl From<Conditions> for SearchOptions {
    fn from(conditions: Conditions) -> Self {
        SearchOptions::new().with_conditions(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn parses_modes_loosely() {
        assert_eq!("all".parse::<Conditions>().unwrap(), Conditions::All);
        assert_eq!(" ANY ".parse::<Conditions>().unwrap(), Conditions::Any);
        assert_eq!("Diff".parse::<Conditions>().unwrap(), Conditions::Diff);
        assert_eq!("none\n".parse::<Conditions>().unwrap(), Conditions::None);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = SearchOptions::parse("most").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOption);
    }

    #[test]
    fn default_options_defer_to_engine() {
        assert_eq!(SearchOptions::default().conditions, None);
        assert_eq!(SearchOptions::from(Conditions::None).conditions, Some(Conditions::None));
    }
}
