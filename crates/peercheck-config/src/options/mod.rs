//! Options consumed by the peer-dependency check

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    /// Sort by `depender + name`, lines read "<depender> requires <name>"
    Depender,
    /// Sort by `name + depender`, lines read "<name> is required by <depender>"
    Dependee,
}

/// Options for one check invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Print satisfied, optional and ignored edges too
    pub verbose: bool,
    /// Log every manifest visited while gathering
    pub debug: bool,
    /// `None` keeps gathering order
    pub order_by: Option<OrderBy>,
    /// Run the fix loop
    pub install: bool,
    /// Compute and print install commands without running them
    pub find_solutions: bool,
    /// Only gather peer dependencies of the root's direct dependencies
    pub run_only_on_root_dependencies: bool,
    /// Package names whose peer requirements are reported but never fail
    pub ignore: Vec<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            order_by: Some(OrderBy::Depender),
            install: false,
            find_solutions: false,
            run_only_on_root_dependencies: false,
            ignore: Vec::new(),
        }
    }
}

impl CheckOptions {
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == name)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Depender => f.write_str("depender"),
            OrderBy::Dependee => f.write_str("dependee"),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "depender" => Ok(OrderBy::Depender),
            "dependee" => Ok(OrderBy::Dependee),
            other => Err(format!("unknown order '{}', expected depender or dependee", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orders_by_depender() {
        let options = CheckOptions::default();
        assert_eq!(options.order_by, Some(OrderBy::Depender));
        assert!(!options.install);
        assert!(!options.find_solutions);
    }

    #[test]
    fn test_order_by_parsing() {
        assert_eq!("depender".parse::<OrderBy>(), Ok(OrderBy::Depender));
        assert_eq!("Dependee".parse::<OrderBy>(), Ok(OrderBy::Dependee));
        assert!("name".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_is_ignored() {
        let options = CheckOptions {
            ignore: vec!["react".to_string()],
            ..CheckOptions::default()
        };
        assert!(options.is_ignored("react"));
        assert!(!options.is_ignored("react-dom"));
    }
}
