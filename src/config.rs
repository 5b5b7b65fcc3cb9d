//! Solver configuration.
//!
//! Load search options from TOML so they can be tuned without code changes.
//!
//! ```
//! use crossfill::{ArcConsistencyMode, SolverConfig, ValueOrdering};
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     value_ordering = "domain_order"
//!     arc_consistency = "maintain"
//!     max_states = 10000
//! "#).unwrap();
//!
//! let fill_config = config.to_fill_config().unwrap();
//! assert_eq!(fill_config.value_ordering, ValueOrdering::DomainOrder);
//! assert_eq!(fill_config.arc_consistency, ArcConsistencyMode::Maintain);
//! assert_eq!(fill_config.max_states, Some(10000));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtracking_search::{ArcConsistencyMode, FillConfig, SolutionPolicy, ValueOrdering};

/// Why a solver config couldn't be loaded or used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Search options as written in a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SolverConfig {
    /// How candidate words are ordered for each slot.
    #[serde(default)]
    pub value_ordering: ValueOrdering,

    /// Whether arc consistency is re-established after every choice.
    #[serde(default)]
    pub arc_consistency: ArcConsistencyMode,

    /// Collect up to this many fills instead of stopping at the first.
    #[serde(default)]
    pub solution_limit: Option<usize>,

    /// Collect every fill.
    #[serde(default)]
    pub all_solutions: bool,

    /// Give up after this many search states.
    #[serde(default)]
    pub max_states: Option<u64>,
}

impl SolverConfig {
    /// Default search: LCV ordering, arc consistency up front only, first fill wins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and parse it with `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Unknown keys are rejected rather than ignored.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_value_ordering(mut self, value_ordering: ValueOrdering) -> Self {
        self.value_ordering = value_ordering;
        self
    }

    pub fn with_arc_consistency(mut self, arc_consistency: ArcConsistencyMode) -> Self {
        self.arc_consistency = arc_consistency;
        self
    }

    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    pub fn with_max_states(mut self, max_states: u64) -> Self {
        self.max_states = Some(max_states);
        self
    }

    /// Validate and convert into the options the search takes.
    pub fn to_fill_config(&self) -> Result<FillConfig, ConfigError> {
        let solution_policy = match (self.solution_limit, self.all_solutions) {
            (Some(_), true) => {
                return Err(ConfigError::Invalid(
                    "solution_limit and all_solutions are mutually exclusive".into(),
                ))
            }
            (Some(0), false) => {
                return Err(ConfigError::Invalid("solution_limit must be at least 1".into()))
            }
            (Some(1) | None, false) => SolutionPolicy::FirstFound,
            (Some(limit), false) => SolutionPolicy::Collect { limit: Some(limit) },
            (None, true) => SolutionPolicy::Collect { limit: None },
        };

        Ok(FillConfig {
            value_ordering: self.value_ordering,
            arc_consistency: self.arc_consistency,
            solution_policy,
            max_states: self.max_states,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.to_fill_config().unwrap(), FillConfig::default());
    }

    #[test]
    fn test_toml_parsing() {
        let config = SolverConfig::from_toml_str(
            r#"
            value_ordering = "least_constraining"
            arc_consistency = "maintain"
            solution_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.arc_consistency, ArcConsistencyMode::Maintain);
        assert_eq!(
            config.to_fill_config().unwrap().solution_policy,
            SolutionPolicy::Collect { limit: Some(5) }
        );
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = SolverConfig::from_toml_str("breadth_limit = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_rejects_bad_solution_settings() {
        let zero = SolverConfig::new().with_solution_limit(0);
        assert!(matches!(zero.to_fill_config(), Err(ConfigError::Invalid(_))));

        let both = SolverConfig {
            all_solutions: true,
            ..SolverConfig::new().with_solution_limit(3)
        };
        assert!(matches!(both.to_fill_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_builder() {
        let fill_config = SolverConfig::new()
            .with_value_ordering(ValueOrdering::DomainOrder)
            .with_arc_consistency(ArcConsistencyMode::Maintain)
            .with_max_states(99)
            .to_fill_config()
            .unwrap();

        assert_eq!(
            fill_config,
            FillConfig {
                value_ordering: ValueOrdering::DomainOrder,
                arc_consistency: ArcConsistencyMode::Maintain,
                solution_policy: SolutionPolicy::FirstFound,
                max_states: Some(99),
            }
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "all_solutions = true").unwrap();

        let config = SolverConfig::load(file.path()).unwrap();
        assert_eq!(
            config.to_fill_config().unwrap().solution_policy,
            SolutionPolicy::Collect { limit: None }
        );

        assert!(matches!(
            SolverConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
