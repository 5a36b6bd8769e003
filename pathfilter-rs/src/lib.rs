pub mod config;
pub mod patternset;
mod ruleset;

pub use config::{compile, ConfigError};
pub use ruleset::{
    ChangeStatus, ChangedFile, Filter, FilterMatches, FilterSet, FilterSetBuilder, MatchResult,
    Predicate, PredicateQuantifier,
};

/// Compile a filter set straight from YAML text.
pub fn from_yaml_str(source: &str) -> Result<FilterSet, ConfigError> {
    config::compile_str(source)
}
