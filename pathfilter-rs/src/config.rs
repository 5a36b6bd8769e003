//! Compiles a decoded filter configuration document into a [`FilterSet`].
//!
//! A document is a mapping from filter name to a rule item, where a rule
//! item is a glob pattern string, a mapping of change-status specs to
//! patterns, or a list of rule items. Lists nest arbitrarily, which is
//! what lets YAML anchors expand into reusable rule groups.

use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::patternset::PatternError;
use crate::ruleset::{ChangeStatus, Filter, FilterSet, FilterSetBuilder, Predicate};

/// Why a filter document failed to compile. Any shape violation anywhere
/// in the document aborts compilation; no partial filter set is produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid filter YAML format: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid filter YAML format: expected a mapping of filter names to rules at the document root, found {found}")]
    RootNotMapping { found: &'static str },

    #[error("invalid filter YAML format: filter names must be non-empty strings, found {found}")]
    InvalidFilterName { found: &'static str },

    #[error("invalid filter YAML format: filter `{filter}` contains an unexpected {found} element, expected a pattern string, a status mapping, or a list")]
    UnexpectedElement {
        filter: String,
        found: &'static str,
    },

    #[error("invalid filter YAML format: filter `{filter}` maps status `{spec}` to an unexpected {found} element, expected a pattern string or a list of pattern strings")]
    UnexpectedPattern {
        filter: String,
        spec: String,
        found: &'static str,
    },

    #[error("filter `{filter}` uses an unknown change status `{token}`")]
    UnknownStatus { filter: String, token: String },

    #[error("filter `{filter}` has an empty change status specification `{spec}`")]
    EmptyStatusSpec { filter: String, spec: String },

    #[error("filter `{filter}` has an invalid glob pattern: {source}")]
    Pattern {
        filter: String,
        source: PatternError,
    },
}

/// A rule item as written in the document, decoded into a closed set of
/// shapes before flattening into predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleItem {
    Pattern(String),
    StatusPatterns {
        statuses: Vec<ChangeStatus>,
        patterns: Vec<String>,
    },
    Group(Vec<RuleItem>),
}

impl RuleItem {
    fn decode(filter: &str, value: &Value) -> Result<RuleItem, ConfigError> {
        match value {
            Value::String(pattern) => Ok(RuleItem::Pattern(pattern.clone())),
            Value::Sequence(items) => {
                let items = items
                    .iter()
                    .map(|item| RuleItem::decode(filter, item))
                    .collect::<Result<_, _>>()?;
                Ok(RuleItem::Group(items))
            }
            Value::Mapping(entries) => {
                let mut items = Vec::new();
                for (key, value) in entries.iter() {
                    let spec = key.as_str().ok_or_else(|| ConfigError::UnexpectedElement {
                        filter: filter.to_string(),
                        found: value_shape(key),
                    })?;
                    items.push(RuleItem::StatusPatterns {
                        statuses: parse_status_spec(filter, spec)?,
                        patterns: decode_patterns(filter, spec, value)?,
                    });
                }
                Ok(RuleItem::Group(items))
            }
            other => Err(ConfigError::UnexpectedElement {
                filter: filter.to_string(),
                found: value_shape(other),
            }),
        }
    }

    fn flatten_into(self, predicates: &mut Vec<Predicate>) {
        match self {
            RuleItem::Pattern(pattern) => predicates.push(Predicate::new(None, pattern)),
            RuleItem::StatusPatterns { statuses, patterns } => {
                for pattern in patterns {
                    predicates.push(Predicate::new(Some(statuses.clone()), pattern));
                }
            }
            RuleItem::Group(items) => {
                for item in items {
                    item.flatten_into(predicates);
                }
            }
        }
    }
}

/// Compile an already-decoded document tree.
pub fn compile(doc: &Value) -> Result<FilterSet, ConfigError> {
    let entries = match doc {
        Value::Mapping(entries) => entries,
        other => {
            return Err(ConfigError::RootNotMapping {
                found: value_shape(other),
            })
        }
    };

    let mut builder = FilterSetBuilder::new();
    for (key, value) in entries.iter() {
        let name = match key.as_str() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(ConfigError::InvalidFilterName {
                    found: value_shape(key),
                })
            }
        };

        let mut predicates = Vec::new();
        RuleItem::decode(name, value)?.flatten_into(&mut predicates);
        let filter =
            Filter::new(name, predicates).map_err(|source| ConfigError::Pattern {
                filter: name.to_string(),
                source,
            })?;
        builder.insert(filter);
    }

    let filters = builder.build();
    debug!(filters = filters.len(), "compiled filter set");
    Ok(filters)
}

/// Decode YAML text and compile it.
pub fn compile_str(source: &str) -> Result<FilterSet, ConfigError> {
    compile(&serde_yaml::from_str(source)?)
}

/// Parse a `|`-separated status spec such as `added|modified`. Tokens are
/// trimmed and case-insensitive; empty tokens are discarded; an unknown
/// token or an all-empty spec is a compile error.
fn parse_status_spec(filter: &str, spec: &str) -> Result<Vec<ChangeStatus>, ConfigError> {
    let mut statuses = Vec::new();
    for token in spec.split('|').map(str::trim).filter(|t| !t.is_empty()) {
        let status = ChangeStatus::from_token(token).ok_or_else(|| ConfigError::UnknownStatus {
            filter: filter.to_string(),
            token: token.to_string(),
        })?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }
    if statuses.is_empty() {
        return Err(ConfigError::EmptyStatusSpec {
            filter: filter.to_string(),
            spec: spec.to_string(),
        });
    }
    Ok(statuses)
}

fn decode_patterns(filter: &str, spec: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    match value {
        Value::String(pattern) => Ok(vec![pattern.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::UnexpectedPattern {
                        filter: filter.to_string(),
                        spec: spec.to_string(),
                        found: value_shape(item),
                    }
                })
            })
            .collect(),
        other => Err(ConfigError::UnexpectedPattern {
            filter: filter.to_string(),
            spec: spec.to_string(),
            found: value_shape(other),
        }),
    }
}

fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        _ => "unsupported value",
    }
}
