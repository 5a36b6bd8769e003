use std::fmt;

use tracing::debug;

use crate::patternset::{
    GlobsetBuilder, GlobsetMatcher, PatternError, PatternSetBuilder, PatternSetMatcher,
};

/// How a file differs between the two revisions being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    Unmerged,
}

impl ChangeStatus {
    pub const ALL: [ChangeStatus; 6] = [
        ChangeStatus::Added,
        ChangeStatus::Copied,
        ChangeStatus::Deleted,
        ChangeStatus::Modified,
        ChangeStatus::Renamed,
        ChangeStatus::Unmerged,
    ];

    /// Parse a configuration token such as `added` or `Modified`.
    pub fn from_token(token: &str) -> Option<ChangeStatus> {
        match token.to_ascii_lowercase().as_str() {
            "added" => Some(ChangeStatus::Added),
            "copied" => Some(ChangeStatus::Copied),
            "deleted" => Some(ChangeStatus::Deleted),
            "modified" => Some(ChangeStatus::Modified),
            "renamed" => Some(ChangeStatus::Renamed),
            "unmerged" => Some(ChangeStatus::Unmerged),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Copied => "copied",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Unmerged => "unmerged",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file touched in the change set. Paths are repository-relative and
/// forward-slash separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: ChangeStatus,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> ChangedFile {
        ChangedFile {
            path: path.into(),
            status,
        }
    }
}

/// Whether a filter's predicates combine with logical OR (`Some`, the
/// conventional default) or logical AND (`Every`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateQuantifier {
    Some,
    Every,
}

/// One atomic test within a filter: an optional change-status constraint
/// paired with a glob pattern. The compiled form of the pattern lives in
/// the owning filter's pattern set, at this predicate's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub statuses: Option<Vec<ChangeStatus>>,
    pub pattern: String,
}

impl Predicate {
    pub fn new(statuses: Option<Vec<ChangeStatus>>, pattern: impl Into<String>) -> Predicate {
        Predicate {
            statuses,
            pattern: pattern.into(),
        }
    }
}

/// A named rule: predicates in declaration order plus their compiled
/// pattern set.
#[derive(Debug, Clone)]
pub struct Filter {
    name: String,
    predicates: Vec<Predicate>,
    pattern_set: GlobsetMatcher,
}

impl Filter {
    pub fn new(name: impl Into<String>, predicates: Vec<Predicate>) -> Result<Filter, PatternError> {
        let mut builder = GlobsetBuilder::new();
        for predicate in &predicates {
            builder.add(&predicate.pattern)?;
        }
        Ok(Filter {
            name: name.into(),
            predicates,
            pattern_set: builder.build()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Test one file against this filter. A filter with no predicates
    /// matches nothing under either quantifier.
    pub fn is_match(&self, file: &ChangedFile, quantifier: PredicateQuantifier) -> bool {
        if self.predicates.is_empty() {
            return false;
        }

        let matched = self.pattern_set.matching_patterns(&file.path);
        match quantifier {
            PredicateQuantifier::Some => matched
                .iter()
                .any(|&idx| self.status_allows(idx, file.status)),
            // The pattern set reports each pattern index at most once, so a
            // full-length match list means every predicate's path test passed.
            PredicateQuantifier::Every => {
                matched.len() == self.predicates.len()
                    && (0..self.predicates.len()).all(|idx| self.status_allows(idx, file.status))
            }
        }
    }

    fn status_allows(&self, idx: usize, status: ChangeStatus) -> bool {
        match &self.predicates[idx].statuses {
            Some(statuses) => statuses.contains(&status),
            None => true,
        }
    }
}

/// A compiled, read-only table of named filters in declaration order.
#[derive(Debug, Clone)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Classify `files` against every filter. Each filter appears in the
    /// result, matched or not, and input ordering is preserved within each
    /// filter's list.
    pub fn match_files(
        &self,
        files: &[ChangedFile],
        quantifier: PredicateQuantifier,
    ) -> MatchResult {
        let mut entries = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let matched: Vec<ChangedFile> = files
                .iter()
                .filter(|file| filter.is_match(file, quantifier))
                .cloned()
                .collect();
            debug!(
                filter = %filter.name,
                matched = matched.len(),
                "evaluated filter"
            );
            entries.push(FilterMatches {
                name: filter.name.clone(),
                files: matched,
            });
        }
        MatchResult { entries }
    }
}

pub struct FilterSetBuilder {
    filters: Vec<Filter>,
}

impl FilterSetBuilder {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter. Redefining a name replaces the earlier filter in
    /// place; the last definition wins.
    pub fn insert(&mut self, filter: Filter) {
        match self.filters.iter_mut().find(|f| f.name == filter.name) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
    }

    pub fn build(self) -> FilterSet {
        FilterSet {
            filters: self.filters,
        }
    }
}

impl Default for FilterSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The matched subset of input files, per filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMatches {
    pub name: String,
    pub files: Vec<ChangedFile>,
}

/// The outcome of one matching pass, in filter declaration order. Every
/// declared filter is present, with an empty list when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    entries: Vec<FilterMatches>,
}

impl MatchResult {
    pub fn iter(&self) -> impl Iterator<Item = &FilterMatches> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&[ChangedFile]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.files.as_slice())
    }

    /// Names of the filters that matched at least one file, in declaration
    /// order.
    pub fn matching_filter_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.files.is_empty())
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
