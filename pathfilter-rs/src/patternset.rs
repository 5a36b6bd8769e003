use std::path::Path;

pub use globset::Error as PatternError;

/// A compiled set of glob patterns that reports which of them match a
/// given path. Patterns are identified by the order they were added to
/// the builder.
pub trait PatternSetMatcher: Clone {
    fn matching_patterns(&self, path: impl AsRef<Path>) -> Vec<usize>;
}

/// Builder for a [`PatternSetMatcher`]. Calling `build` consumes the
/// builder.
pub trait PatternSetBuilder {
    type Matcher: PatternSetMatcher;

    fn new() -> Self;
    fn add(&mut self, pattern: &str) -> Result<(), PatternError>;
    fn build(self) -> Result<Self::Matcher, PatternError>;
}

/// Pattern set backed by the `globset` crate. `*` and `?` stop at path
/// separators, `**` spans any number of components, brace alternates are
/// expanded, and a leading dot is an ordinary character.
#[derive(Debug, Clone)]
pub struct GlobsetMatcher(globset::GlobSet);

impl PatternSetMatcher for GlobsetMatcher {
    fn matching_patterns(&self, path: impl AsRef<Path>) -> Vec<usize> {
        self.0.matches(path.as_ref())
    }
}

pub struct GlobsetBuilder(globset::GlobSetBuilder);

impl PatternSetBuilder for GlobsetBuilder {
    type Matcher = GlobsetMatcher;

    fn new() -> Self {
        Self(globset::GlobSetBuilder::new())
    }

    fn add(&mut self, pattern: &str) -> Result<(), PatternError> {
        let glob = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?;
        self.0.add(glob);
        Ok(())
    }

    fn build(self) -> Result<Self::Matcher, PatternError> {
        Ok(GlobsetMatcher(self.0.build()?))
    }
}

impl Default for GlobsetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_single_star_stops_at_separators() {
        let patterns = ["src/*", "src/*.rs", "*"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/lib.rs", &patterns, &[0, 1]);
        assert_matches(&matcher, "src/nested/lib.rs", &patterns, &[]);
        assert_matches(&matcher, "lib.rs", &patterns, &[2]);
    }

    #[test]
    fn test_double_star_spans_components() {
        let patterns = ["src/**", "**/*.md", "docs/**/*.png"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/a", &patterns, &[0]);
        assert_matches(&matcher, "src/a/b/c", &patterns, &[0]);
        assert_matches(&matcher, "README.md", &patterns, &[1]);
        assert_matches(&matcher, "docs/guide/intro.md", &patterns, &[1]);
        assert_matches(&matcher, "docs/img/logo.png", &patterns, &[2]);
        assert_matches(&matcher, "docs/logo.png", &patterns, &[2]);
    }

    #[test]
    fn test_dotfiles_are_ordinary_characters() {
        let patterns = ["*", ".github/**", "**/*.yml"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, ".gitignore", &patterns, &[0]);
        assert_matches(&matcher, ".github/workflows/ci.yml", &patterns, &[1, 2]);
    }

    #[test]
    fn test_brace_alternates() {
        let patterns = ["src/**/*.{ts,tsx}"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/app.ts", &patterns, &[0]);
        assert_matches(&matcher, "src/ui/view.tsx", &patterns, &[0]);
        assert_matches(&matcher, "src/app.js", &patterns, &[]);
    }

    #[test]
    fn test_case_sensitive() {
        let patterns = ["*.MD"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "readme.md", &patterns, &[]);
        assert_matches(&matcher, "README.MD", &patterns, &[0]);
    }

    #[test]
    fn test_bang_has_no_negation_meaning() {
        // The engine has no negation syntax; `!` only matches itself.
        let patterns = ["!important"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "!important", &patterns, &[0]);
        assert_matches(&matcher, "important", &patterns, &[]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut builder = GlobsetBuilder::new();
        assert!(builder.add("src/[").is_err());
    }

    fn assert_matches(
        matcher: &GlobsetMatcher,
        path: &str,
        patterns: &[&str],
        expected: &[usize],
    ) {
        assert_eq!(
            HashSet::<usize>::from_iter(matcher.matching_patterns(path)),
            HashSet::from_iter(expected.iter().copied()),
            "expected {:?} to match {:?}",
            path,
            expected.iter().map(|&i| patterns[i]).collect::<Vec<_>>(),
        );
    }

    fn matcher_for_patterns(patterns: &[&str]) -> GlobsetMatcher {
        let mut builder = GlobsetBuilder::new();
        for pattern in patterns {
            builder.add(pattern).unwrap();
        }
        builder.build().unwrap()
    }
}
