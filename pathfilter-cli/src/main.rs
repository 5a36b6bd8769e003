use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pathfilter_rs::{ChangedFile, FilterSet, MatchResult, PredicateQuantifier};

mod git;
mod output;

use output::ListFormat;

/// Name of the aggregate output listing every filter that matched. A
/// user-declared filter with the same name takes precedence over it.
const AGGREGATE_OUTPUT: &str = "changes";

/// Classifies the files changed in a git repository against named path
/// filter rules.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a filter rules YAML file, or an inline YAML document.
    #[arg(short, long)]
    filters: String,

    /// Base revision to compare against.
    #[arg(long, conflicts_with_all = ["working_tree", "last_commit", "all"])]
    base: Option<String>,

    /// Head revision compared to --base.
    #[arg(long, default_value = "HEAD", requires = "base")]
    head: String,

    /// Compare the working tree against HEAD.
    #[arg(long)]
    working_tree: bool,

    /// Use the files touched by the most recent commit.
    #[arg(long, conflicts_with = "working_tree")]
    last_commit: bool,

    /// Treat every tracked file as added.
    #[arg(long, conflicts_with_all = ["working_tree", "last_commit"])]
    all: bool,

    /// Whether one matching pattern suffices or all patterns must match.
    #[arg(long, value_enum, default_value_t = Quantifier::Some)]
    predicate_quantifier: Quantifier,

    /// Encoding for per-filter file lists.
    #[arg(long, value_enum, default_value_t = ListFormat::None)]
    list_files: ListFormat,

    /// Repository to inspect.
    #[arg(long, default_value = ".")]
    repo: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quantifier {
    Some,
    Every,
}

impl From<Quantifier> for PredicateQuantifier {
    fn from(quantifier: Quantifier) -> Self {
        match quantifier {
            Quantifier::Some => PredicateQuantifier::Some,
            Quantifier::Every => PredicateQuantifier::Every,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = resolve_filter_source(&cli.filters)?;
    let filters = pathfilter_rs::from_yaml_str(&source)?;

    let files = detect_changes(&cli)?;
    let result = filters.match_files(&files, cli.predicate_quantifier.into());

    print_results(&filters, &result, cli.list_files);
    Ok(())
}

/// The filters argument is a file path when one exists, otherwise it is
/// taken as inline YAML.
fn resolve_filter_source(value: &str) -> Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read filter rules from {}", path.display()))
    } else {
        Ok(value.to_string())
    }
}

fn detect_changes(cli: &Cli) -> Result<Vec<ChangedFile>> {
    if cli.working_tree {
        git::working_tree_changes(&cli.repo)
    } else if let Some(base) = &cli.base {
        git::changes_between(&cli.repo, base, &cli.head)
    } else if cli.last_commit {
        git::last_commit_changes(&cli.repo)
    } else if cli.all {
        git::all_tracked_as_added(&cli.repo)
    } else {
        // No mode given: fall back to the working-tree diff.
        git::working_tree_changes(&cli.repo)
    }
}

fn print_results(filters: &FilterSet, result: &MatchResult, list_files: ListFormat) {
    for entry in result.iter() {
        println!("{}={}", entry.name, !entry.files.is_empty());
        println!("{}_count={}", entry.name, entry.files.len());
        if list_files != ListFormat::None {
            let paths: Vec<&str> = entry.files.iter().map(|f| f.path.as_str()).collect();
            println!(
                "{}_files={}",
                entry.name,
                output::serialize_paths(&paths, list_files)
            );
        }
    }

    // The aggregate output lists matching filter names as JSON. A filter
    // the user named `changes` wins the key; keep their result and say so.
    if filters.get(AGGREGATE_OUTPUT).is_some() {
        warn!(
            "filter named `{AGGREGATE_OUTPUT}` collides with the aggregate output; \
             skipping the aggregate"
        );
    } else {
        let names = result.matching_filter_names();
        let encoded =
            serde_json::to_string(&names).expect("string slices always serialize");
        println!("{AGGREGATE_OUTPUT}={encoded}");
    }
}
