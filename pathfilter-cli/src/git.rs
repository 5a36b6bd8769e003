//! Changed-file discovery by shelling out to git.
//!
//! Diffs run with `--no-renames` so a rename reaches the matcher as a
//! Deleted plus Added pair rather than a single Renamed record.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use pathfilter_rs::{ChangeStatus, ChangedFile};

/// Files changed between two revisions.
pub fn changes_between(repo: &Path, base: &str, head: &str) -> Result<Vec<ChangedFile>> {
    let range = format!("{base}..{head}");
    let raw = run_git(
        repo,
        &["diff", "--no-renames", "--name-status", "-z", &range],
    )?;
    parse_name_status(&raw)
}

/// Files changed in the working tree relative to HEAD.
pub fn working_tree_changes(repo: &Path) -> Result<Vec<ChangedFile>> {
    let raw = run_git(
        repo,
        &["diff", "--no-renames", "--name-status", "-z", "HEAD"],
    )?;
    parse_name_status(&raw)
}

/// Files touched by the most recent commit.
pub fn last_commit_changes(repo: &Path) -> Result<Vec<ChangedFile>> {
    let raw = run_git(
        repo,
        &[
            "log",
            "--no-renames",
            "--name-status",
            "-z",
            "--format=",
            "-n",
            "1",
        ],
    )?;
    parse_name_status(&raw)
}

/// Every tracked file, reported as added. Used when there is no base
/// revision to compare against.
pub fn all_tracked_as_added(repo: &Path) -> Result<Vec<ChangedFile>> {
    let raw = run_git(repo, &["ls-files", "-z"])?;
    Ok(raw
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(|path| ChangedFile::new(path, ChangeStatus::Added))
        .collect())
}

fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    debug!(?args, "running git");
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .context("failed to run git")?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout).context("git produced non-UTF-8 output")
}

/// Parse NUL-separated `--name-status -z` output: alternating status and
/// path fields.
fn parse_name_status(raw: &str) -> Result<Vec<ChangedFile>> {
    let mut fields = raw.split('\0').filter(|field| !field.is_empty());
    let mut files = Vec::new();
    while let Some(status_field) = fields.next() {
        // `git log --format=` separates blocks with bare newlines.
        let status_field = status_field.trim_matches('\n');
        if status_field.is_empty() {
            continue;
        }
        let status = parse_status_field(status_field)?;
        let path = fields
            .next()
            .with_context(|| format!("missing path after status `{status_field}`"))?;
        files.push(ChangedFile::new(path, status));
    }
    Ok(files)
}

fn parse_status_field(field: &str) -> Result<ChangeStatus> {
    // Rename and copy entries carry a similarity score, e.g. `R100`.
    let status = match field.chars().next() {
        Some('A') => ChangeStatus::Added,
        Some('C') => ChangeStatus::Copied,
        Some('D') => ChangeStatus::Deleted,
        Some('M') => ChangeStatus::Modified,
        Some('R') => ChangeStatus::Renamed,
        Some('U') => ChangeStatus::Unmerged,
        _ => bail!("unsupported change status `{field}` in git output"),
    };
    Ok(status)
}
