//! Commit-header guard: every subject line in a resolved range is checked
//! in one batch; violations are returned as a full list, never cut short at
//! the first failure.

use crate::config::LifecycleConfig;
use crate::error::GuardrailError;

use super::git::{CommitSubject, GitCli};
use super::{GuardOutcome, Violation};

pub const CHECK_NAME: &str = "commit-format";

/// Range overrides from the CLI. All fields empty means auto-derivation.
#[derive(Debug, Clone, Default)]
pub struct RangeSelection {
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Resolution order: explicit range, explicit from/to pair, merge-base of
/// the upstream tracking branch to HEAD, fallback to the latest commit only.
pub async fn resolve_commits(
    git: &GitCli,
    sel: &RangeSelection,
) -> Result<(String, Vec<CommitSubject>), GuardrailError> {
    if let Some(range) = &sel.range {
        return Ok((range.clone(), git.subjects_in_range(range).await?));
    }
    if let (Some(from), Some(to)) = (&sel.from, &sel.to) {
        let range = format!("{from}..{to}");
        let commits = git.subjects_in_range(&range).await?;
        return Ok((range, commits));
    }
    if let Some(upstream) = git.upstream_ref().await? {
        let base = git.merge_base(&upstream, "HEAD").await?;
        let range = format!("{base}..HEAD");
        let commits = git.subjects_in_range(&range).await?;
        return Ok((range, commits));
    }

    tracing::debug!("no upstream tracking branch, falling back to latest commit");
    let commits = git.latest_commit().await?.into_iter().collect();
    Ok(("HEAD".to_string(), commits))
}

/// Validate every commit subject against the `[ID-slug] message` pattern.
pub fn check_subjects(
    cfg: &LifecycleConfig,
    range: &str,
    commits: &[CommitSubject],
) -> GuardOutcome {
    let violations: Vec<Violation> = commits
        .iter()
        .filter(|c| !cfg.commit_pattern.is_match(&c.subject))
        .map(|c| Violation {
            subject: c.hash.clone(),
            detail: format!("subject '{}' has no [ID-slug] prefix", c.subject),
        })
        .collect();
    GuardOutcome::from_violations(CHECK_NAME, range, violations)
}

pub async fn run(
    cfg: &LifecycleConfig,
    git: &GitCli,
    sel: &RangeSelection,
) -> Result<GuardOutcome, GuardrailError> {
    let (range, commits) = resolve_commits(git, sel).await?;
    Ok(check_subjects(cfg, &range, &commits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    fn cfg() -> LifecycleConfig {
        LifecycleConfig::from_file(ConfigFile::default()).unwrap()
    }

    fn commit(hash: &str, subject: &str) -> CommitSubject {
        CommitSubject {
            hash: hash.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn all_violations_are_listed_not_short_circuited() {
        let commits = vec![
            commit("aaa", "fix bug"),
            commit("bbb", "[17-flaky-retry] stabilize retry test"),
            commit("ccc", "wip"),
        ];
        let outcome = check_subjects(&cfg(), "base..HEAD", &commits);
        assert!(!outcome.valid);
        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(outcome.violations[0].subject, "aaa");
        assert!(outcome.violations[0].detail.contains("fix bug"));
        assert_eq!(outcome.violations[1].subject, "ccc");
    }

    #[test]
    fn conforming_batch_is_valid() {
        let commits = vec![
            commit("aaa", "[17-flaky-retry] stabilize retry test"),
            commit("bbb", "[17-flaky-retry] drop dead code"),
        ];
        let outcome = check_subjects(&cfg(), "base..HEAD", &commits);
        assert!(outcome.valid);
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn empty_range_is_valid() {
        let outcome = check_subjects(&cfg(), "base..HEAD", &[]);
        assert!(outcome.valid);
    }
}
