//! Version-control boundary. Read-only queries through the process runner;
//! a missing `git` binary is a fatal precondition, not a validation failure.

use crate::error::GuardrailError;
use crate::runner::{run_command, CommandSpec};

/// One commit in a checked range.
#[derive(Debug, Clone)]
pub struct CommitSubject {
    pub hash: String,
    pub subject: String,
}

#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    async fn git(&self, args: &[&str]) -> Result<String, GuardrailError> {
        let out = run_command(&CommandSpec::new("git", args)).await;
        if out.spawn_error {
            return Err(GuardrailError::PreconditionFailed(format!(
                "git is not available: {}",
                out.output.trim()
            )));
        }
        if !out.ok() {
            return Err(GuardrailError::Execution(format!(
                "git {} failed: {}",
                args.join(" "),
                out.output.trim()
            )));
        }
        Ok(out.output.trim().to_string())
    }

    pub async fn current_branch(&self) -> Result<String, GuardrailError> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    /// The upstream tracking ref, or `None` when the branch has none. Not
    /// having an upstream is an expected state, not an error.
    pub async fn upstream_ref(&self) -> Result<Option<String>, GuardrailError> {
        match self
            .git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
            .await
        {
            Ok(name) => Ok(Some(name)),
            Err(GuardrailError::Execution(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn merge_base(&self, a: &str, b: &str) -> Result<String, GuardrailError> {
        self.git(&["merge-base", a, b]).await
    }

    pub async fn subjects_in_range(
        &self,
        range: &str,
    ) -> Result<Vec<CommitSubject>, GuardrailError> {
        let raw = self
            .git(&["log", "--no-merges", "--format=%H%x09%s", range])
            .await?;
        Ok(parse_log(&raw))
    }

    pub async fn latest_commit(&self) -> Result<Option<CommitSubject>, GuardrailError> {
        let raw = self.git(&["log", "-1", "--format=%H%x09%s"]).await?;
        Ok(parse_log(&raw).into_iter().next())
    }
}

fn parse_log(raw: &str) -> Vec<CommitSubject> {
    raw.lines()
        .filter_map(|line| {
            let (hash, subject) = line.split_once('\t')?;
            Some(CommitSubject {
                hash: hash.to_string(),
                subject: subject.to_string(),
            })
        })
        .collect()
}
