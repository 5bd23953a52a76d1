//! Code-hosting boundary, consumed through the `gh` CLI.
//!
//! Queried for the open pull request associated with a branch and for the
//! externally tracked lifecycle status of an artifact. Missing binary or
//! credentials is a fatal precondition, never a validation failure.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GuardrailError;
use crate::runner::{run_command, CommandSpec};

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

/// Narrow query surface over the hosting service. Trait-shaped so guard and
/// drift logic can be exercised against fakes.
#[async_trait]
pub trait HostingProvider: Send + Sync {
    /// The open PR whose head is `branch`, if any. No open PR is a normal
    /// state, not an error.
    async fn open_pr_for_branch(&self, branch: &str)
        -> Result<Option<PullRequest>, GuardrailError>;

    async fn pr_by_number(&self, number: u64) -> Result<Option<PullRequest>, GuardrailError>;

    /// The externally tracked lifecycle status for an artifact id, if any.
    async fn tracked_status(&self, id: &str) -> Result<Option<String>, GuardrailError>;
}

#[derive(Debug, Clone, Default)]
pub struct GhCli;

impl GhCli {
    async fn gh(&self, args: &[&str]) -> Result<String, GuardrailError> {
        let out = run_command(&CommandSpec::new("gh", args)).await;
        if out.spawn_error {
            return Err(GuardrailError::PreconditionFailed(format!(
                "gh CLI is not available: {}",
                out.output.trim()
            )));
        }
        if !out.ok() {
            let text = out.output.trim().to_string();
            let lowered = text.to_lowercase();
            if lowered.contains("auth") || lowered.contains("login") || lowered.contains("token")
            {
                return Err(GuardrailError::PreconditionFailed(format!(
                    "gh CLI is not authenticated: {text}"
                )));
            }
            return Err(GuardrailError::Execution(format!(
                "gh {} failed: {text}",
                args.join(" ")
            )));
        }
        Ok(out.output)
    }
}

#[derive(Debug, Deserialize)]
struct Label {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueView {
    #[serde(default)]
    labels: Vec<Label>,
}

const STATUS_LABEL_PREFIX: &str = "status:";

/// Whether a gh failure message means the requested object does not exist,
/// as opposed to a transient failure (network, rate limit) that must not be
/// mistaken for an absent PR or issue.
fn is_not_found(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("could not resolve")
        || lowered.contains("not found")
        || lowered.contains("no issues match")
        || lowered.contains("no pull requests match")
}

#[async_trait]
impl HostingProvider for GhCli {
    async fn open_pr_for_branch(
        &self,
        branch: &str,
    ) -> Result<Option<PullRequest>, GuardrailError> {
        let raw = self
            .gh(&[
                "pr",
                "list",
                "--head",
                branch,
                "--state",
                "open",
                "--json",
                "number,title",
            ])
            .await?;
        let prs: Vec<PullRequest> = serde_json::from_str(raw.trim())
            .map_err(|e| GuardrailError::Execution(format!("unexpected gh pr list output: {e}")))?;
        Ok(prs.into_iter().next())
    }

    async fn pr_by_number(&self, number: u64) -> Result<Option<PullRequest>, GuardrailError> {
        let number_arg = number.to_string();
        match self
            .gh(&["pr", "view", &number_arg, "--json", "number,title"])
            .await
        {
            Ok(raw) => {
                let pr: PullRequest = serde_json::from_str(raw.trim()).map_err(|e| {
                    GuardrailError::Execution(format!("unexpected gh pr view output: {e}"))
                })?;
                Ok(Some(pr))
            }
            Err(GuardrailError::Execution(msg)) if is_not_found(&msg) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn tracked_status(&self, id: &str) -> Result<Option<String>, GuardrailError> {
        let raw = match self.gh(&["issue", "view", id, "--json", "labels"]).await {
            Ok(raw) => raw,
            Err(GuardrailError::Execution(msg)) if is_not_found(&msg) => return Ok(None),
            Err(e) => return Err(e),
        };
        let view: IssueView = serde_json::from_str(raw.trim())
            .map_err(|e| GuardrailError::Execution(format!("unexpected gh issue output: {e}")))?;
        Ok(view
            .labels
            .into_iter()
            .find(|l| l.name.starts_with(STATUS_LABEL_PREFIX))
            .map(|l| l.name[STATUS_LABEL_PREFIX.len()..].trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_label_is_extracted() {
        let view: IssueView = serde_json::from_str(
            r#"{"labels":[{"name":"bug"},{"name":"status: PR Open"}]}"#,
        )
        .unwrap();
        let status = view
            .labels
            .into_iter()
            .find(|l| l.name.starts_with(STATUS_LABEL_PREFIX))
            .map(|l| l.name[STATUS_LABEL_PREFIX.len()..].trim().to_string());
        assert_eq!(status.as_deref(), Some("PR Open"));
    }

    #[test]
    fn missing_objects_are_distinguished_from_transient_failures() {
        assert!(is_not_found(
            "gh issue view 99 failed: GraphQL: Could not resolve to an issue"
        ));
        assert!(is_not_found("gh pr view 4 failed: no pull requests match"));
        assert!(is_not_found("gh issue view 7 failed: issue Not Found"));

        assert!(!is_not_found(
            "gh issue view 7 failed: error connecting to api.github.com"
        ));
        assert!(!is_not_found("gh issue view 7 failed: API rate limit exceeded"));
    }
}
