//! Pull-request title guard: the leading `[ID]` bracket must equal the ID
//! embedded in the branch name, with non-empty title text after it.

use crate::config::LifecycleConfig;
use crate::error::GuardrailError;

use super::git::GitCli;
use super::hosting::HostingProvider;
use super::{GuardOutcome, Violation};

pub const CHECK_NAME: &str = "pr-title";

/// Validate one PR title against the branch it belongs to.
pub fn check_title(cfg: &LifecycleConfig, branch: &str, title: &str) -> GuardOutcome {
    let mut violations = Vec::new();

    let branch_id = cfg.branch_id(branch);
    match cfg.pr_title_pattern.captures(title) {
        Some(caps) => {
            let title_id = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

            match &branch_id {
                Some(id) if id != title_id => violations.push(Violation {
                    subject: title.to_string(),
                    detail: format!("title id [{title_id}] does not match branch id [{id}]"),
                }),
                Some(_) => {}
                None => violations.push(Violation {
                    subject: branch.to_string(),
                    detail: "branch name carries no artifact id to compare against".to_string(),
                }),
            }

            if text.is_empty() {
                violations.push(Violation {
                    subject: title.to_string(),
                    detail: "no title text after the [ID] bracket".to_string(),
                });
            }
        }
        None => violations.push(Violation {
            subject: title.to_string(),
            detail: format!(
                "does not match PR title pattern '{}'",
                cfg.pr_title_pattern.as_str()
            ),
        }),
    }

    GuardOutcome::from_violations(CHECK_NAME, title, violations)
}

/// Resolve the branch's open PR and validate its title. Absence of an open
/// PR is not an error: the branch may simply not have one yet.
pub async fn run(
    cfg: &LifecycleConfig,
    git: &GitCli,
    hosting: &dyn HostingProvider,
    number: Option<u64>,
    branch_override: Option<String>,
) -> Result<GuardOutcome, GuardrailError> {
    let branch = match branch_override {
        Some(branch) => branch,
        None => git.current_branch().await?,
    };

    let pr = match number {
        Some(n) => hosting.pr_by_number(n).await?,
        None => hosting.open_pr_for_branch(&branch).await?,
    };

    match pr {
        Some(pr) => Ok(check_title(cfg, &branch, &pr.title)),
        None => Ok(GuardOutcome::skipped(CHECK_NAME, format!("{branch} (no open PR)"))),
    }
}
