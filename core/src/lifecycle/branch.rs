//! Branch-name guard.

use crate::config::LifecycleConfig;
use crate::error::GuardrailError;

use super::git::GitCli;
use super::{GuardOutcome, Violation};

pub const CHECK_NAME: &str = "branch-name";

/// Validate one branch name against the configured `type/ID-slug` pattern.
/// Protected branch names always short-circuit to valid, marked skipped.
pub fn check_branch_name(cfg: &LifecycleConfig, name: &str) -> GuardOutcome {
    if cfg.is_protected_branch(name) {
        return GuardOutcome::skipped(CHECK_NAME, name);
    }

    let mut violations = Vec::new();
    if !cfg.branch_pattern.is_match(name) {
        violations.push(Violation {
            subject: name.to_string(),
            detail: format!(
                "does not match branch pattern '{}'",
                cfg.branch_pattern.as_str()
            ),
        });
    }
    GuardOutcome::from_violations(CHECK_NAME, name, violations)
}

/// Resolve the subject (explicit override or current branch) and validate it.
pub async fn run(
    cfg: &LifecycleConfig,
    git: &GitCli,
    name_override: Option<String>,
) -> Result<GuardOutcome, GuardrailError> {
    let name = match name_override {
        Some(name) => name,
        None => git.current_branch().await?,
    };
    Ok(check_branch_name(cfg, &name))
}
