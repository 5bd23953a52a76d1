//! Naming guards and lifecycle drift detection.
//!
//! Three validators (branch name, commit header batch, PR title) share one
//! [`LifecycleConfig`](crate::config::LifecycleConfig); the drift detector
//! compares locally declared lifecycle statuses against the externally
//! tracked ones. All of them collect every finding before reporting.

pub mod branch;
pub mod commits;
pub mod drift;
pub mod git;
pub mod hosting;
pub mod pr_title;

use serde::Serialize;
use serde_json::json;

use crate::error::{EXIT_NAMING, EXIT_OK};

/// One format violation: the offending subject plus what is wrong with it.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub subject: String,
    pub detail: String,
}

/// Outcome of one guard check. `skipped` marks short-circuited subjects
/// (protected branches, branches without an open PR) that are valid by fiat.
#[derive(Debug, Clone, Serialize)]
pub struct GuardOutcome {
    pub check: &'static str,
    pub valid: bool,
    pub skipped: bool,
    pub subject: String,
    pub violations: Vec<Violation>,
}

impl GuardOutcome {
    pub(crate) fn skipped(check: &'static str, subject: impl Into<String>) -> Self {
        Self {
            check,
            valid: true,
            skipped: true,
            subject: subject.into(),
            violations: Vec::new(),
        }
    }

    pub(crate) fn from_violations(
        check: &'static str,
        subject: impl Into<String>,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            check,
            valid: violations.is_empty(),
            skipped: false,
            subject: subject.into(),
            violations,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.valid {
            EXIT_OK
        } else {
            EXIT_NAMING
        }
    }

    /// Fixed JSON envelope keyed by the check name.
    pub fn report_envelope(&self) -> serde_json::Value {
        json!({
            self.check: {
                "valid": self.valid,
                "skipped": self.skipped,
                "subject": self.subject,
                "violations": self.violations,
            }
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.skipped {
            out.push_str(&format!("{}: '{}' skipped\n", self.check, self.subject));
            return out;
        }
        if self.valid {
            out.push_str(&format!("{}: '{}' ok\n", self.check, self.subject));
            return out;
        }
        out.push_str(&format!("{}: '{}' invalid\n", self.check, self.subject));
        for v in &self.violations {
            out.push_str(&format!("  {}: {}\n", v.subject, v.detail));
        }
        out
    }
}
