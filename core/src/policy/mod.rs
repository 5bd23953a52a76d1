//! Static rule engine for automation scripts.
//!
//! Four independent rules per script: header metadata, CLI contract,
//! dangerous patterns, size compliance. All issues are collected before
//! reporting; nothing short-circuits on the first finding.

mod contract;
mod danger;
mod header;
mod size;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;

use crate::error::{GuardrailError, EXIT_OK, EXIT_UNSAFE, EXIT_VALIDATION};

pub use header::ArtifactHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Header,
    Contract,
    Danger,
    Size,
    /// The script could not be read at all (missing, permissions, bad
    /// encoding). Recorded per script so the rest of the tree still runs.
    Read,
}

/// One finding from one rule. Errors always block; warnings block only in
/// strict mode.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn error(rule: RuleKind, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub(crate) fn warning(rule: RuleKind, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// All findings for one script, plus informational notes that never block.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub path: String,
    pub issues: Vec<ValidationIssue>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyOptions {
    pub strict: bool,
    /// Substring filters on script paths; empty selects everything.
    pub filters: Vec<String>,
    /// Apply contract/danger/size rules to deprecated scripts too. The
    /// header rule always runs, deprecated or not.
    pub include_deprecated: bool,
}

/// Validate one script's source text against all four rules.
pub fn validate_source(
    path: &str,
    source: &str,
    today: chrono::NaiveDate,
    opts: &PolicyOptions,
) -> ScriptReport {
    let mut issues = Vec::new();
    let mut notes = Vec::new();

    let parsed = header::check_header(source, today, &mut issues, &mut notes);

    if parsed.deprecated_since.is_none() || opts.include_deprecated {
        contract::check_contract(path, source, &mut issues);
        danger::check_danger(source, &mut issues);
        size::check_size(source, &mut issues);
    } else {
        notes.push("deprecated script: contract/danger/size rules skipped".to_string());
    }

    ScriptReport {
        path: path.to_string(),
        issues,
        notes,
    }
}

const SCRIPT_GLOBS: [&str; 4] = ["**/*.sh", "**/*.bash", "**/*.js", "**/*.mjs"];

/// Enumerate automation scripts under `root`, deterministically ordered.
pub fn discover_scripts(root: &Path) -> Result<Vec<PathBuf>, GuardrailError> {
    let mut paths = Vec::new();
    for pattern in SCRIPT_GLOBS {
        let full = root.join(pattern);
        let full = full.to_string_lossy().to_string();
        let entries = glob::glob(&full)
            .map_err(|e| GuardrailError::Execution(format!("bad glob '{full}': {e}")))?;
        for entry in entries {
            match entry {
                Ok(p) if p.is_file() => paths.push(p),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "unreadable path during discovery"),
            }
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Validate every discovered script under `root`.
pub fn validate_tree(root: &Path, opts: &PolicyOptions) -> Result<PolicyReport, GuardrailError> {
    let today = chrono::Utc::now().date_naive();
    let mut scripts = Vec::new();

    for path in discover_scripts(root)? {
        let display_path = path.to_string_lossy().to_string();
        if !opts.filters.is_empty() && !opts.filters.iter().any(|f| display_path.contains(f)) {
            continue;
        }
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %display_path, error = %e, "cannot read script");
                scripts.push(ScriptReport {
                    path: display_path,
                    issues: vec![ValidationIssue::error(
                        RuleKind::Read,
                        format!("cannot read script: {e}"),
                    )],
                    notes: Vec::new(),
                });
                continue;
            }
        };
        scripts.push(validate_source(&display_path, &source, today, opts));
    }

    Ok(PolicyReport {
        scripts,
        strict: opts.strict,
    })
}

/// Aggregated findings over all checked scripts.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyReport {
    pub scripts: Vec<ScriptReport>,
    pub strict: bool,
}

impl PolicyReport {
    pub fn error_count(&self) -> usize {
        self.iter_issues()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.iter_issues()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_unsafe(&self) -> bool {
        self.iter_issues()
            .any(|i| i.rule == RuleKind::Danger && i.severity == Severity::Error)
    }

    fn iter_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.scripts.iter().flat_map(|s| s.issues.iter())
    }

    /// 13 when any dangerous-pattern error is present, 11 for other blocking
    /// findings, 0 when clean. Unsafe wins over non-compliant.
    pub fn exit_code(&self) -> i32 {
        if self.has_unsafe() {
            EXIT_UNSAFE
        } else if self.error_count() > 0 || (self.strict && self.warning_count() > 0) {
            EXIT_VALIDATION
        } else {
            EXIT_OK
        }
    }

    pub fn render_json(&self) -> serde_json::Value {
        json!({
            "ok": self.exit_code() == EXIT_OK,
            "strict": self.strict,
            "errors": self.error_count(),
            "warnings": self.warning_count(),
            "unsafe": self.has_unsafe(),
            "scripts": self.scripts,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for script in &self.scripts {
            if script.issues.is_empty() && script.notes.is_empty() {
                continue;
            }
            out.push_str(&format!("{}\n", script.path));
            for issue in &script.issues {
                let tag = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                out.push_str(&format!("  {tag}: {}\n", issue.message));
            }
            for note in &script.notes {
                out.push_str(&format!("  note: {note}\n"));
            }
        }
        out.push_str(&format!(
            "{} script(s) checked, {} error(s), {} warning(s)\n",
            self.scripts.len(),
            self.error_count(),
            self.warning_count()
        ));
        out
    }
}
