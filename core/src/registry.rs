//! Static mapping of verification scopes to their ordered task lists.

use std::collections::HashSet;

use crate::error::GuardrailError;

/// One executable verification step within a scope. Created from the static
/// registry at startup and immutable afterwards; identity is `(scope, id)`.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub scope: String,
    pub id: String,
    pub command: String,
    pub optional: bool,
    pub timeout_ms: Option<u64>,
}

impl TaskSpec {
    fn required(scope: &str, id: &str, command: &str) -> Self {
        Self {
            scope: scope.to_string(),
            id: id.to_string(),
            command: command.to_string(),
            optional: false,
            timeout_ms: None,
        }
    }

    fn optional(scope: &str, id: &str, command: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(scope, id, command)
        }
    }

    fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

/// Ordered scope → tasks mapping. Scope order and per-scope task order are
/// both significant; the scheduler flattens them verbatim.
#[derive(Debug)]
pub struct Registry {
    scopes: Vec<(String, Vec<TaskSpec>)>,
}

impl Registry {
    pub fn new(scopes: Vec<(String, Vec<TaskSpec>)>) -> Result<Self, GuardrailError> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for (scope, tasks) in &scopes {
            for task in tasks {
                if !seen.insert((scope.clone(), task.id.clone())) {
                    return Err(GuardrailError::Execution(format!(
                        "duplicate task id '{}/{}' in registry",
                        scope, task.id
                    )));
                }
            }
        }
        Ok(Self { scopes })
    }

    pub fn scope_names(&self) -> Vec<String> {
        self.scopes.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn has_scope(&self, name: &str) -> bool {
        self.scopes.iter().any(|(s, _)| s == name)
    }

    /// Flatten the selected scopes into one ordered queue. Unknown scope
    /// names are skipped with a warning, never an error.
    pub fn queue_for(&self, selected: &[String]) -> Vec<TaskSpec> {
        let mut queue = Vec::new();
        for name in selected {
            match self.scopes.iter().find(|(s, _)| s == name) {
                Some((_, tasks)) => queue.extend(tasks.iter().cloned()),
                None => tracing::warn!(scope = %name, "unknown scope, skipping"),
            }
        }
        queue
    }
}

/// The built-in verification suite.
pub fn default_registry() -> Registry {
    let scopes = vec![
        (
            "build".to_string(),
            vec![TaskSpec::required(
                "build",
                "check",
                "cargo check --workspace --all-targets",
            )],
        ),
        (
            "lint".to_string(),
            vec![
                TaskSpec::required("lint", "fmt", "cargo fmt --check"),
                TaskSpec::required(
                    "lint",
                    "clippy",
                    "cargo clippy --workspace --all-targets -- -D warnings",
                ),
                TaskSpec::required("lint", "policy", "guardrail policy --strict"),
            ],
        ),
        (
            "test".to_string(),
            vec![TaskSpec::required("test", "unit", "cargo test --workspace")],
        ),
        (
            "docs".to_string(),
            vec![
                TaskSpec::required("docs", "rustdoc", "cargo doc --workspace --no-deps"),
                TaskSpec::optional("docs", "readme-links", "lychee README.md"),
            ],
        ),
        (
            "hygiene".to_string(),
            vec![
                TaskSpec::required("hygiene", "branch-name", "guardrail branch"),
                TaskSpec::required("hygiene", "commit-format", "guardrail commits"),
                TaskSpec::optional("hygiene", "pr-title", "guardrail pr-title")
                    .with_timeout(30_000),
                TaskSpec::optional("hygiene", "drift", "guardrail drift").with_timeout(30_000),
            ],
        ),
    ];

    // The built-in table is statically unique; a duplicate here is a bug.
    Registry::new(scopes).unwrap_or_else(|e| panic!("invalid built-in registry: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_scope_then_task_order() {
        let reg = default_registry();
        let queue = reg.queue_for(&["lint".to_string(), "build".to_string()]);
        let ids: Vec<&str> = queue.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["fmt", "clippy", "policy", "check"]);
    }

    #[test]
    fn unknown_scope_is_skipped_not_an_error() {
        let reg = default_registry();
        let queue = reg.queue_for(&["nope".to_string(), "test".to_string()]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, "unit");
    }

    #[test]
    fn duplicate_task_identity_rejected() {
        let scopes = vec![(
            "build".to_string(),
            vec![
                TaskSpec::required("build", "check", "true"),
                TaskSpec::required("build", "check", "true"),
            ],
        )];
        assert!(Registry::new(scopes).is_err());
    }
}
