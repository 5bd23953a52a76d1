//! Run report aggregation and rendering.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{EXIT_OK, EXIT_VALIDATION};
use crate::scheduler::{TaskResult, TaskStatus};

/// Terminal object of a guardrail run: queue-ordered results plus the
/// overall verdict. `ok` means no result has status `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub scopes: Vec<String>,
    pub ok: bool,
    pub aborted: bool,
    pub duration_ms: u64,
    pub results: Vec<TaskResult>,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        if self.ok {
            EXIT_OK
        } else {
            EXIT_VALIDATION
        }
    }

    /// Structured form: full nested per-scope/per-task detail, always
    /// including captured output.
    pub fn render_json(&self) -> serde_json::Value {
        let scopes: Vec<serde_json::Value> = self
            .scopes
            .iter()
            .map(|scope| {
                let tasks: Vec<&TaskResult> =
                    self.results.iter().filter(|r| &r.scope == scope).collect();
                json!({
                    "name": scope,
                    "tasks": tasks,
                })
            })
            .collect();

        json!({
            "run_id": self.run_id,
            "ok": self.ok,
            "aborted": self.aborted,
            "duration_ms": self.duration_ms,
            "scopes": scopes,
        })
    }

    /// Condensed form: one line per task. Captured output is shown only for
    /// failed tasks, or for every task when `verbose` is set.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        for r in &self.results {
            let marker = match r.status {
                TaskStatus::Passed => "PASS",
                TaskStatus::Failed => "FAIL",
                TaskStatus::Skipped => "SKIP",
            };
            out.push_str(&format!(
                "{marker}  {}/{} ({}ms)\n",
                r.scope, r.id, r.duration_ms
            ));

            let show_output = r.status == TaskStatus::Failed || verbose;
            if show_output {
                if let Some(text) = &r.output {
                    for line in text.lines() {
                        out.push_str("      ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
        }

        if self.aborted {
            out.push_str("aborted after first required failure (fail-fast)\n");
        }
        out.push_str(&format!(
            "{}: {} task(s), {}ms\n",
            if self.ok { "ok" } else { "FAILED" },
            self.results.len(),
            self.duration_ms
        ));
        out
    }
}
