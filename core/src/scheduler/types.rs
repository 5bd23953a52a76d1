use serde::{Deserialize, Serialize};

/// Terminal state of one task. Decided exactly once at aggregation time:
/// an optional task's failure is downgraded to `Skipped` before the result
/// is recorded, never re-derived later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of one task execution, written exactly once into its queue slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub scope: String,
    pub id: String,
    pub status: TaskStatus,
    pub exit_code: i32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Scheduler inputs for one guardrail run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Selected scope names, in order. Empty means all known scopes.
    pub scopes: Vec<String>,
    pub concurrency: usize,
    pub sequential: bool,
    pub fail_fast: bool,
    /// Lines kept per captured output before elision.
    pub output_line_limit: usize,
    /// Visual progress bar (disabled for JSON output).
    pub progress_bar: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scopes: Vec::new(),
            concurrency: 3,
            sequential: false,
            fail_fast: false,
            output_line_limit: 40,
            progress_bar: false,
        }
    }
}

impl RunOptions {
    /// `fail_fast` and `sequential` both force a single worker; `fail_fast`
    /// needs it so "stop dispatching after the first required failure" holds.
    pub fn effective_concurrency(&self) -> usize {
        if self.fail_fast || self.sequential {
            1
        } else {
            self.concurrency.max(1).min(num_cpus::get().max(1) * 2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_fast_forces_single_worker() {
        let opts = RunOptions {
            concurrency: 8,
            fail_fast: true,
            ..RunOptions::default()
        };
        assert_eq!(opts.effective_concurrency(), 1);
    }

    #[test]
    fn sequential_forces_single_worker() {
        let opts = RunOptions {
            concurrency: 8,
            sequential: true,
            ..RunOptions::default()
        };
        assert_eq!(opts.effective_concurrency(), 1);
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        let opts = RunOptions {
            concurrency: 0,
            ..RunOptions::default()
        };
        assert_eq!(opts.effective_concurrency(), 1);
    }
}
