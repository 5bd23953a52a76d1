use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::join_all;
use uuid::Uuid;

use crate::registry::{Registry, TaskSpec};
use crate::report::RunReport;
use crate::runner::{run_command, truncate_output, CommandOutput, CommandSpec};

use super::progress::ProgressMonitor;
use super::types::{RunOptions, TaskResult, TaskStatus};

struct Shared {
    queue: Vec<TaskSpec>,
    cursor: AtomicUsize,
    failures: AtomicUsize,
    slots: Mutex<Vec<Option<TaskResult>>>,
    progress: ProgressMonitor,
    fail_fast: bool,
    output_line_limit: usize,
}

/// Execute the selected scopes and aggregate a queue-ordered report.
///
/// Task failures never propagate as errors; they become `TaskResult` data.
/// Only `fail_fast` converts the first required failure into an early stop,
/// and even then the results collected so far are reported.
pub async fn run_scopes(registry: &Registry, opts: &RunOptions) -> RunReport {
    let started = Instant::now();
    let run_id = Uuid::new_v4().to_string();

    let selected = if opts.scopes.is_empty() {
        registry.scope_names()
    } else {
        opts.scopes.clone()
    };
    let queue = registry.queue_for(&selected);
    let total = queue.len();

    tracing::info!(run_id = %run_id, tasks = total, scopes = ?selected, "guardrail run start");

    let shared = Arc::new(Shared {
        slots: Mutex::new(vec![None; total]),
        queue,
        cursor: AtomicUsize::new(0),
        failures: AtomicUsize::new(0),
        progress: ProgressMonitor::new(total, opts.progress_bar),
        fail_fast: opts.fail_fast,
        output_line_limit: opts.output_line_limit,
    });

    let workers = opts.effective_concurrency().min(total.max(1));
    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let shared = shared.clone();
            tokio::spawn(async move { worker_loop(shared).await })
        })
        .collect();
    join_all(handles).await;

    let failures = shared.failures.load(Ordering::SeqCst);
    let dispatched = shared.cursor.load(Ordering::SeqCst).min(total);
    let aborted = opts.fail_fast && failures > 0 && dispatched < total;
    shared.progress.finish(failures == 0);

    // Completed slots only; under fail-fast the tail was never dispatched.
    let results: Vec<TaskResult> = {
        let mut slots = shared.slots.lock().unwrap();
        slots.iter_mut().filter_map(Option::take).collect()
    };

    tracing::info!(
        run_id = %run_id,
        completed = results.len(),
        failures,
        aborted,
        "guardrail run end"
    );

    RunReport {
        run_id,
        scopes: selected,
        ok: failures == 0,
        aborted,
        duration_ms: started.elapsed().as_millis() as u64,
        results,
    }
}

/// Claim the next queue index, run it, write the result into that exact
/// slot. Workers only contend on the two atomics.
async fn worker_loop(shared: Arc<Shared>) {
    loop {
        if shared.fail_fast && shared.failures.load(Ordering::SeqCst) > 0 {
            break;
        }

        let idx = shared.cursor.fetch_add(1, Ordering::SeqCst);
        if idx >= shared.queue.len() {
            break;
        }

        let task = shared.queue[idx].clone();
        tracing::debug!(scope = %task.scope, id = %task.id, index = idx, "task start");

        let output = match CommandSpec::parse(&task.command) {
            Some(mut spec) => {
                if let Some(ms) = task.timeout_ms {
                    spec = spec.with_timeout(Duration::from_millis(ms));
                }
                run_command(&spec).await
            }
            None => CommandOutput {
                exit_code: 1,
                output: format!("empty command for task '{}/{}'", task.scope, task.id),
                duration_ms: 0,
                timed_out: false,
                spawn_error: true,
            },
        };

        let result = aggregate(&task, output, shared.output_line_limit);
        if result.status == TaskStatus::Failed {
            shared.failures.fetch_add(1, Ordering::SeqCst);
        }
        shared
            .progress
            .task_done(&task.scope, &task.id, result.status != TaskStatus::Failed);

        let mut slots = shared.slots.lock().unwrap();
        slots[idx] = Some(result);
    }
}

/// Decide the tagged status once, here. An optional task's failure is
/// downgraded to `Skipped` with exit code 0 and never counts as a failure.
fn aggregate(task: &TaskSpec, output: CommandOutput, line_limit: usize) -> TaskResult {
    let (status, exit_code) = if output.ok() {
        (TaskStatus::Passed, 0)
    } else if task.optional {
        (TaskStatus::Skipped, 0)
    } else {
        (TaskStatus::Failed, output.exit_code)
    };

    let captured = output.output.trim_end();
    let text = if captured.is_empty() {
        None
    } else {
        Some(truncate_output(captured, line_limit))
    };

    TaskResult {
        scope: task.scope.clone(),
        id: task.id.clone(),
        status,
        exit_code,
        duration_ms: output.duration_ms,
        output: text,
    }
}
