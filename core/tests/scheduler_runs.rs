//! End-to-end scheduler scenarios with real subprocesses.

use guardrail_core::registry::{Registry, TaskSpec};
use guardrail_core::scheduler::{run_scopes, RunOptions, TaskStatus};

fn task(scope: &str, id: &str, command: &str, optional: bool) -> TaskSpec {
    TaskSpec {
        scope: scope.to_string(),
        id: id.to_string(),
        command: command.to_string(),
        optional,
        timeout_ms: None,
    }
}

fn registry_of(tasks: Vec<TaskSpec>) -> Registry {
    let mut scopes: Vec<(String, Vec<TaskSpec>)> = Vec::new();
    for t in tasks {
        match scopes.iter_mut().find(|(s, _)| *s == t.scope) {
            Some((_, list)) => list.push(t),
            None => scopes.push((t.scope.clone(), vec![t])),
        }
    }
    Registry::new(scopes).unwrap()
}

fn opts(concurrency: usize) -> RunOptions {
    RunOptions {
        scopes: Vec::new(),
        concurrency,
        ..RunOptions::default()
    }
}

#[tokio::test]
async fn five_passing_tasks_with_concurrency_three() {
    let registry = registry_of(
        (0..5)
            .map(|i| task("suite", &format!("t{i}"), "true", false))
            .collect(),
    );
    let report = run_scopes(&registry, &opts(3)).await;

    assert!(report.ok);
    assert!(!report.aborted);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.results.len(), 5);
    assert!(report
        .results
        .iter()
        .all(|r| r.status == TaskStatus::Passed && r.exit_code == 0));
}

#[tokio::test]
async fn report_order_equals_queue_order_for_all_concurrency_levels() {
    // Earlier tasks sleep longer, so completion order inverts queue order.
    let tasks: Vec<TaskSpec> = (0..6)
        .map(|i| {
            let delay = (6 - i) as f64 * 0.03;
            task("suite", &format!("t{i}"), &format!("sleep {delay:.2}"), false)
        })
        .collect();

    for concurrency in 1..=4 {
        let registry = registry_of(tasks.clone());
        let report = run_scopes(&registry, &opts(concurrency)).await;
        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["t0", "t1", "t2", "t3", "t4", "t5"],
            "concurrency {concurrency}"
        );
    }
}

#[tokio::test]
async fn fail_fast_stops_after_first_required_failure() {
    // Third task fails; tasks four and five must never be dispatched.
    let registry = registry_of(vec![
        task("suite", "t0", "true", false),
        task("suite", "t1", "true", false),
        task("suite", "t2", "false", false),
        task("suite", "t3", "true", false),
        task("suite", "t4", "true", false),
    ]);
    let report = run_scopes(
        &registry,
        &RunOptions {
            fail_fast: true,
            concurrency: 4,
            ..RunOptions::default()
        },
    )
    .await;

    assert!(!report.ok);
    assert!(report.aborted);
    assert_eq!(report.exit_code(), 11);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[2].status, TaskStatus::Failed);
    assert_eq!(report.results[2].exit_code, 1);
}

#[tokio::test]
async fn parallel_mode_reports_everything_despite_failures() {
    let registry = registry_of(vec![
        task("suite", "t0", "false", false),
        task("suite", "t1", "true", false),
        task("suite", "t2", "false", false),
        task("suite", "t3", "true", false),
    ]);
    let report = run_scopes(&registry, &opts(3)).await;

    assert!(!report.ok);
    assert!(!report.aborted);
    assert_eq!(report.results.len(), 4);
    let failed: Vec<&str> = report
        .results
        .iter()
        .filter(|r| r.status == TaskStatus::Failed)
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(failed, vec!["t0", "t2"]);
}

#[tokio::test]
async fn optional_failure_is_skipped_and_does_not_fail_the_run() {
    let registry = registry_of(vec![
        task("suite", "required", "true", false),
        task("suite", "flaky", "false", true),
    ]);
    let report = run_scopes(&registry, &opts(2)).await;

    assert!(report.ok);
    assert_eq!(report.exit_code(), 0);
    let flaky = &report.results[1];
    assert_eq!(flaky.status, TaskStatus::Skipped);
    assert_eq!(flaky.exit_code, 0);
}

#[tokio::test]
async fn missing_binary_fails_the_task_not_the_run_machinery() {
    let registry = registry_of(vec![task(
        "suite",
        "ghost",
        "definitely-not-a-binary-5150",
        false,
    )]);
    let report = run_scopes(&registry, &opts(1)).await;

    assert!(!report.ok);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, TaskStatus::Failed);
    assert!(report.results[0]
        .output
        .as_deref()
        .unwrap()
        .contains("cannot start"));
}

#[tokio::test]
async fn unknown_scope_selection_yields_empty_clean_run() {
    let registry = registry_of(vec![task("suite", "t0", "true", false)]);
    let report = run_scopes(
        &registry,
        &RunOptions {
            scopes: vec!["nope".to_string()],
            ..RunOptions::default()
        },
    )
    .await;

    assert!(report.ok);
    assert!(report.results.is_empty());
}
