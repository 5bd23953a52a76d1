//! Subcommand dispatch. Every path ends in a single exit code; check
//! failures are carried in reports, only infrastructure faults surface as
//! errors.

use std::path::Path;

use guardrail_core::config::LifecycleConfig;
use guardrail_core::error::GuardrailError;
use guardrail_core::lifecycle::commits::RangeSelection;
use guardrail_core::lifecycle::git::GitCli;
use guardrail_core::lifecycle::hosting::GhCli;
use guardrail_core::lifecycle::{branch, commits, drift, pr_title, GuardOutcome};
use guardrail_core::policy::{validate_tree, PolicyOptions};
use guardrail_core::registry::default_registry;
use guardrail_core::scheduler::{run_scopes, RunOptions};

use crate::commands::cli;
use crate::commands::cli::OutputFormat;

pub async fn run_cmd(cfg: &LifecycleConfig, args: cli::RunArgs) -> Result<i32, GuardrailError> {
    let registry = default_registry();
    let opts = RunOptions {
        scopes: args.scope,
        concurrency: args.concurrency.unwrap_or(cfg.run.concurrency),
        sequential: args.sequential,
        fail_fast: args.fail_fast,
        output_line_limit: cfg.run.output_line_limit,
        progress_bar: args.output == OutputFormat::Text && atty::is(atty::Stream::Stderr),
    };

    let report = run_scopes(&registry, &opts).await;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.render_json())?),
        OutputFormat::Text => print!("{}", report.render_text(args.verbose)),
    }
    Ok(report.exit_code())
}

pub fn policy_cmd(cfg: &LifecycleConfig, args: cli::PolicyArgs) -> Result<i32, GuardrailError> {
    let root = args.root.unwrap_or_else(|| cfg.scripts_root.clone());
    let opts = PolicyOptions {
        strict: args.strict,
        filters: args.filter,
        include_deprecated: args.include_deprecated,
    };

    let report = validate_tree(Path::new(&root), &opts)?;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.render_json())?),
        OutputFormat::Text => print!("{}", report.render_text()),
    }
    Ok(report.exit_code())
}

fn emit_guard(outcome: &GuardOutcome, report: bool) -> Result<i32, GuardrailError> {
    if report {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.report_envelope())?
        );
    } else {
        print!("{}", outcome.render_text());
    }
    Ok(outcome.exit_code())
}

pub async fn branch_cmd(
    cfg: &LifecycleConfig,
    args: cli::BranchArgs,
) -> Result<i32, GuardrailError> {
    let outcome = branch::run(cfg, &GitCli, args.name).await?;
    emit_guard(&outcome, args.report)
}

pub async fn commits_cmd(
    cfg: &LifecycleConfig,
    args: cli::CommitsArgs,
) -> Result<i32, GuardrailError> {
    let sel = RangeSelection {
        range: args.range,
        from: args.from,
        to: args.to,
    };
    let outcome = commits::run(cfg, &GitCli, &sel).await?;
    emit_guard(&outcome, args.report)
}

pub async fn pr_title_cmd(
    cfg: &LifecycleConfig,
    args: cli::PrTitleArgs,
) -> Result<i32, GuardrailError> {
    let outcome = pr_title::run(cfg, &GitCli, &GhCli, args.number, args.branch).await?;
    emit_guard(&outcome, args.report)
}

pub async fn drift_cmd(cfg: &LifecycleConfig, args: cli::DriftArgs) -> Result<i32, GuardrailError> {
    let report = drift::run(cfg, &GhCli, &args.paths).await?;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.render_json())?),
        OutputFormat::Text => print!("{}", report.render_text()),
    }
    Ok(report.exit_code())
}
