use std::path::PathBuf;

use clap::Parser;

mod app;
mod commands;

use commands::cli;
use guardrail_core::config::{self, LifecycleConfig, LoggingConfig};
use guardrail_core::error::GuardrailError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, GuardrailError> {
    let args = cli::Args::parse();
    let cfg = config::load_default().map_err(|e| GuardrailError::Config(e.to_string()))?;
    init_tracing(&cfg.logging)?;
    tracing::debug!(
        concurrency = cfg.run.concurrency,
        scripts_root = %cfg.scripts_root,
        "lifecycle configuration loaded"
    );

    dispatch(args.command, &cfg).await
}

async fn dispatch(cmd: cli::Commands, cfg: &LifecycleConfig) -> Result<i32, GuardrailError> {
    match cmd {
        cli::Commands::Run(run_args) => app::run_cmd(cfg, run_args).await,
        cli::Commands::Policy(policy_args) => app::policy_cmd(cfg, policy_args),
        cli::Commands::Branch(branch_args) => app::branch_cmd(cfg, branch_args).await,
        cli::Commands::Commits(commits_args) => app::commits_cmd(cfg, commits_args).await,
        cli::Commands::PrTitle(pr_args) => app::pr_title_cmd(cfg, pr_args).await,
        cli::Commands::Drift(drift_args) => app::drift_cmd(cfg, drift_args).await,
    }
}

/// Console logging goes to stderr so report output on stdout stays clean for
/// machine consumers; the optional file sink is a daily-rolling appender.
fn init_tracing(logging: &LoggingConfig) -> Result<(), GuardrailError> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).map_err(|e| {
            GuardrailError::Config(format!("bad logging.level '{}': {e}", logging.level))
        })?,
    };

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = if logging.file {
        let writer = open_log_writer(logging)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
    } else {
        None
    };

    if console_layer.is_none() && file_layer.is_none() {
        return Err(GuardrailError::Config(
            "logging is enabled but both console and file sinks are off".to_string(),
        ));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn open_log_writer(
    logging: &LoggingConfig,
) -> Result<tracing_appender::non_blocking::NonBlocking, GuardrailError> {
    let dir = logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("guardrail-logs"));
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::daily(&dir, "guardrail.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Keep the flush guard alive for the whole process.
    let _ = LOG_GUARD.set(guard);
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(console: bool, file: bool) -> LoggingConfig {
        LoggingConfig {
            enabled: true,
            level: "info".to_string(),
            console,
            file,
            directory: None,
        }
    }

    #[test]
    fn enabled_logging_with_no_sinks_is_rejected() {
        let err = init_tracing(&logging(false, false)).unwrap_err();
        assert!(err.to_string().contains("sinks"));
    }

    #[test]
    fn disabled_logging_is_a_no_op() {
        assert!(init_tracing(&LoggingConfig {
            enabled: false,
            ..logging(false, false)
        })
        .is_ok());
    }

    #[test]
    fn log_writer_creates_the_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        let cfg = LoggingConfig {
            directory: Some(target.to_string_lossy().to_string()),
            ..logging(false, true)
        };
        assert!(open_log_writer(&cfg).is_ok());
        assert!(target.is_dir());
    }
}
