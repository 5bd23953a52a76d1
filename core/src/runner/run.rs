use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Exit code reported when the binary itself cannot be located or started.
const EXIT_SPAWN_FAILED: i32 = 127;
/// Exit code reported when a per-invocation timeout expires.
const EXIT_TIMED_OUT: i32 = 124;

/// One external command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
            timeout: None,
        }
    }

    /// Split a registry command line into program + args. Registry commands
    /// are static argv lists, not shell snippets, so whitespace splitting is
    /// exact here.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?.to_string();
        Some(Self {
            program,
            args: parts.map(str::to_string).collect(),
            cwd: None,
            timeout: None,
        })
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Captured outcome of one invocation. Non-zero exits and spawn failures are
/// both represented here; neither is an `Err` anywhere in the runner.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
    pub duration_ms: u64,
    pub timed_out: bool,
    pub spawn_error: bool,
}

impl CommandOutput {
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }
}

fn pump_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

/// Execute one external command and capture its merged output.
///
/// Spawn failure (binary not found, permission denied) is reported as a
/// failed result carrying the error text. A timeout kills the subprocess and
/// reports a failed result with `timed_out` set.
pub async fn run_command(spec: &CommandSpec) -> CommandOutput {
    let started = Instant::now();

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program = %spec.program, error = %e, "spawn failed");
            return CommandOutput {
                exit_code: EXIT_SPAWN_FAILED,
                output: format!("cannot start '{}': {e}", spec.program),
                duration_ms: started.elapsed().as_millis() as u64,
                timed_out: false,
                spawn_error: true,
            };
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let out_task = child.stdout.take().map(|s| pump_lines(s, tx.clone()));
    let err_task = child.stderr.take().map(|s| pump_lines(s, tx));

    let (exit_code, timed_out) = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(Ok(status)) => (status.code().unwrap_or(1), false),
            Ok(Err(e)) => {
                tracing::warn!(program = %spec.program, error = %e, "wait failed");
                (1, false)
            }
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                (EXIT_TIMED_OUT, true)
            }
        },
        None => match child.wait().await {
            Ok(status) => (status.code().unwrap_or(1), false),
            Err(e) => {
                tracing::warn!(program = %spec.program, error = %e, "wait failed");
                (1, false)
            }
        },
    };

    if let Some(task) = out_task {
        let _ = task.await;
    }
    if let Some(task) = err_task {
        let _ = task.await;
    }

    let mut merged = String::new();
    while let Ok(line) = rx.try_recv() {
        merged.push_str(&line);
        merged.push('\n');
    }
    if timed_out {
        merged.push_str(&format!(
            "(timed out after {}ms)\n",
            spec.timeout.map(|t| t.as_millis()).unwrap_or_default()
        ));
    }

    CommandOutput {
        exit_code,
        output: merged,
        duration_ms: started.elapsed().as_millis() as u64,
        timed_out,
        spawn_error: false,
    }
}
