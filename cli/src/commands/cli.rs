use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "guardrail", about = "Guardrail suite: verification runs, policy lint, naming guards and drift checks", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected verification scopes through the scheduler.
    Run(RunArgs),
    /// Statically validate automation scripts against the policy rules.
    Policy(PolicyArgs),
    /// Validate a branch name (explicit or current).
    Branch(BranchArgs),
    /// Validate every commit subject in a resolved range.
    Commits(CommitsArgs),
    /// Validate the open pull request's title for a branch.
    PrTitle(PrTitleArgs),
    /// Compare local lifecycle statuses against the tracked ones.
    Drift(DriftArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Comma-separated scope names; defaults to every known scope.
    #[arg(long, value_delimiter = ',')]
    pub scope: Vec<String>,

    /// Stop dispatching after the first required failure (forces
    /// concurrency 1).
    #[arg(long)]
    pub fail_fast: bool,

    /// Worker count; defaults to the configured value.
    #[arg(long, conflicts_with = "sequential")]
    pub concurrency: Option<usize>,

    /// Run tasks one at a time.
    #[arg(long)]
    pub sequential: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Include captured output for passing tasks too.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PolicyArgs {
    /// Treat warnings as blocking.
    #[arg(long)]
    pub strict: bool,

    /// Only check scripts whose path contains one of these substrings.
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filter: Vec<String>,

    /// Apply contract/danger/size rules to deprecated scripts too.
    #[arg(long)]
    pub include_deprecated: bool,

    /// Script tree root; defaults to the configured scripts_root.
    #[arg(long)]
    pub root: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BranchArgs {
    /// Branch name to validate; defaults to the current branch.
    pub name: Option<String>,

    /// Emit the fixed JSON envelope keyed by the check name.
    #[arg(long)]
    pub report: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CommitsArgs {
    /// Explicit revision range (e.g. main..HEAD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub range: Option<String>,

    #[arg(long, requires = "to")]
    pub from: Option<String>,

    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Emit the fixed JSON envelope keyed by the check name.
    #[arg(long)]
    pub report: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PrTitleArgs {
    /// Explicit PR number instead of resolving the branch's open PR.
    #[arg(long)]
    pub number: Option<u64>,

    /// Branch to resolve; defaults to the current branch.
    #[arg(long)]
    pub branch: Option<String>,

    /// Emit the fixed JSON envelope keyed by the check name.
    #[arg(long)]
    pub report: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DriftArgs {
    /// Comma-separated artifact ids; defaults to every local artifact.
    #[arg(long, value_delimiter = ',')]
    pub paths: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}
