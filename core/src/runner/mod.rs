//! External command execution.
//!
//! One entry point, [`run_command`]: spawns a subprocess, merges stdout and
//! stderr into a single captured buffer in arrival order, and never fails on
//! a non-zero exit. Exit status is data for the caller's status logic.

mod output;
mod run;

pub use output::{truncate_output, ELISION_MARKER};
pub use run::{run_command, CommandOutput, CommandSpec};
