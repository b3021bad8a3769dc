//! Process execution behind a mockable [`Executor`] trait.
use anyhow::{Context, Result, bail};
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output (empty for passthrough runs).
    pub stdout: String,
    /// Captured standard error (empty for passthrough runs).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process spawning so backends can be tested without
/// touching the real package manager.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command, capture its output, and fail on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> Result<ExecResult>;

    /// Run a command with the terminal attached so the user sees its
    /// progress output. Fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_passthrough<'a>(&self, program: &str, args: &[&'a str]) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, &label(program, args))
    }

    fn run_passthrough(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let label = label(program, args);
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute: {label}"))?;
        if !status.success() {
            bail!("{label} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: status.code(),
        })
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

fn label(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}
