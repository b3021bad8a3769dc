//! Yes/no confirmation gate for destructive actions.
//!
//! Declining is not an error here; callers turn a `false` into
//! [`ReconcileError::UserCancelled`](crate::error::ReconcileError::UserCancelled).
//! In a non-interactive context the terminal gate blocks on stdin.
use std::io::{self, BufRead, Write};

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Show `question` and return whether the answer was affirmative.
    fn ask(&mut self, question: &str) -> bool;
}

/// [`Confirm`] implementation reading answers from `input` and writing the
/// prompt to `output`.
#[derive(Debug)]
pub struct PromptGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    /// Create a gate over arbitrary streams.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Gate attached to the terminal: reads stdin, prompts on stderr.
#[must_use]
pub fn terminal() -> PromptGate<io::StdinLock<'static>, io::Stderr> {
    PromptGate::new(io::stdin().lock(), io::stderr())
}

impl<R: BufRead, W: Write> Confirm for PromptGate<R, W> {
    fn ask(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} [y/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}

/// `y` or `yes`, case-insensitive, surrounding whitespace ignored.
fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Gate a destructive action affecting `count` items.
///
/// `force` approves without prompting, as does an empty batch.
pub fn confirm(gate: &mut dyn Confirm, description: &str, count: usize, force: bool) -> bool {
    if force || count == 0 {
        return true;
    }
    gate.ask(description)
}
