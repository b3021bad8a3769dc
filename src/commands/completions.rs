//! Command: print shell completions.
use std::io::Write;

use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;

/// Write completions for `shell` to `out`.
pub fn run(shell: Shell, out: &mut dyn Write) {
    clap_complete::generate(shell, &mut Cli::command(), "brewfiles", out);
}
