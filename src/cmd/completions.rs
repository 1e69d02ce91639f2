//! Completions command implementation
//!
//! Handles the `bundle-stats-diff completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use super::diff::DiffArgs;
use clap::{Arg, Args, Command};
use clap_complete::{generate, Shell};
use std::io::Write;

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// bundle-stats-diff completions bash > /etc/bash_completion.d/bundle-stats-diff
///
/// # Zsh
/// bundle-stats-diff completions zsh > ~/.zfunc/_bundle-stats-diff
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = command();
    generate(shell, &mut cmd, "bundle-stats-diff", out);
}

/// CLI shape for completion generation; `Cli` itself lives in the binary
fn command() -> Command {
    Command::new("bundle-stats-diff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Diff the bundle stats of two builds")
        .subcommand(DiffArgs::augment_args(
            Command::new("diff").about("Compare the stats files of two builds"),
        ))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(clap::value_parser!(Shell))
                        .help("Shell to generate completions for"),
                ),
        )
}
