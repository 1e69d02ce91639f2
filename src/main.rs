use bundle_stats_diff::cmd::{self, DiffArgs};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::process;

/// Bundle stats diff engine
///
/// Compares the bundle stats of a baseline and a candidate build and reports
/// which assets grew, shrank, appeared or disappeared.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the stats files of two builds
    Diff(DiffArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Diff(args) => cmd::cmd_diff(args),
        Commands::Completions { shell } => {
            cmd::cmd_completions(*shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        use bundle_stats_diff::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
