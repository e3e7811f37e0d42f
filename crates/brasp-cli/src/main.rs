//! Binary entrypoint for the `brasp` command.
use anyhow::{Context, Result};
use brasp_cli::{load_program, render_json, render_program, render_table};
use brasp_core::{execute_with, DuplicateNamePolicy, ExecutionContext, InputSequence};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brasp")]
#[command(about = "Run BRASP programs over input words", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a program file over a word
    Run {
        /// Path to the program file (YAML)
        program: PathBuf,
        /// Input word, one symbol per character
        word: String,
        /// Print the full execution report as JSON
        #[arg(long)]
        json: bool,
        /// Fail instead of shadowing when two operations share a name
        #[arg(long)]
        reject_duplicates: bool,
    },
    /// Validate a program file and print its operations
    Check {
        /// Path to the program file (YAML)
        program: PathBuf,
    },
}

fn main() -> Result<()> {
    // Log level can be overridden with BRASP_LOG
    let filter = EnvFilter::try_from_env("BRASP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { program, word, json, reject_duplicates } => {
            let loaded = load_program(&program)
                .with_context(|| format!("loading {}", program.display()))?;

            let policy = if reject_duplicates {
                DuplicateNamePolicy::Reject
            } else {
                DuplicateNamePolicy::Shadow
            };
            let ctx = ExecutionContext::new().with_duplicate_names(policy);
            let input = InputSequence::from_word(&word);

            let report = execute_with(&loaded, &input, &ctx)
                .with_context(|| format!("running {} on {:?}", program.display(), word))?;

            if json {
                println!("{}", render_json(&report)?);
            } else {
                print!("{}", render_table(&input, &report.traces));
            }
        }
        Commands::Check { program } => {
            let loaded = load_program(&program)
                .with_context(|| format!("loading {}", program.display()))?;
            print!("{}", render_program(&loaded));
            if let Some(name) = loaded.duplicate_names().first() {
                tracing::warn!(name = %name, "operation name is defined more than once");
            }
        }
    }

    Ok(())
}
