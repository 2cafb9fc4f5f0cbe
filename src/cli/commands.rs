//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: refine one request through the producer/reviewer loop
//! - prompts: print the role templates in effect

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Draftloop - write, critique and finalize code through a bounded loop
#[derive(Parser, Debug)]
#[command(name = "draftloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the refinement loop for one request
    Run {
        /// What to build; read from stdin when omitted
        request: Option<String>,

        /// Round cap (overrides loop.max_rounds)
        #[arg(short, long)]
        max_rounds: Option<u32>,

        /// Model to use (overrides llm.model and MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Directory for the JSONL event journal
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// Print the artifact only, without fences or a summary
        #[arg(long)]
        raw: bool,
    },

    /// Print the role prompt templates in effect
    Prompts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["draftloop"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["draftloop", "-v", "prompts"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["draftloop", "prompts", "-c", "/path/to/draftloop.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/draftloop.yml")));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["draftloop", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                request,
                max_rounds,
                model,
                journal,
                raw,
            } => {
                assert!(request.is_none());
                assert!(max_rounds.is_none());
                assert!(model.is_none());
                assert!(journal.is_none());
                assert!(!raw);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_with_options() {
        let cli = Cli::try_parse_from([
            "draftloop",
            "run",
            "write a fizzbuzz in python",
            "--max-rounds",
            "3",
            "--model",
            "claude-3-haiku",
            "--journal",
            "/tmp/journal",
            "--raw",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                request,
                max_rounds,
                model,
                journal,
                raw,
            } => {
                assert_eq!(request.as_deref(), Some("write a fizzbuzz in python"));
                assert_eq!(max_rounds, Some(3));
                assert_eq!(model.as_deref(), Some("claude-3-haiku"));
                assert_eq!(journal, Some(PathBuf::from("/tmp/journal")));
                assert!(raw);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_rejects_bad_round_cap() {
        assert!(Cli::try_parse_from(["draftloop", "run", "x", "--max-rounds", "many"]).is_err());
    }

    #[test]
    fn test_prompts_command() {
        let cli = Cli::try_parse_from(["draftloop", "prompts"]).unwrap();
        assert!(matches!(cli.command, Commands::Prompts));
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
