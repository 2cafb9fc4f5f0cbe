//! CLI module for draftloop - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
