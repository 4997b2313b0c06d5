//! Command-line argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chorus",
    about = "Fan one prompt out to several LLMs and merge the answers",
    version
)]
pub struct Cli {
    /// The question to ask
    pub question: Option<String>,

    /// Model display name to include in the fan-out (repeatable);
    /// defaults to the registry's default selection
    #[arg(short, long = "model")]
    pub model: Vec<String>,

    /// Emit the request as server-sent events on stdout instead of
    /// waiting for the batch result
    #[arg(long)]
    pub stream: bool,

    /// Output format for batch mode
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// System prompt shared verbatim by every model
    #[arg(long)]
    pub system: Option<String>,

    /// Path to an explicit config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the header
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Answer plus attribution and per-model responses
    Full,
    /// Just the combined answer
    Answer,
    /// The JSON payload the HTTP transport would return
    Json,
}
