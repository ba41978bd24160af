use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "admit",
    version,
    about = "Local host harness for WebAssembly admission policies"
)]
pub struct Args {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a built-in policy against a material file
    Eval(EvalArgs),

    /// Decode a result a policy emitted and report its enforcement
    Verdict {
        /// Path to the emitted JSON result
        path: PathBuf,
    },

    /// Check a compiled policy module against the host ABI
    Inspect {
        /// Path to the .wasm module
        wasm_path: PathBuf,
    },

    /// Print the content digest of a file
    Digest {
        path: PathBuf,
    },

    /// List the built-in policies
    Policies,
}

#[derive(Debug, ClapArgs)]
pub struct EvalArgs {
    /// Built-in policy name (see `admit policies`)
    #[arg(long)]
    pub policy: String,

    /// File handed to the policy as its material
    #[arg(long)]
    pub material: PathBuf,

    /// Policy arguments as a JSON object
    #[arg(long, conflicts_with = "args_file")]
    pub args: Option<String>,

    /// File holding the policy arguments as a JSON object
    #[arg(long)]
    pub args_file: Option<PathBuf>,

    /// Harness configuration (admit.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
