//! dimcfg cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every variant product
    ///
    /// Reads YAML from stdin unless a file is provided (via --input-file)
    #[command(alias = "r")]
    Render(RenderCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Restrict generated variants, e.g. `env=prod` or `env=prod.eu1:zone`
    ///
    /// Can be specified multiple times. All filters apply.
    #[clap(short = 'x', long = "filter")]
    pub filters: Vec<String>,

    /// Require every key of a condition to match instead of deciding on the first one
    #[clap(long = "all-keys")]
    pub all_keys: bool,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a YAML file (JSON when the extension is .json)
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Declared items per dimension, register and domain
    Dimensions,
    /// The parsed property tree
    Tree,
    /// One line per generated tuple, in filter syntax
    Tuples,
}
