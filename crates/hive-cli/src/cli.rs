use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hive",
    about = "Hive — typed access to hierarchical key/value stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store file; overrides the config file's `store`.
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a node and any missing parents
    Mkdir(MkdirArgs),
    /// Read a value
    Get(GetArgs),
    /// Write a value
    Set(SetArgs),
    /// Limit the rights future opens of a node may request
    Lock(LockArgs),
}

#[derive(Args)]
pub struct MkdirArgs {
    pub path: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub path: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SetKind {
    U32,
    U64,
    Text,
    MultiText,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: String,
    pub name: String,
    #[arg(value_enum)]
    pub kind: SetKind,
    /// One value, or any number for `multi-text`.
    pub values: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LockLevel {
    Read,
    Write,
    ReadWrite,
    None,
}

#[derive(Args)]
pub struct LockArgs {
    pub path: String,
    #[arg(value_enum)]
    pub level: LockLevel,
}
