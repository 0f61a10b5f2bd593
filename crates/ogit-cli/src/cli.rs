use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "ogit",
    about = "ogit: content-addressed object store speaking git's loose object format",
    version
)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Run as if started in PATH
    #[arg(short = 'C', value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Command to run (init, cat-file, hash-object, ls-tree, write-tree)
    pub command: String,

    /// Arguments passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Create an empty object store
#[derive(Parser, Debug)]
#[command(name = "init")]
pub struct InitArgs {}

/// Print an object's payload, type, or size
#[derive(Parser, Debug)]
#[command(name = "cat-file")]
#[command(group(ArgGroup::new("mode").required(true).args(["pretty", "kind", "size"])))]
pub struct CatFileArgs {
    /// Pretty-print the object's payload
    #[arg(short = 'p')]
    pub pretty: bool,
    /// Print the object's type
    #[arg(short = 't')]
    pub kind: bool,
    /// Print the object's payload size
    #[arg(short = 's')]
    pub size: bool,
    /// Object id (40 hex characters)
    pub object: String,
}

/// Compute a file's blob id, optionally storing it
#[derive(Parser, Debug)]
#[command(name = "hash-object")]
pub struct HashObjectArgs {
    /// Write the blob into the object store
    #[arg(short = 'w')]
    pub write: bool,
    pub path: PathBuf,
}

/// List the entries of a tree object
#[derive(Parser, Debug)]
#[command(name = "ls-tree")]
pub struct LsTreeArgs {
    /// Print entry names only
    #[arg(long)]
    pub name_only: bool,
    /// Tree id (40 hex characters)
    pub tree: String,
}

/// Snapshot the current directory as a tree object
#[derive(Parser, Debug)]
#[command(name = "write-tree")]
pub struct WriteTreeArgs {}
