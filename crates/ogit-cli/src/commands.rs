use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::Parser;
use ogit_repo::{RepoConfig, RepoResult, Repository};
use ogit_store::Blob;
use ogit_types::ObjectId;
use tracing::debug;

use crate::cli::{CatFileArgs, HashObjectArgs, InitArgs, LsTreeArgs, WriteTreeArgs};
use crate::dispatch;

/// Everything a command needs besides its own arguments.
#[derive(Clone, Debug)]
pub struct CommandContext {
    /// Directory the command runs in.
    pub cwd: PathBuf,
    pub config: RepoConfig,
}

impl CommandContext {
    pub fn new(cwd: impl Into<PathBuf>, config: RepoConfig) -> Self {
        Self {
            cwd: cwd.into(),
            config,
        }
    }

    /// The repository containing `cwd`.
    pub fn repo(&self) -> RepoResult<Repository> {
        Repository::discover(&self.cwd, self.config.clone())
    }
}

/// A named command with a uniform entry point.
///
/// Handlers parse their own arguments, so they can be driven directly from
/// tests without going through process-level argument parsing.
pub trait CommandHandler: Send + Sync {
    /// Name the command is invoked by.
    fn name(&self) -> &'static str;

    /// Run with `args` (not including the command name), writing results
    /// to `out`.
    fn execute(
        &self,
        ctx: &CommandContext,
        args: &[String],
        out: &mut dyn Write,
    ) -> anyhow::Result<()>;
}

/// Maps command names to handlers.
pub struct CommandRegistry {
    handlers: BTreeMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in command.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(InitCommand));
        registry.register(Box::new(CatFileCommand));
        registry.register(Box::new(HashObjectCommand));
        registry.register(Box::new(LsTreeCommand));
        registry.register(Box::new(WriteTreeCommand));
        registry
    }

    /// Add a handler, replacing any handler with the same name.
    pub fn register(&mut self, handler: Box<dyn CommandHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|h| &**h)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Look up `name` and run it.
    pub fn execute(
        &self,
        name: &str,
        ctx: &CommandContext,
        args: &[String],
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let Some(handler) = self.get(name) else {
            let known: Vec<_> = self.names().collect();
            bail!("unknown command {name:?} (expected one of: {})", known.join(", "));
        };
        debug!(command = name, ?args, "dispatching");
        handler.execute(ctx, args, out)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Parse `args` as `T`. `--help` is written to `out` and yields `None`.
fn parse_args<T: Parser>(
    name: &str,
    args: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<Option<T>> {
    match T::try_parse_from(std::iter::once(name).chain(args.iter().map(String::as_str))) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{}", e.render())?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_id(text: &str) -> anyhow::Result<ObjectId> {
    ObjectId::from_hex(text).with_context(|| format!("not a valid object name: {text}"))
}

pub struct InitCommand;

impl CommandHandler for InitCommand {
    fn name(&self) -> &'static str {
        "init"
    }

    fn execute(&self, ctx: &CommandContext, args: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(InitArgs {}) = parse_args::<InitArgs>(self.name(), args, out)? else {
            return Ok(());
        };
        let existed = Repository::exists_at(&ctx.cwd, &ctx.config);
        Repository::init(&ctx.cwd, ctx.config.clone())?;
        if existed {
            writeln!(out, "Reinitialized existing git directory")?;
        } else {
            writeln!(out, "Initialized git directory")?;
        }
        Ok(())
    }
}

pub struct CatFileCommand;

impl CommandHandler for CatFileCommand {
    fn name(&self) -> &'static str {
        "cat-file"
    }

    fn execute(&self, ctx: &CommandContext, args: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(args) = parse_args::<CatFileArgs>(self.name(), args, out)? else {
            return Ok(());
        };
        let id = parse_id(&args.object)?;
        let raw = ctx.repo()?.read_object(&id)?;
        if args.kind {
            writeln!(out, "{}", raw.kind)?;
        } else if args.size {
            writeln!(out, "{}", raw.size())?;
        } else {
            dispatch::print_object(&raw, out)?;
        }
        Ok(())
    }
}

pub struct HashObjectCommand;

impl CommandHandler for HashObjectCommand {
    fn name(&self) -> &'static str {
        "hash-object"
    }

    fn execute(&self, ctx: &CommandContext, args: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(args) = parse_args::<HashObjectArgs>(self.name(), args, out)? else {
            return Ok(());
        };
        let path = ctx.cwd.join(&args.path);
        let id = if args.write {
            ctx.repo()?.hash_object(&path, true)?
        } else {
            // Computing an id needs no repository.
            let data = fs::read(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            Blob::new(data).into_raw_object().compute_id()
        };
        writeln!(out, "{id}")?;
        Ok(())
    }
}

pub struct LsTreeCommand;

impl CommandHandler for LsTreeCommand {
    fn name(&self) -> &'static str {
        "ls-tree"
    }

    fn execute(&self, ctx: &CommandContext, args: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(args) = parse_args::<LsTreeArgs>(self.name(), args, out)? else {
            return Ok(());
        };
        let id = parse_id(&args.tree)?;
        let tree = ctx.repo()?.read_tree(&id)?;
        if args.name_only {
            dispatch::print_names(&tree, out)
        } else {
            dispatch::print_long(&tree, out)
        }
    }
}

pub struct WriteTreeCommand;

impl CommandHandler for WriteTreeCommand {
    fn name(&self) -> &'static str {
        "write-tree"
    }

    fn execute(&self, ctx: &CommandContext, args: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(WriteTreeArgs {}) = parse_args::<WriteTreeArgs>(self.name(), args, out)? else {
            return Ok(());
        };
        let id = ctx.repo()?.write_tree_at(&ctx.cwd)?;
        writeln!(out, "{id}")?;
        Ok(())
    }
}
