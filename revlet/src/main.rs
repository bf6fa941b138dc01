use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use revlet_core::{Digest, Repository};
use std::io;
use std::path::{Path, PathBuf};

/// Revlet - a minimal content-addressed version-control storage layer
#[derive(Parser)]
#[command(name = "revlet")]
#[command(about = "Content-addressed snapshot storage using BLAKE3", long_about = None)]
#[command(version)]
struct Cli {
    /// Working directory of the repository (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    workdir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init {
        /// Directory to initialize (defaults to the working directory)
        directory: Option<PathBuf>,
    },

    /// Snapshot the working directory and record a commit
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Restore a commit's tree onto the working directory
    Checkout {
        /// Commit digest (defaults to HEAD)
        digest: Option<String>,
    },

    /// Output blob content to stdout
    Cat {
        /// Digest of the blob
        digest: String,
    },

    /// List the entries of a tree
    Ls {
        /// Digest of the tree
        digest: String,

        /// Show entry types and digests
        #[arg(short, long)]
        long: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let workdir = cli
        .workdir
        .unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Init { directory } => cmd_init(&directory.unwrap_or(workdir)),
        Commands::Commit { message } => cmd_commit(&workdir, &message),
        Commands::Checkout { digest } => cmd_checkout(&workdir, digest.as_deref()),
        Commands::Cat { digest } => cmd_cat(&workdir, &digest),
        Commands::Ls { digest, long } => cmd_ls(&workdir, &digest, long),
    }
}

fn open_repo(workdir: &Path) -> Result<Repository> {
    Repository::open(workdir)
        .with_context(|| format!("Failed to open repository at {}", workdir.display()))
}

fn parse_digest(digest_str: &str) -> Result<Digest> {
    Digest::from_hex(digest_str).with_context(|| format!("Invalid digest: {}", digest_str))
}

fn cmd_init(workdir: &Path) -> Result<()> {
    let repo = Repository::init(workdir)
        .with_context(|| format!("Failed to initialize repository at {}", workdir.display()))?;

    println!(
        "Initialized empty revlet repository in {}",
        repo.meta_dir().display()
    );

    Ok(())
}

fn cmd_commit(workdir: &Path, message: &str) -> Result<()> {
    let repo = open_repo(workdir)?;

    let tree = repo
        .build_tree(repo.workdir())
        .with_context(|| "Failed to snapshot working directory")?;

    let digest = repo
        .commit(message, tree)
        .with_context(|| "Failed to record commit")?;

    println!("{} {}", digest, message);

    Ok(())
}

fn cmd_checkout(workdir: &Path, digest_str: Option<&str>) -> Result<()> {
    let repo = open_repo(workdir)?;

    let digest = match digest_str {
        Some(s) => parse_digest(s)?,
        None => repo
            .head()
            .with_context(|| "Failed to read HEAD")?
            .ok_or_else(|| anyhow::anyhow!("No commits yet"))?,
    };

    let commit = repo
        .get_commit(&digest)
        .with_context(|| format!("Failed to read commit {}", digest))?;

    repo.materialize(&commit.tree)
        .with_context(|| format!("Failed to restore tree {}", commit.tree))?;

    println!("Restored {} ({})", digest, commit.message);

    Ok(())
}

fn cmd_cat(workdir: &Path, digest_str: &str) -> Result<()> {
    let repo = open_repo(workdir)?;
    let digest = parse_digest(digest_str)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    repo.blob_to_writer(&digest, &mut handle)
        .with_context(|| format!("Failed to output blob {}", digest))?;

    Ok(())
}

fn cmd_ls(workdir: &Path, digest_str: &str, long: bool) -> Result<()> {
    let repo = open_repo(workdir)?;
    let digest = parse_digest(digest_str)?;

    let entries = repo
        .get_tree(&digest)
        .with_context(|| format!("Failed to read tree {}", digest))?;

    for entry in entries {
        if long {
            println!(
                "{} {} {}",
                entry.entry_type.as_str(),
                entry.digest,
                entry.name
            );
        } else {
            println!("{}", entry.name);
        }
    }

    Ok(())
}
