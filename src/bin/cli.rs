//! CLI for WebHDFS transfers

use anyhow::Context;
use clap::{Parser, Subcommand};
use hdfstools::client::LogOnly;
use hdfstools::common::{format_bytes, parse_duration};
use hdfstools::{ClientConfig, CoordinatorNode, HdfsClient, Lookup};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hdfstools")]
#[command(about = "Failover-aware WebHDFS client")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candidate namenode host:port (repeatable, overrides the config file)
    #[arg(long = "namenode")]
    namenodes: Vec<CoordinatorNode>,

    /// How long an active-namenode answer is trusted (e.g. "10s")
    #[arg(long)]
    staleness: Option<String>,

    /// Keep using the same namenode when a request fails
    #[arg(long)]
    no_failover: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file or directory
    Upload {
        local: PathBuf,
        remote: String,

        /// Replace an existing destination
        #[arg(long)]
        overwrite: bool,
    },

    /// Download a remote file or directory
    Download {
        remote: String,
        local: PathBuf,

        /// Replace an existing destination
        #[arg(long)]
        overwrite: bool,
    },

    /// List a remote directory
    Ls { path: String },

    /// Show the status of a remote path
    Stat { path: String },

    /// Create a remote directory (with parents)
    Mkdir { path: String },

    /// Delete a remote path
    Rm {
        path: String,

        #[arg(long, short)]
        recursive: bool,
    },

    /// Rename a remote path
    Mv { src: String, dst: String },

    /// Print the active namenode
    Active,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if !cli.namenodes.is_empty() {
        config.namenodes = cli.namenodes.clone();
    }
    if let Some(staleness) = &cli.staleness {
        config.staleness_window_ms = u64::try_from(parse_duration(staleness)?.as_millis())
            .with_context(|| format!("staleness window out of range: {}", staleness))?;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut client = HdfsClient::connect(&config)?;
    if cli.no_failover {
        client = client.with_failure_hook(LogOnly);
    }

    match cli.command {
        Commands::Upload {
            local,
            remote,
            overwrite,
        } => {
            if !client.upload(&local, &remote, overwrite)? {
                anyhow::bail!("upload of {} to {} failed", local.display(), remote);
            }
            println!("Uploaded {} -> {}", local.display(), remote);
        }

        Commands::Download {
            remote,
            local,
            overwrite,
        } => {
            if !client.download(&remote, &local, overwrite)? {
                anyhow::bail!("download of {} to {} failed", remote, local.display());
            }
            println!("Downloaded {} -> {}", remote, local.display());
        }

        Commands::Ls { path } => match client.list_directory(&path)? {
            Lookup::Found(listing) => {
                for dir in &listing.dirs {
                    println!("{}/", dir);
                }
                for file in &listing.files {
                    println!("{}", file);
                }
            }
            Lookup::NotFound => anyhow::bail!("{}: no such directory", path),
            Lookup::TransportFailed => anyhow::bail!("{}: namenode unreachable", path),
        },

        Commands::Stat { path } => match client.get_status(&path)? {
            Lookup::Found(status) => {
                println!("Path: {}", path);
                println!("  Type: {}", status.entry_type);
                println!("  Size: {}", format_bytes(status.length));
                println!("  Owner: {}:{}", status.owner, status.group);
                println!("  Permission: {}", status.permission);
                println!("  Replication: {}", status.replication);
                if let Some(modified) = status.modified_at() {
                    println!("  Modified: {}", modified.to_rfc3339());
                }
            }
            Lookup::NotFound => anyhow::bail!("{}: no such file or directory", path),
            Lookup::TransportFailed => anyhow::bail!("{}: namenode unreachable", path),
        },

        Commands::Mkdir { path } => {
            if !client.makedirs(&path)? {
                anyhow::bail!("cannot create {}", path);
            }
        }

        Commands::Rm { path, recursive } => {
            if !client.delete(&path, recursive)? {
                anyhow::bail!("cannot delete {}", path);
            }
        }

        Commands::Mv { src, dst } => {
            if !client.rename(&src, &dst)? {
                anyhow::bail!("cannot rename {} to {}", src, dst);
            }
        }

        Commands::Active => {
            println!("{}", client.active_namenode());
        }
    }

    Ok(())
}
