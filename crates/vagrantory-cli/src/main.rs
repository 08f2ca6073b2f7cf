//! vagrantory CLI
//!
//! Dynamic inventory script for Vagrant machines: prints the inventory of a
//! `vagrant.yml` source as JSON for `--list` and host variables for `--host`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vagrantory_inventory::{Inventory, InventoryBuilder, SourceConfig, verify_file};

#[derive(Parser)]
#[command(name = "vagrantory", version)]
#[command(about = "Dynamic Ansible inventory for Vagrant machines", long_about = None)]
struct Cli {
    /// Inventory source file, its name must end in vagrant.yml or vagrant.yaml
    #[arg(
        short,
        long,
        env = "VAGRANTORY_CONFIG",
        default_value = "vagrant.yml"
    )]
    inventory: PathBuf,

    /// Print the full inventory (default)
    #[arg(long, conflicts_with = "host")]
    list: bool,

    /// Print the variables of a single host
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Ignore cached inventory and store a fresh one
    #[arg(long)]
    refresh_cache: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the inventory
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !verify_file(&cli.inventory) {
        bail!(
            "{} is not a vagrant inventory source (expected a name ending in vagrant.yml or vagrant.yaml)",
            cli.inventory.display()
        );
    }

    let source = std::fs::canonicalize(&cli.inventory).unwrap_or_else(|_| cli.inventory.clone());
    let config = SourceConfig::load(&source)
        .wrap_err_with(|| format!("failed to load {}", source.display()))?;

    let builder = InventoryBuilder::from_config(config, &source);
    debug!(project = %builder.project_dir().display(), key = builder.cache_key(), "parsing source");

    let mut inventory = Inventory::new();
    builder
        .parse(&mut inventory, cli.refresh_cache)
        .await
        .wrap_err_with(|| format!("failed to parse {}", source.display()))?;

    let output = match cli.host.as_deref() {
        Some(host) if !cli.list => inventory.host_vars(host),
        _ => inventory.to_ansible_list(),
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
