use anyhow::Context;
use clap::Parser;
use kubestore::ui::cli::{Cli, Commands};
use kubestore::{drain, search_all, PathSpec, SearchConfig, StoreKind, StoreSet};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = SearchConfig::new(None)?
        .with_kubeconfig_name(cli.kubeconfig_name.clone())
        .with_unsorted(cli.unsorted);

    let mut paths = cli.kubeconfig_paths.clone();
    if paths.is_empty() {
        paths.push("~/.kube".to_string());
    }
    let specs: Vec<PathSpec> = paths.into_iter().map(PathSpec::filesystem).collect();

    // Vault access needs a client from the embedding application
    let stores = StoreSet::from_specs(&config, &specs, None)
        .await
        .context("failed to validate kubeconfig paths")?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => handle_list(&stores).await,
        Commands::Show { location } => handle_show(&stores, &location).await,
    }
}

async fn handle_list(stores: &StoreSet) -> anyhow::Result<()> {
    let discovery = drain(search_all(stores)).await;

    for (_, location) in &discovery.locations {
        println!("{}", location);
    }
    for (kind, error) in &discovery.errors {
        eprintln!("⚠ Warning: {} store: {}", kind, error);
    }
    if discovery.locations.is_empty() {
        eprintln!("No kubeconfig files found.");
    }

    Ok(())
}

async fn handle_show(stores: &StoreSet, location: &str) -> anyhow::Result<()> {
    let content = stores
        .fetch(StoreKind::Filesystem, location)
        .await
        .with_context(|| format!("failed to read kubeconfig {}", location))?;
    std::io::stdout().write_all(&content)?;
    Ok(())
}
