use clap::{Parser, Subcommand};

/// kubestore - find kubeconfig files across configured directories
#[derive(Parser, Debug)]
#[command(name = "kubestore")]
#[command(about = "Discover kubeconfig files and print their locations or content", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory or file to search (repeatable, default: ~/.kube)
    #[arg(short = 'p', long = "kubeconfig-path", global = true)]
    pub kubeconfig_paths: Vec<String>,

    /// Glob pattern a kubeconfig file name has to match
    #[arg(short = 'n', long, default_value = "config", global = true)]
    pub kubeconfig_name: String,

    /// Walk directories without sorting (faster, non-deterministic order)
    #[arg(long, global = true)]
    pub unsorted: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every discovered kubeconfig location
    List,
    /// Print the content of one kubeconfig
    Show {
        /// Location as printed by `list`
        location: String,
    },
}
