// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Kubeconfig backends
pub mod store;

// Result aggregation
pub mod search {
    pub mod aggregate;
}

// User interfaces
pub mod ui {
    pub mod cli;
}

// Re-export commonly used types
pub use core::config::SearchConfig;
pub use core::error::{Error, Result};
pub use search::aggregate::{drain, search_all, Discovery, StoreSet};
pub use store::filesystem::FilesystemStore;
pub use store::vault::{ClientError, SecretValue, VaultClient, VaultStore};
pub use store::{PathSpec, SearchResult, Store, StoreKind};
pub use ui::cli::Cli;
