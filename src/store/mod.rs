//! Kubeconfig stores.
//!
//! A store is one backend kind (a local directory tree, a Vault secret tree)
//! that can list kubeconfig locations onto a shared queue and later read the
//! content behind any location it produced.

pub mod filesystem;
pub mod paths;
pub mod vault;

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::Span;

/// Backend kind a path or store belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Filesystem,
    Vault,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Filesystem => write!(f, "filesystem"),
            StoreKind::Vault => write!(f, "vault"),
        }
    }
}

/// A user-configured search root
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathSpec {
    pub store: StoreKind,
    pub path: String,
}

impl PathSpec {
    pub fn new(store: StoreKind, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn filesystem(path: impl Into<String>) -> Self {
        Self::new(StoreKind::Filesystem, path)
    }

    pub fn vault(path: impl Into<String>) -> Self {
        Self::new(StoreKind::Vault, path)
    }
}

/// One item on the result queue: either a discovered location or a
/// discovery failure, never both.
#[derive(Debug)]
pub enum SearchResult {
    Found { store: StoreKind, location: String },
    Failed { store: StoreKind, error: Error },
}

impl SearchResult {
    pub fn found(store: StoreKind, location: impl Into<String>) -> Self {
        SearchResult::Found {
            store,
            location: location.into(),
        }
    }

    pub fn failed(store: StoreKind, error: Error) -> Self {
        SearchResult::Failed { store, error }
    }

    pub fn store(&self) -> StoreKind {
        match self {
            SearchResult::Found { store, .. } | SearchResult::Failed { store, .. } => *store,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            SearchResult::Found { location, .. } => Some(location),
            SearchResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            SearchResult::Found { .. } => None,
            SearchResult::Failed { error, .. } => Some(error),
        }
    }
}

/// Sending half of the shared result queue
pub type ResultSender = mpsc::Sender<SearchResult>;

/// A backend that discovers kubeconfigs and reads them back by location.
///
/// `validate_paths` must succeed before `start_search` is called. Locations
/// emitted by `start_search` are only meaningful to the same store's
/// `fetch_by_path`.
#[async_trait]
pub trait Store: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Span that scopes this store's log output
    fn span(&self) -> &Span;

    /// Select, de-duplicate and probe the specs belonging to this store.
    async fn validate_paths(&mut self, specs: &[PathSpec]) -> Result<()>;

    /// Search every validated root and send results to `out`.
    ///
    /// Returns once all work spawned by this call has finished. The queue is
    /// not closed here; the caller owns its lifetime.
    async fn start_search(&self, out: ResultSender);

    /// Read the kubeconfig behind a location produced by `start_search`.
    async fn fetch_by_path(&self, location: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_accessors() {
        let found = SearchResult::found(StoreKind::Filesystem, "/tmp/config");
        assert_eq!(found.location(), Some("/tmp/config"));
        assert!(found.error().is_none());
        assert_eq!(found.store(), StoreKind::Filesystem);

        let failed = SearchResult::failed(
            StoreKind::Vault,
            Error::NotFound {
                path: "secret/a".to_string(),
            },
        );
        assert!(failed.location().is_none());
        assert!(failed.error().is_some());
        assert_eq!(failed.store(), StoreKind::Vault);
    }

    #[test]
    fn test_store_kind_display() {
        assert_eq!(StoreKind::Filesystem.to_string(), "filesystem");
        assert_eq!(StoreKind::Vault.to_string(), "vault");
    }
}
