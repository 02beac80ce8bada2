use crate::store::StoreKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("the configured kubeconfig path {path:?} does not exist")]
    PathNotFound { path: String },

    #[error("failed to read from the configured kubeconfig path {path:?}: {source}")]
    PathUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("none of the {configured} specified kubeconfig path(s) exist for the {kind} store")]
    NoReachablePaths { kind: StoreKind, configured: usize },

    #[error("invalid kubeconfig name pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to find kubeconfig files in directory {}: {message}", .root.display())]
    Walk { root: PathBuf, message: String },

    #[error("vault error for path {path:?}: {message}")]
    Vault { path: String, message: String },

    #[error("no kubeconfig found for path {path:?}")]
    NotFound { path: String },

    #[error("cannot read kubeconfig from {path:?}: expected exactly one entry in the secret, found {entries}")]
    AmbiguousSecret { path: String, entries: usize },

    #[error("cannot read kubeconfig from {path:?}: key {key:?} does not match kubeconfig name {pattern:?}")]
    NameMismatch {
        path: String,
        key: String,
        pattern: String,
    },

    #[error("cannot read kubeconfig from {path:?}: expected a string value, found {found}")]
    UnexpectedValue { path: String, found: String },
}

pub type Result<T> = std::result::Result<T, Error>;
