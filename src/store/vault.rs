//! Vault-backed kubeconfig store.
//!
//! Secret trees are walked with `list`: entries ending in `/` are subtrees,
//! anything else is a leaf secret. Every leaf is reported as a location; the
//! kubeconfig name is only checked when the secret is read back.

use super::paths::{unique_paths, NamePattern};
use super::{PathSpec, ResultSender, SearchResult, Store, StoreKind};
use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Span};

/// Failure reported by a Vault client
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value stored under one key of a secret
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    String(String),
    List(Vec<SecretValue>),
    /// Any other shape, described by its type name
    Other(String),
}

impl SecretValue {
    fn describe(&self) -> String {
        match self {
            SecretValue::String(_) => "string".to_string(),
            SecretValue::List(_) => "list".to_string(),
            SecretValue::Other(kind) => kind.clone(),
        }
    }
}

/// Listing and reading capability of a Vault server.
///
/// Transport and authentication live behind this trait.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Entry names directly under `path`; subtrees end with `/`.
    /// `Ok(None)` means nothing exists at `path`.
    async fn list(&self, path: &str) -> std::result::Result<Option<Vec<String>>, ClientError>;

    /// Key/value data of the secret at `path`, `Ok(None)` if there is none.
    async fn read(
        &self,
        path: &str,
    ) -> std::result::Result<Option<HashMap<String, SecretValue>>, ClientError>;
}

/// Kubeconfig store backed by Vault secret trees
pub struct VaultStore {
    client: Arc<dyn VaultClient>,
    pattern: NamePattern,
    limiter: Arc<Semaphore>,
    roots: Vec<String>,
    span: Span,
}

impl VaultStore {
    pub fn new(config: &SearchConfig, client: Arc<dyn VaultClient>) -> Result<Self> {
        Ok(Self {
            client,
            pattern: NamePattern::new(&config.kubeconfig_name)?,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            roots: Vec::new(),
            span: info_span!("store", store = %StoreKind::Vault),
        })
    }

    /// Validated secret-tree roots
    pub fn roots(&self) -> &[String] {
        &self.roots
    }
}

#[async_trait]
impl Store for VaultStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Vault
    }

    fn span(&self) -> &Span {
        &self.span
    }

    async fn validate_paths(&mut self, specs: &[PathSpec]) -> Result<()> {
        let configured = unique_paths(specs, StoreKind::Vault);
        if configured.is_empty() {
            return Err(Error::NoReachablePaths {
                kind: StoreKind::Vault,
                configured: specs.len(),
            });
        }

        let mut roots = Vec::with_capacity(configured.len());
        for path in configured {
            self.client
                .read(path)
                .await
                .map_err(|e| Error::Vault {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
            roots.push(path.to_string());
        }

        debug!(parent: &self.span, roots = roots.len(), "validated vault paths");
        self.roots = roots;
        Ok(())
    }

    async fn start_search(&self, out: ResultSender) {
        let mut traversals = JoinSet::new();
        for root in &self.roots {
            debug!(parent: &self.span, "discovering secrets from vault under path {:?}", root);
            traversals.spawn(self.traverse(root.clone(), out.clone()));
        }

        // Each traversal hands back the subtrees it found, so children at
        // any depth are spawned and joined here.
        while let Some(joined) = traversals.join_next().await {
            match joined {
                Ok(subtrees) => {
                    for subtree in subtrees {
                        traversals.spawn(self.traverse(subtree, out.clone()));
                    }
                }
                Err(e) => warn!(parent: &self.span, "vault traversal task failed: {}", e),
            }
        }
    }

    async fn fetch_by_path(&self, location: &str) -> Result<Vec<u8>> {
        debug!(parent: &self.span, "vault: getting secret for path {:?}", location);

        let data = self
            .client
            .read(location)
            .await
            .map_err(|e| Error::Vault {
                path: location.to_string(),
                message: format!("could not read secret: {}", e),
            })?
            .filter(|data| !data.is_empty())
            .ok_or_else(|| Error::NotFound {
                path: location.to_string(),
            })?;

        if data.len() != 1 {
            return Err(Error::AmbiguousSecret {
                path: location.to_string(),
                entries: data.len(),
            });
        }

        let Some((key, value)) = data.into_iter().next() else {
            return Err(Error::NotFound {
                path: location.to_string(),
            });
        };

        if !self.pattern.matches(&key) {
            return Err(Error::NameMismatch {
                path: location.to_string(),
                key,
                pattern: self.pattern.as_str().to_string(),
            });
        }

        match value {
            SecretValue::String(text) => Ok(decode_secret_text(text)),
            other => Err(Error::UnexpectedValue {
                path: location.to_string(),
                found: other.describe(),
            }),
        }
    }
}

impl VaultStore {
    /// Build the task that lists one path; it resolves to the subtrees to visit next.
    fn traverse(
        &self,
        path: String,
        out: ResultSender,
    ) -> impl std::future::Future<Output = Vec<String>> + Send + 'static {
        let client = Arc::clone(&self.client);
        let limiter = Arc::clone(&self.limiter);
        let span = self.span.clone();

        async move {
            let listed = match limiter.acquire_owned().await {
                Ok(_permit) => client.list(&path).await,
                Err(_) => return Vec::new(),
            };

            let entries = match listed {
                Ok(Some(entries)) if !entries.is_empty() => entries,
                Ok(_) => {
                    info!(parent: &span, "No secrets found for path {}", path);
                    return Vec::new();
                }
                Err(e) => {
                    let error = Error::Vault {
                        path: path.clone(),
                        message: e.to_string(),
                    };
                    let _ = out.send(SearchResult::failed(StoreKind::Vault, error)).await;
                    return Vec::new();
                }
            };

            let mut subtrees = Vec::new();
            for entry in entries {
                let entry_path = join_secret_path(&path, &entry);
                if entry.ends_with('/') {
                    subtrees.push(entry_path);
                } else if !entry.is_empty() {
                    let found = SearchResult::found(StoreKind::Vault, entry_path);
                    if out.send(found).await.is_err() {
                        return Vec::new();
                    }
                }
            }
            subtrees
        }
    }
}

fn join_secret_path(parent: &str, entry: &str) -> String {
    let parent = parent.strip_suffix('/').unwrap_or(parent);
    format!("{}/{}", parent, entry)
}

/// Secret text is returned base64-decoded when it decodes cleanly, raw otherwise.
///
/// Line breaks are skipped while decoding, so wrapped `base64` output is
/// accepted. Plain text that happens to be valid base64 is decoded as well.
pub fn decode_secret_text(text: String) -> Vec<u8> {
    let unwrapped: Vec<u8> = text
        .bytes()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();
    match base64::engine::general_purpose::STANDARD.decode(&unwrapped) {
        Ok(decoded) => decoded,
        Err(_) => text.into_bytes(),
    }
}
