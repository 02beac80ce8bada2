use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};
use crate::store::filesystem::FilesystemStore;
use crate::store::vault::{VaultClient, VaultStore};
use crate::store::{PathSpec, SearchResult, Store, StoreKind};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Validated stores, one per configured backend kind
pub struct StoreSet {
    stores: Vec<Arc<dyn Store>>,
    channel_capacity: usize,
}

impl StoreSet {
    /// Select a store for every kind present in `specs` and validate its paths
    pub async fn from_specs(
        config: &SearchConfig,
        specs: &[PathSpec],
        vault_client: Option<Arc<dyn VaultClient>>,
    ) -> Result<Self> {
        let kinds: BTreeSet<StoreKind> = specs.iter().map(|spec| spec.store).collect();
        if kinds.is_empty() {
            return Err(Error::Config(
                "no kubeconfig paths configured".to_string(),
            ));
        }

        let mut stores: Vec<Arc<dyn Store>> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let mut store: Box<dyn Store> = match kind {
                StoreKind::Filesystem => Box::new(FilesystemStore::new(config)?),
                StoreKind::Vault => {
                    let client = vault_client.clone().ok_or_else(|| {
                        Error::Config(
                            "vault paths are configured but no vault client is available"
                                .to_string(),
                        )
                    })?;
                    Box::new(VaultStore::new(config, client)?)
                }
            };
            store.validate_paths(specs).await?;
            stores.push(Arc::from(store));
        }

        Ok(Self::new(stores, config.channel_capacity))
    }

    /// Wrap stores that have already been validated
    pub fn new(stores: Vec<Arc<dyn Store>>, channel_capacity: usize) -> Self {
        Self {
            stores,
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn kinds(&self) -> Vec<StoreKind> {
        self.stores.iter().map(|store| store.kind()).collect()
    }

    pub fn get(&self, kind: StoreKind) -> Option<&Arc<dyn Store>> {
        self.stores.iter().find(|store| store.kind() == kind)
    }

    /// Read a location back through the store that produced it
    pub async fn fetch(&self, kind: StoreKind, location: &str) -> Result<Vec<u8>> {
        let store = self
            .get(kind)
            .ok_or_else(|| Error::Config(format!("no {} store is configured", kind)))?;
        store.fetch_by_path(location).await
    }
}

/// Start every store's search and return the shared result stream.
///
/// Each store runs in its own task. A supervisor joins all of them and then
/// drops the last sender, so the receiver yields `None` exactly when every
/// store has finished.
pub fn search_all(set: &StoreSet) -> mpsc::Receiver<SearchResult> {
    let (tx, rx) = mpsc::channel(set.channel_capacity);

    let mut searches = JoinSet::new();
    for store in &set.stores {
        let store = Arc::clone(store);
        let tx = tx.clone();
        searches.spawn(async move {
            let kind = store.kind();
            store.start_search(tx).await;
            kind
        });
    }

    tokio::spawn(async move {
        while let Some(joined) = searches.join_next().await {
            match joined {
                Ok(kind) => debug!("{} search finished", kind),
                Err(e) => error!("store search task failed: {}", e),
            }
        }
        drop(tx);
    });

    rx
}

/// Everything a search produced, split by outcome
#[derive(Debug, Default)]
pub struct Discovery {
    pub locations: Vec<(StoreKind, String)>,
    pub errors: Vec<(StoreKind, Error)>,
}

/// Collect the stream until every producer has finished
pub async fn drain(mut rx: mpsc::Receiver<SearchResult>) -> Discovery {
    let mut discovery = Discovery::default();
    while let Some(result) = rx.recv().await {
        match result {
            SearchResult::Found { store, location } => discovery.locations.push((store, location)),
            SearchResult::Failed { store, error } => discovery.errors.push((store, error)),
        }
    }
    discovery
}
