#![allow(dead_code)]

use async_trait::async_trait;
use kubestore::{ClientError, SecretValue, VaultClient};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory Vault with explicit listings, secrets and failing paths
#[derive(Default)]
pub struct MemoryVault {
    listings: HashMap<String, Vec<String>>,
    secrets: HashMap<String, HashMap<String, SecretValue>>,
    failing: HashSet<String>,
    listed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, path: &str, entries: &[&str]) -> Self {
        self.listings.insert(
            path.to_string(),
            entries.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    pub fn with_secret(mut self, path: &str, entries: &[(&str, SecretValue)]) -> Self {
        self.secrets.insert(
            path.to_string(),
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        self
    }

    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Paths passed to `list`, in call order
    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VaultClient for MemoryVault {
    async fn list(&self, path: &str) -> Result<Option<Vec<String>>, ClientError> {
        self.listed.lock().unwrap().push(path.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(path) {
            return Err(ClientError::new(format!("permission denied on {}", path)));
        }
        Ok(self.listings.get(path).cloned())
    }

    async fn read(&self, path: &str) -> Result<Option<HashMap<String, SecretValue>>, ClientError> {
        if self.failing.contains(path) {
            return Err(ClientError::new(format!("permission denied on {}", path)));
        }
        Ok(self.secrets.get(path).cloned())
    }
}

pub fn text(value: &str) -> SecretValue {
    SecretValue::String(value.to_string())
}
