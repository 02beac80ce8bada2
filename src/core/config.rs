use super::error::{Error, Result};
use std::path::PathBuf;

/// Default glob for kubeconfig file and secret key names
pub const DEFAULT_KUBECONFIG_NAME: &str = "config";

/// Configuration shared by all stores for one run
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Glob pattern matched against file base names and secret key names
    pub kubeconfig_name: String,
    /// Skip lexical ordering during directory walks
    pub unsorted: bool,
    /// Home directory used to expand `~` in configured paths
    pub home_dir: PathBuf,
    /// Upper bound on outstanding Vault list calls
    pub max_concurrent_requests: usize,
    /// Capacity of the shared result queue
    pub channel_capacity: usize,
}

impl SearchConfig {
    /// Get the current user's home directory
    pub fn default_home_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
    }

    /// Create a new configuration, resolving the home directory once
    pub fn new(home_dir: Option<PathBuf>) -> Result<Self> {
        let home_dir = match home_dir {
            Some(dir) => dir,
            None => Self::default_home_dir()?,
        };

        Ok(Self {
            kubeconfig_name: DEFAULT_KUBECONFIG_NAME.to_string(),
            unsorted: false,
            home_dir,
            max_concurrent_requests: 16,
            channel_capacity: 128,
        })
    }

    pub fn with_kubeconfig_name(mut self, name: impl Into<String>) -> Self {
        self.kubeconfig_name = name.into();
        self
    }

    pub fn with_unsorted(mut self, unsorted: bool) -> Self {
        self.unsorted = unsorted;
        self
    }

    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::new(Some(PathBuf::from("/home/tester"))).unwrap();
        assert_eq!(config.kubeconfig_name, "config");
        assert!(!config.unsorted);
        assert_eq!(config.home_dir, PathBuf::from("/home/tester"));
    }

    #[test]
    fn test_limits_never_zero() {
        let config = SearchConfig::new(Some(PathBuf::from("/home/tester")))
            .unwrap()
            .with_max_concurrent_requests(0)
            .with_channel_capacity(0);
        assert_eq!(config.max_concurrent_requests, 1);
        assert_eq!(config.channel_capacity, 1);
    }
}
