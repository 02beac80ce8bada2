use super::paths::{expand_home, unique_paths, NamePattern};
use super::{PathSpec, ResultSender, SearchResult, Store, StoreKind};
use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};
use async_trait::async_trait;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info_span, warn, Span};

/// Kubeconfig store backed by local directories and files
pub struct FilesystemStore {
    pattern: NamePattern,
    unsorted: bool,
    home_dir: PathBuf,
    directories: Vec<PathBuf>,
    files: Vec<PathBuf>,
    span: Span,
}

impl FilesystemStore {
    /// Create a new filesystem store; paths are set by `validate_paths`
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            pattern: NamePattern::new(&config.kubeconfig_name)?,
            unsorted: config.unsorted,
            home_dir: config.home_dir.clone(),
            directories: Vec::new(),
            files: Vec::new(),
            span: info_span!("store", store = %StoreKind::Filesystem),
        })
    }

    /// Validated directories that will be walked
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Validated files that are emitted as-is
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[async_trait]
impl Store for FilesystemStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Filesystem
    }

    fn span(&self) -> &Span {
        &self.span
    }

    async fn validate_paths(&mut self, specs: &[PathSpec]) -> Result<()> {
        let configured = unique_paths(specs, StoreKind::Filesystem);
        let mut resolved = HashSet::new();
        let mut directories = Vec::new();
        let mut files = Vec::new();

        for path in &configured {
            let expanded = expand_home(path, &self.home_dir);
            if !resolved.insert(expanded.clone()) {
                continue;
            }

            let metadata = match tokio::fs::metadata(&expanded).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(Error::PathNotFound {
                        path: path.to_string(),
                    });
                }
                Err(source) => {
                    return Err(Error::PathUnreadable {
                        path: path.to_string(),
                        source,
                    });
                }
            };

            if metadata.is_dir() {
                directories.push(expanded);
            } else {
                files.push(expanded);
            }
        }

        if directories.is_empty() && files.is_empty() {
            return Err(Error::NoReachablePaths {
                kind: StoreKind::Filesystem,
                configured: specs.len(),
            });
        }

        debug!(
            parent: &self.span,
            directories = directories.len(),
            files = files.len(),
            "validated kubeconfig paths"
        );
        self.directories = directories;
        self.files = files;
        Ok(())
    }

    async fn start_search(&self, out: ResultSender) {
        for file in &self.files {
            let location = file.to_string_lossy().into_owned();
            if out
                .send(SearchResult::found(StoreKind::Filesystem, location))
                .await
                .is_err()
            {
                return;
            }
        }

        let mut walks = JoinSet::new();
        for root in &self.directories {
            let root = root.clone();
            let pattern = self.pattern.clone();
            let unsorted = self.unsorted;
            let out = out.clone();
            let span = self.span.clone();
            walks.spawn_blocking(move || {
                let _enter = span.enter();
                walk_directory(&root, &pattern, unsorted, &out)
            });
        }

        while let Some(joined) = walks.join_next().await {
            if let Err(e) = joined {
                warn!(parent: &self.span, "directory walk task failed: {}", e);
            }
        }
    }

    async fn fetch_by_path(&self, location: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(location).await?)
    }
}

/// Walk one root, sending every file whose base name matches `pattern`.
///
/// The first error aborts this root and is reported as a single result.
fn walk_directory(root: &Path, pattern: &NamePattern, unsorted: bool, out: &ResultSender) {
    debug!("searching directory {}", root.display());

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false);
    if !unsorted {
        builder.sort_by_file_name(|a, b| a.cmp(b));
    }

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                let error = Error::Walk {
                    root: root.to_path_buf(),
                    message: err.to_string(),
                };
                let _ = out.blocking_send(SearchResult::failed(StoreKind::Filesystem, error));
                return;
            }
        };

        if entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }

        let matched = entry
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));

        if matched {
            let location = entry.path().to_string_lossy().into_owned();
            if out
                .blocking_send(SearchResult::found(StoreKind::Filesystem, location))
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn store_for(home: &Path, name: &str) -> FilesystemStore {
        let config = SearchConfig::new(Some(home.to_path_buf()))
            .unwrap()
            .with_kubeconfig_name(name);
        FilesystemStore::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_validate_splits_files_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("clusters");
        fs::create_dir_all(&dir).unwrap();
        let file = temp_dir.path().join("single.yaml");
        fs::write(&file, "apiVersion: v1").unwrap();

        let mut store = store_for(temp_dir.path(), "config");
        store
            .validate_paths(&[
                PathSpec::filesystem(dir.to_string_lossy()),
                PathSpec::filesystem(file.to_string_lossy()),
                PathSpec::vault("secret/ignored"),
            ])
            .await
            .unwrap();

        assert_eq!(store.directories(), &[dir]);
        assert_eq!(store.files(), &[file]);
    }

    #[tokio::test]
    async fn test_validate_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let mut store = store_for(temp_dir.path(), "config");
        let err = store
            .validate_paths(&[PathSpec::filesystem(missing.to_string_lossy())])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PathNotFound { ref path } if path.ends_with("missing")));
    }

    #[tokio::test]
    async fn test_validate_no_filesystem_specs() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_for(temp_dir.path(), "config");
        let err = store
            .validate_paths(&[PathSpec::vault("secret/a"), PathSpec::vault("secret/b")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NoReachablePaths {
                kind: StoreKind::Filesystem,
                configured: 2
            }
        ));
        assert_eq!(
            err.to_string(),
            "none of the 2 specified kubeconfig path(s) exist for the filesystem store"
        );
    }

    #[tokio::test]
    async fn test_walk_matches_base_name_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(root.join("config").join("other"), "x").unwrap();
        fs::write(root.join("config").join("config"), "x").unwrap();

        let pattern = NamePattern::new("config").unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        tokio::task::spawn_blocking(move || walk_directory(&root, &pattern, false, &tx))
            .await
            .unwrap();

        let mut locations = Vec::new();
        while let Some(result) = rx.recv().await {
            locations.push(result.location().unwrap().to_string());
        }
        assert_eq!(locations.len(), 1);
        assert!(locations[0].ends_with("config/config"));
    }
}
