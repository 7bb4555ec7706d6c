//! Project-scoped package store.
//!
//! Layout: `<project>/node_modules/<name>/package.json`, where the file holds
//! the registry's metadata record for the installed version. Scoped names
//! (`@scope/pkg`) nest one level deeper.

use log::debug;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

use crate::error::StoreError;
use crate::runtime::{Runtime, write_atomic};

/// Name of the store root directory inside a project.
pub const STORE_DIR: &str = "node_modules";

/// Name of the metadata file inside each package directory.
pub const METADATA_FILE: &str = "package.json";

/// Check that `name` names a directory inside the store: one plain path
/// component, or `@scope/name`.
///
/// Absolute paths, `.` and `..` segments and empty segments are rejected, so a
/// valid name can never address anything outside the store root.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let segments: Vec<&str> = name.split('/').collect();
    let shape_ok = match segments.as_slice() {
        [single] => !single.starts_with('@'),
        [scope, _] => scope.len() > 1 && scope.starts_with('@'),
        _ => false,
    };

    if shape_ok && segments.iter().all(|s| is_plain_component(s)) {
        Ok(())
    } else {
        Err(StoreError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn is_plain_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) => c.to_str() == Some(segment),
        _ => false,
    }
}

pub struct LocalStore<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> LocalStore<'a, R> {
    /// Create a store rooted at `<project_root>/node_modules`.
    pub fn new(runtime: &'a R, project_root: &Path) -> Self {
        Self {
            runtime,
            root: project_root.join(STORE_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: `<root>/<name>`
    ///
    /// `name` is joined as given; check it with [`validate_name`] first.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns: `<root>/<name>/package.json`
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.package_dir(name).join(METADATA_FILE)
    }

    /// Create the store root if it does not exist yet.
    #[tracing::instrument(skip(self))]
    pub fn ensure_root(&self) -> Result<(), StoreError> {
        if self.runtime.is_dir(&self.root) {
            return Ok(());
        }
        debug!("Creating store root {:?}", self.root);
        self.runtime
            .create_dir_all(&self.root)
            .map_err(|source| StoreError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Write `metadata` into the package's directory, replacing whatever was there.
    ///
    /// Returns the path of the written metadata file.
    #[tracing::instrument(skip(self, metadata))]
    pub fn persist(&self, name: &str, metadata: &Value) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        let package_dir = self.package_dir(name);
        if !self.runtime.is_dir(&package_dir) {
            self.runtime
                .create_dir_all(&package_dir)
                .map_err(|source| StoreError::CreateDir {
                    path: package_dir.clone(),
                    source,
                })?;
        }

        let content =
            serde_json::to_string_pretty(metadata).map_err(|source| StoreError::Serialize {
                name: name.to_string(),
                source,
            })?;

        let metadata_path = self.metadata_path(name);
        write_atomic(self.runtime, &metadata_path, content.as_bytes()).map_err(|source| {
            StoreError::Write {
                path: metadata_path.clone(),
                source,
            }
        })?;

        debug!("Persisted metadata for {} to {:?}", name, metadata_path);
        Ok(metadata_path)
    }

    /// Check if a package has a store entry.
    pub fn contains(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.runtime.is_dir(&self.package_dir(name))
    }

    /// Version recorded in a package's metadata file, if readable.
    pub fn installed_version(&self, name: &str) -> Option<String> {
        validate_name(name).ok()?;
        let content = self
            .runtime
            .read_to_string(&self.metadata_path(name))
            .ok()?;
        let metadata: Value = serde_json::from_str(&content).ok()?;
        metadata
            .get("version")
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Names of all store entries, sorted. Returns an empty list when the root is missing.
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.runtime.is_dir(&self.root) {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in self.read_dir(&self.root)? {
            let Some(name) = file_name(&entry) else {
                continue;
            };
            if name.starts_with('.') || !self.runtime.is_dir(&entry) {
                continue;
            }
            if name.starts_with('@') {
                for scoped in self.read_dir(&entry)? {
                    if let Some(pkg) = file_name(&scoped)
                        && self.runtime.is_dir(&scoped)
                    {
                        names.push(format!("{}/{}", name, pkg));
                    }
                }
            } else {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove a package's store entry and everything in it.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        let package_dir = self.package_dir(name);
        self.runtime
            .remove_dir_all(&package_dir)
            .map_err(|source| StoreError::Remove {
                path: package_dir.clone(),
                source,
            })?;

        // Drop the scope directory once its last package is gone
        if let Some(scope_dir) = package_dir.parent()
            && scope_dir != self.root
            && let Ok(entries) = self.runtime.read_dir(scope_dir)
            && entries.is_empty()
        {
            let _ = self.runtime.remove_dir_all(scope_dir);
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, StoreError> {
        self.runtime
            .read_dir(path)
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
}
