//! Project manifest (`package.json`) handling.
//!
//! The manifest is kept as the JSON object it was read from. Only the
//! `dependencies` entry is ever changed, in place, so a rewrite keeps every
//! other key, its value and its position.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::runtime::{Runtime, write_atomic};

/// File name of the manifest at the project root.
pub const MANIFEST_FILE: &str = "package.json";

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Manifest {
    document: Map<String, Value>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::default()
            .with_field("name", name.into())
            .with_field("version", version.into())
    }

    /// Set a top-level field. An existing key keeps its position.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.document.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version").and_then(Value::as_str)
    }

    /// The `dependencies` mapping, if present and an object.
    pub fn dependencies(&self) -> Option<&Map<String, Value>> {
        self.get(DEPENDENCIES).and_then(Value::as_object)
    }

    /// Names in the `dependencies` mapping, in file order.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies()
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Record `name` as a dependency on `^<version>`, replacing any existing range.
    ///
    /// `version` is not validated. A missing or non-object `dependencies`
    /// entry becomes a new mapping; an existing entry keeps its position.
    pub fn add_dependency(mut self, name: &str, version: &str) -> Self {
        let deps = self
            .document
            .entry(DEPENDENCIES)
            .or_insert_with(|| Value::Object(Map::new()));
        if !deps.is_object() {
            *deps = Value::Object(Map::new());
        }
        if let Value::Object(deps) = deps {
            deps.insert(name.to_string(), Value::String(format!("^{}", version)));
        }
        self
    }

    /// Drop `name` from `dependencies`. The flag reports whether it was present.
    pub fn remove_dependency(mut self, name: &str) -> (Self, bool) {
        let removed = self
            .document
            .get_mut(DEPENDENCIES)
            .and_then(Value::as_object_mut)
            .and_then(|deps| deps.shift_remove(name))
            .is_some();
        (self, removed)
    }

    /// `dependencies` followed by `devDependencies`, as (name, range) pairs.
    /// A name present in both is reported once with its dev range.
    pub fn all_dependencies(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();
        let sources = [DEPENDENCIES, DEV_DEPENDENCIES]
            .map(|key| self.get(key).and_then(Value::as_object));
        for deps in sources.into_iter().flatten() {
            for (name, range) in deps {
                let range = match range {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match merged.iter_mut().find(|(n, _)| n == name) {
                    Some(entry) => entry.1 = range,
                    None => merged.push((name.clone(), range)),
                }
            }
        }
        merged
    }
}

/// Reads and writes the manifest file of one project.
pub struct ManifestAccessor<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> ManifestAccessor<'a, R> {
    pub fn new(runtime: &'a R, project_root: &Path) -> Self {
        Self {
            runtime,
            path: project_root.join(MANIFEST_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    /// Load the manifest.
    ///
    /// Returns `None` if the project has no manifest.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<Option<Manifest>, ManifestError> {
        if !self.exists() {
            debug!("No manifest at {:?}", self.path);
            return Ok(None);
        }

        let content =
            self.runtime
                .read_to_string(&self.path)
                .map_err(|source| ManifestError::Read {
                    path: self.path.clone(),
                    source,
                })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ManifestError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Write a manifest for a project that has none yet.
    #[tracing::instrument(skip(self, manifest))]
    pub fn create(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        if self.exists() {
            return Err(ManifestError::AlreadyExists {
                path: self.path.clone(),
            });
        }
        self.save(manifest)
    }

    /// Replace the manifest file with `manifest`, two-space indented.
    #[tracing::instrument(skip(self, manifest))]
    pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let mut content =
            serde_json::to_string_pretty(manifest).map_err(ManifestError::Serialize)?;
        content.push('\n');

        write_atomic(self.runtime, &self.path, content.as_bytes()).map_err(|source| {
            ManifestError::Write {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!("Saved manifest to {:?}", self.path);
        Ok(())
    }
}
