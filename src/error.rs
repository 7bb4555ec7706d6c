//! Error types for the install pipeline.
//!
//! Each collaborator of the installer has its own error enum. None of them is
//! fatal to a batch: the installer turns them into per-package outcomes.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a package name into a concrete version.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("package name must not be empty")]
    EmptyName,

    /// Transport-level failure: connection refused, DNS, TLS, ...
    #[error("registry request for '{name}' failed: {source}")]
    Request {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("package '{name}' not found in registry")]
    NotFound { name: String },

    #[error("registry responded with HTTP {status} for '{name}'")]
    Status { name: String, status: u16 },

    #[error("invalid registry document for '{name}': {source}")]
    InvalidDocument {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry document for '{name}' has no 'latest' dist-tag")]
    MissingLatest { name: String },

    #[error("registry document for '{name}' lists no metadata for version {version}")]
    MissingVersion { name: String, version: String },
}

/// Failure to materialize a package into the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {}: {source:#}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write {}: {source:#}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid package name '{name}'")]
    InvalidName { name: String },

    #[error("failed to serialize metadata for '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to remove {}: {source:#}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read store directory {}: {source:#}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure to read or write the project manifest.
///
/// A missing manifest is not an error; see `ManifestAccessor::load`.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source:#}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source:#}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Any failure that can end a single package's install pipeline.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl InstallError {
    /// Short label for the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            InstallError::Resolution(_) => "resolve",
            InstallError::Store(_) => "store",
            InstallError::Manifest(_) => "manifest",
        }
    }
}
