//! Package registry access.
//!
//! A registry maps package names to a document listing every published
//! version plus a set of dist-tags. Resolution picks the `latest` tag and
//! returns that version's metadata untouched.

mod client;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolutionError;

pub use client::{DEFAULT_REGISTRY_URL, NpmRegistry};
pub use types::{DistTags, PackageDocument};

/// A package name resolved to its current `latest` version.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub name: String,
    pub version: String,
    /// The registry's record for `version`, kept verbatim.
    pub metadata: Value,
}

/// Looks up packages in a remote registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Resolve `name` to its latest version and that version's metadata.
    ///
    /// One request per call; no retry.
    async fn resolve(&self, name: &str) -> Result<Resolution, ResolutionError>;
}
