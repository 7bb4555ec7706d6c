use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ResolutionError;

use super::Resolution;

/// The subset of a registry package document needed for resolution.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PackageDocument {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: DistTags,
    #[serde(default)]
    pub versions: Map<String, Value>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DistTags {
    pub latest: Option<String>,
}

impl PackageDocument {
    /// Pick the `latest` dist-tag and take its version record out of the document.
    pub fn into_resolution(mut self, name: &str) -> Result<Resolution, ResolutionError> {
        let version = self
            .dist_tags
            .latest
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ResolutionError::MissingLatest {
                name: name.to_string(),
            })?;

        let metadata =
            self.versions
                .remove(&version)
                .ok_or_else(|| ResolutionError::MissingVersion {
                    name: name.to_string(),
                    version: version.clone(),
                })?;

        Ok(Resolution {
            name: name.to_string(),
            version,
            metadata,
        })
    }
}
