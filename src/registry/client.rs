use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::error::ResolutionError;

use super::{PackageDocument, Registry, Resolution};

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Registry client speaking the npm package-document protocol.
pub struct NpmRegistry {
    pub client: Client,
    pub url: String,
}

impl NpmRegistry {
    #[tracing::instrument(skip(client, url))]
    pub fn new(client: Client, url: Option<String>) -> Self {
        let url = url
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self { client, url }
    }

    /// Base URL requests are made against.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Package document URL. The name is appended verbatim.
    pub fn package_url(&self, name: &str) -> String {
        format!("{}/{}", self.url, name)
    }

    async fn fetch_document(&self, name: &str) -> Result<PackageDocument, ResolutionError> {
        let url = self.package_url(name);

        debug!("Fetching package document from {}...", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ResolutionError::Request {
                name: name.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ResolutionError::NotFound {
                    name: name.to_string(),
                });
            }
            s if !s.is_success() => {
                return Err(ResolutionError::Status {
                    name: name.to_string(),
                    status: s.as_u16(),
                });
            }
            _ => {}
        }

        response
            .json::<PackageDocument>()
            .await
            .map_err(|source| ResolutionError::InvalidDocument {
                name: name.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Registry for NpmRegistry {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, name: &str) -> Result<Resolution, ResolutionError> {
        if name.is_empty() {
            return Err(ResolutionError::EmptyName);
        }

        let resolution = self.fetch_document(name).await?.into_resolution(name)?;
        debug!("Resolved {} to {}", name, resolution.version);
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT_PAD: &str = r#"{
        "name": "left-pad",
        "dist-tags": { "latest": "1.3.0" },
        "versions": {
            "1.0.0": { "name": "left-pad", "version": "1.0.0" },
            "1.3.0": {
                "name": "left-pad",
                "version": "1.3.0",
                "dist": { "tarball": "https://example.com/left-pad-1.3.0.tgz" }
            }
        }
    }"#;

    #[test]
    fn test_new_defaults_to_npm_registry() {
        let registry = NpmRegistry::new(Client::new(), None);
        assert_eq!(registry.url(), DEFAULT_REGISTRY_URL);
        assert_eq!(
            registry.package_url("left-pad"),
            "https://registry.npmjs.org/left-pad"
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let registry = NpmRegistry::new(Client::new(), Some("http://localhost:4873/".into()));
        assert_eq!(
            registry.package_url("@scope/pkg"),
            "http://localhost:4873/@scope/pkg"
        );
    }

    #[tokio::test]
    async fn test_resolve_latest() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/left-pad")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LEFT_PAD)
            .create_async()
            .await;

        let registry = NpmRegistry::new(Client::new(), Some(url));
        let resolution = registry.resolve("left-pad").await.unwrap();

        mock.assert_async().await;
        assert_eq!(resolution.name, "left-pad");
        assert_eq!(resolution.version, "1.3.0");
        assert_eq!(
            resolution.metadata["dist"]["tarball"],
            "https://example.com/left-pad-1.3.0.tgz"
        );
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/no-such-package")
            .with_status(404)
            .create_async()
            .await;

        let registry = NpmRegistry::new(Client::new(), Some(url));
        let err = registry.resolve("no-such-package").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_server_error_is_single_attempt() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let registry = NpmRegistry::new(Client::new(), Some(url));
        let err = registry.resolve("flaky").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ResolutionError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let registry = NpmRegistry::new(Client::new(), Some(url));
        let err = registry.resolve("broken").await.unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidDocument { .. }));
    }

    #[tokio::test]
    async fn test_resolve_missing_latest_tag() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/untagged")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "dist-tags": {}, "versions": {} }"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(Client::new(), Some(url));
        let err = registry.resolve("untagged").await.unwrap_err();
        assert!(matches!(err, ResolutionError::MissingLatest { .. }));
    }

    #[tokio::test]
    async fn test_resolve_empty_name_makes_no_request() {
        let registry = NpmRegistry::new(Client::new(), Some("http://127.0.0.1:9".into()));
        let err = registry.resolve("").await.unwrap_err();
        assert!(matches!(err, ResolutionError::EmptyName));
    }

    #[tokio::test]
    async fn test_resolve_unreachable_registry() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let registry = NpmRegistry::new(Client::new(), Some("http://127.0.0.1:9".into()));
        let err = registry.resolve("left-pad").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Request { .. }));
    }
}
