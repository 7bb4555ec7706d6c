use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use std::path::PathBuf;

use crate::{
    registry::{NpmRegistry, Registry},
    runtime::Runtime,
};

use super::paths::project_root;

/// Environment variable holding a bearer token for the registry.
pub const TOKEN_ENV: &str = "XND_TOKEN";

pub struct Config<R: Runtime, G: Registry> {
    pub runtime: R,
    pub registry: G,
    pub project_root: PathBuf,
}

impl<R: Runtime> Config<R, NpmRegistry> {
    pub fn new(
        runtime: R,
        project_root_arg: Option<PathBuf>,
        registry_url: Option<String>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var(TOKEN_ENV)
            && !token.is_empty()
        {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using {} for registry authentication", TOKEN_ENV);
        }

        let client = Client::builder()
            .user_agent("xnd-cli")
            .default_headers(headers)
            .build()?;

        let registry = NpmRegistry::new(client, registry_url);
        let project_root = project_root(&runtime, project_root_arg)?;

        Ok(Self {
            runtime,
            registry,
            project_root,
        })
    }
}
