use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{
    manifest::ManifestAccessor,
    runtime::Runtime,
    store::{LocalStore, validate_name},
};

use super::paths::project_root;

/// Remove a package from the store and from the manifest's dependencies
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn uninstall<R: Runtime>(
    runtime: R,
    name: &str,
    project_root_arg: Option<PathBuf>,
) -> Result<()> {
    let root = project_root(&runtime, project_root_arg)?;
    validate_name(name)?;
    let store = LocalStore::new(&runtime, &root);

    if !store.contains(name) {
        anyhow::bail!("Package '{}' not found in node_modules.", name);
    }

    store.remove(name)?;
    println!("Successfully uninstalled {}.", name);

    let accessor = ManifestAccessor::new(&runtime, &root);
    if let Some(manifest) = accessor.load()? {
        let (manifest, removed) = manifest.remove_dependency(name);
        if removed {
            accessor.save(&manifest)?;
            println!("Removed {} from package.json dependencies.", name);
        } else {
            debug!("{} was not listed in dependencies", name);
        }
    }

    Ok(())
}
