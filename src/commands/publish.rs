use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{
    manifest::ManifestAccessor,
    runtime::Runtime,
    session::{Session, SessionStore, Tier},
};

use super::paths::project_root;

/// Check that the current session may publish.
fn authorize_publish(session: Option<&Session>) -> Result<&Session> {
    let Some(session) = session else {
        anyhow::bail!("You must be logged in to publish packages.");
    };
    if !session.tier.can_publish() {
        anyhow::bail!("You do not have permission to publish packages.");
    }
    Ok(session)
}

fn authorize_set_tier(session: Option<&Session>) -> Result<()> {
    match session {
        Some(session) if session.tier.can_set_tiers() => Ok(()),
        _ => anyhow::bail!("You do not have permission to set user tiers."),
    }
}

/// Announce the project's package for publication. Nothing is uploaded.
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn publish<R: Runtime>(runtime: R, project_root_arg: Option<PathBuf>) -> Result<()> {
    let session = SessionStore::new(&runtime)?.current()?;
    let session = authorize_publish(session.as_ref())?;
    debug!("Publishing as {} ({})", session.username, session.tier);

    let root = project_root(&runtime, project_root_arg)?;
    let Some(manifest) = ManifestAccessor::new(&runtime, &root).load()? else {
        anyhow::bail!("No package.json found in the current directory.");
    };

    println!(
        "Publishing {}@{}...",
        manifest.name().unwrap_or_default(),
        manifest.version().unwrap_or_default()
    );
    println!("Package published successfully!");
    Ok(())
}

/// Change another user's tier. Only a creator may do this.
#[tracing::instrument(skip(runtime))]
pub fn set_tier<R: Runtime>(runtime: R, username: &str, tier: &str) -> Result<()> {
    let session = SessionStore::new(&runtime)?.current()?;
    authorize_set_tier(session.as_ref())?;

    let tier: Tier = tier.parse()?;
    println!("Setting tier for {} to {}...", username, tier);
    println!("User tier updated successfully!");
    Ok(())
}
