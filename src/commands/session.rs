use anyhow::Result;

use crate::{runtime::Runtime, session::SessionStore};

/// Record a local session for the given username.
#[tracing::instrument(skip(runtime))]
pub fn login<R: Runtime>(runtime: R) -> Result<()> {
    let store = SessionStore::new(&runtime)?;
    let username = runtime.prompt("Username:", "")?;
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username must not be empty");
    }

    let session = store.login(username)?;
    println!("Logged in as {}", session.username);
    Ok(())
}

#[tracing::instrument(skip(runtime))]
pub fn logout<R: Runtime>(runtime: R) -> Result<()> {
    SessionStore::new(&runtime)?.logout()?;
    println!("Logged out successfully");
    Ok(())
}

#[tracing::instrument(skip(runtime))]
pub fn whoami<R: Runtime>(runtime: R) -> Result<()> {
    match SessionStore::new(&runtime)?.current()? {
        Some(session) => println!("{}", session.username),
        None => println!("Not logged in"),
    }
    Ok(())
}
