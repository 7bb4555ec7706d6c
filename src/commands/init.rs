use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::{
    manifest::{Manifest, ManifestAccessor},
    runtime::Runtime,
};

use super::paths::project_root;

/// Interactively write a new `package.json` at the project root.
///
/// With `yes`, every question takes its default and an existing manifest is
/// overwritten without asking.
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn init<R: Runtime>(runtime: R, project_root_arg: Option<PathBuf>, yes: bool) -> Result<()> {
    let root = project_root(&runtime, project_root_arg)?;
    let accessor = ManifestAccessor::new(&runtime, &root);

    let overwrite = accessor.exists();
    if overwrite
        && !yes
        && !runtime.confirm(&format!(
            "{} already exists. Overwrite?",
            accessor.path().display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let manifest = if yes {
        default_manifest(&root)
    } else {
        ask_manifest(&runtime, &root)?
    };

    if overwrite {
        accessor.save(&manifest)?;
    } else {
        accessor.create(&manifest)?;
    }
    println!("package.json created successfully!");
    Ok(())
}

fn directory_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_manifest(root: &Path) -> Manifest {
    build_manifest(
        directory_name(root),
        "1.0.0".into(),
        String::new(),
        "index.js".into(),
        String::new(),
        "ISC".into(),
    )
}

fn ask_manifest<R: Runtime>(runtime: &R, root: &Path) -> Result<Manifest> {
    let name = runtime.prompt("Package name:", &directory_name(root))?;
    let version = runtime.prompt("Version:", "1.0.0")?;
    let description = runtime.prompt("Description:", "")?;
    let main = runtime.prompt("Entry point:", "index.js")?;
    let author = runtime.prompt("Author:", "")?;
    let license = runtime.prompt("License:", "ISC")?;
    debug!("Initializing {}@{}", name, version);
    Ok(build_manifest(name, version, description, main, author, license))
}

fn build_manifest(
    name: String,
    version: String,
    description: String,
    main: String,
    author: String,
    license: String,
) -> Manifest {
    Manifest::new(name, version)
        .with_field("description", description)
        .with_field("main", main)
        .with_field("author", author)
        .with_field("license", license)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn test_init_with_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("my-app");
        std::fs::create_dir(&root).unwrap();

        init(RealRuntime, Some(root.clone()), true).unwrap();

        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(root.join("package.json")).unwrap())
                .unwrap();
        let keys: Vec<&String> = saved.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["name", "version", "description", "main", "author", "license"]
        );
        assert_eq!(saved["name"], "my-app");
        assert_eq!(saved["version"], "1.0.0");
        assert_eq!(saved["main"], "index.js");
        assert_eq!(saved["license"], "ISC");
    }

    #[test]
    fn test_init_uses_answers() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_prompt()
            .with(eq("Package name:"), eq("project"))
            .returning(|_, _| Ok("widget".into()));
        runtime
            .expect_prompt()
            .with(eq("Author:"), eq(""))
            .returning(|_, _| Ok("Jane".into()));
        runtime
            .expect_prompt()
            .returning(|_, default| Ok(default.to_string()));

        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = written.clone();
        runtime.expect_write().returning(move |_, contents| {
            sink.lock().unwrap().extend_from_slice(contents);
            Ok(())
        });
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("/work/project/.package.json.tmp")),
                eq(PathBuf::from("/work/project/package.json")),
            )
            .returning(|_, _| Ok(()));

        init(runtime, Some(PathBuf::from("/work/project")), false).unwrap();

        let saved: Value = serde_json::from_slice(&written.lock().unwrap()).unwrap();
        assert_eq!(saved["name"], "widget");
        assert_eq!(saved["author"], "Jane");
        assert_eq!(saved["version"], "1.0.0");
        assert_eq!(saved["description"], "");
    }

    #[test]
    fn test_init_yes_overwrites_existing_manifest() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("my-app");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("package.json"), r#"{"name":"old"}"#).unwrap();

        init(RealRuntime, Some(root.clone()), true).unwrap();

        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(root.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(saved["name"], "my-app");
    }

    #[test]
    fn test_init_declined_overwrite_keeps_manifest() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_confirm().returning(|_| Ok(false));
        runtime.expect_prompt().never();
        runtime.expect_write().never();

        init(runtime, Some(PathBuf::from("/work/project")), false).unwrap();
    }
}
