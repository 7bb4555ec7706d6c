use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::{
    manifest::{Manifest, ManifestAccessor},
    runtime::Runtime,
    store::validate_name,
};

use super::paths::project_root;

const INDEX_JS: &str =
    "// A simple example function\nexport function add(a, b) {\n  return a + b;\n}\n";

/// Scaffold a new package directory below the project root.
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn create<R: Runtime>(runtime: R, name: &str, project_root_arg: Option<PathBuf>) -> Result<()> {
    let root = project_root(&runtime, project_root_arg)?;
    validate_name(name)?;
    println!("Creating new package: {}...", name);

    let package_dir = root.join(name);
    if runtime.exists(&package_dir) {
        anyhow::bail!("Directory '{}' already exists.", name);
    }
    runtime
        .create_dir_all(&package_dir)
        .with_context(|| format!("Failed to create {}", package_dir.display()))?;

    ManifestAccessor::new(&runtime, &package_dir).create(&scaffold_manifest(name))?;
    println!("package.json created.");

    write_file(&runtime, &package_dir.join("index.js"), INDEX_JS)?;
    println!("index.js created with example function.");

    write_file(&runtime, &package_dir.join("README.md"), &format!("# {}\n\n", name))?;
    println!("README.md created.");

    println!("Package '{}' created successfully!", name);
    Ok(())
}

fn write_file<R: Runtime>(runtime: &R, path: &Path, contents: &str) -> Result<()> {
    runtime
        .write(path, contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn scaffold_manifest(name: &str) -> Manifest {
    Manifest::new(name, "1.0.0")
        .with_field("description", format!("A new XND package: {}", name))
        .with_field("main", "index.js")
        .with_field(
            "scripts",
            json!({ "test": "echo \"Error: no test specified\" && exit 1" }),
        )
        .with_field("keywords", json!(["xnd-package", name]))
        .with_field("author", "")
        .with_field("license", "ISC")
        .with_field("repository", json!({ "type": "git", "url": "" }))
        .with_field("bugs", json!({ "url": "" }))
        .with_field("homepage", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn test_create_scaffolds_package() {
        let dir = tempdir().unwrap();
        create(RealRuntime, "widget", Some(dir.path().to_path_buf())).unwrap();

        let package_dir = dir.path().join("widget");
        let manifest: Value = serde_json::from_str(
            &std::fs::read_to_string(package_dir.join("package.json")).unwrap(),
        )
        .unwrap();
        let keys: Vec<&String> = manifest.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "version",
                "description",
                "main",
                "scripts",
                "keywords",
                "author",
                "license",
                "repository",
                "bugs",
                "homepage"
            ]
        );
        assert_eq!(manifest["description"], "A new XND package: widget");
        assert_eq!(manifest["keywords"], json!(["xnd-package", "widget"]));

        assert!(
            std::fs::read_to_string(package_dir.join("index.js"))
                .unwrap()
                .contains("export function add(a, b)")
        );
        assert_eq!(
            std::fs::read_to_string(package_dir.join("README.md")).unwrap(),
            "# widget\n\n"
        );
    }

    #[test]
    fn test_create_existing_directory_fails() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("widget")).unwrap();

        let err = create(RealRuntime, "widget", Some(dir.path().to_path_buf())).unwrap_err();
        assert_eq!(err.to_string(), "Directory 'widget' already exists.");
        assert!(!dir.path().join("widget/package.json").exists());
    }

    #[test]
    fn test_create_rejects_names_outside_project() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let target = outside.path().join("widget");

        for name in [target.to_str().unwrap(), "..", "a/../../widget"] {
            let err = create(RealRuntime, name, Some(dir.path().to_path_buf())).unwrap_err();
            assert!(err.to_string().starts_with("invalid package name"));
        }
        assert!(!target.exists());
    }

    #[test]
    fn test_create_scoped_package() {
        let dir = tempdir().unwrap();
        create(RealRuntime, "@acme/widget", Some(dir.path().to_path_buf())).unwrap();

        let manifest: Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("@acme/widget/package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["name"], "@acme/widget");
    }
}
