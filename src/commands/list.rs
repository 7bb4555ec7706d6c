use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::{manifest::ManifestAccessor, runtime::Runtime, store::LocalStore};

use super::paths::project_root;

/// List installed packages and declared dependencies
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn list<R: Runtime>(runtime: R, project_root_arg: Option<PathBuf>) -> Result<()> {
    let root = project_root(&runtime, project_root_arg)?;
    for line in listing(&runtime, &root)? {
        println!("{}", line);
    }
    Ok(())
}

fn listing<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<String>> {
    let mut lines = vec!["Installed Packages (in node_modules):".to_string()];

    let store = LocalStore::new(runtime, root);
    if !runtime.is_dir(store.root()) {
        lines.push("  node_modules directory not found.".into());
    } else {
        let names = store.list()?;
        debug!("Found {} installed package(s)", names.len());
        if names.is_empty() {
            lines.push("  No packages installed in node_modules.".into());
        }
        for name in names {
            match store.installed_version(&name) {
                Some(version) => lines.push(format!("  - {}@{}", name, version)),
                None => lines.push(format!("  - {}", name)),
            }
        }
    }

    lines.push(String::new());
    lines.push("Dependencies (from package.json):".into());

    match ManifestAccessor::new(runtime, root).load()? {
        None => lines.push("  package.json not found.".into()),
        Some(manifest) => {
            let deps = manifest.all_dependencies();
            if deps.is_empty() {
                lines.push("  No dependencies listed in package.json.".into());
            }
            for (name, range) in deps {
                lines.push(format!("  - {}@{}", name, range));
            }
        }
    }

    Ok(lines)
}
