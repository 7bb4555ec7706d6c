use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::{
    runtime::Runtime,
    store::{LocalStore, validate_name},
};

use super::paths::project_root;

/// Show where an installed package lives so it can be edited in place
#[tracing::instrument(skip(runtime, project_root_arg))]
pub fn edit<R: Runtime>(runtime: R, name: &str, project_root_arg: Option<PathBuf>) -> Result<()> {
    let root = project_root(&runtime, project_root_arg)?;
    validate_name(name)?;
    let store = LocalStore::new(&runtime, &root);

    if !store.contains(name) {
        anyhow::bail!("Package '{}' not found in node_modules.", name);
    }

    let package_dir = store.package_dir(name);
    let editor = runtime.env_var("EDITOR").ok().filter(|e| !e.is_empty());
    println!("Package '{}' found at: {}", name, package_dir.display());
    for line in editor_hints(&package_dir, editor.as_deref()) {
        println!("{}", line);
    }
    Ok(())
}

fn editor_hints(package_dir: &Path, editor: Option<&str>) -> Vec<String> {
    let path = package_dir.display();
    let mut lines = vec![
        "You can now modify the files in this directory using your preferred text editor.".into(),
    ];
    match editor {
        Some(editor) => lines.push(format!("Example ($EDITOR): {} {}", editor, path)),
        None => {
            lines.push(format!("Example (VS Code): code {}", path));
            lines.push(format!("Example (Sublime Text): subl {}", path));
            lines.push(format!("Example (Windows Notepad): notepad {}", path));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_editor_hints_prefer_editor_variable() {
        let hints = editor_hints(Path::new("/p/node_modules/x"), Some("vim"));
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[1], "Example ($EDITOR): vim /p/node_modules/x");
    }

    #[test]
    fn test_editor_hints_fallback() {
        let hints = editor_hints(Path::new("/p/node_modules/x"), None);
        assert_eq!(hints.len(), 4);
        assert!(hints[1].starts_with("Example (VS Code): code"));
    }

    #[test]
    fn test_edit_installed_package() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_is_dir()
            .with(eq(PathBuf::from("/project/node_modules/left-pad")))
            .returning(|_| true);
        runtime
            .expect_env_var()
            .with(eq("EDITOR"))
            .returning(|_| Err(std::env::VarError::NotPresent));

        assert!(edit(runtime, "left-pad", Some(PathBuf::from("/project"))).is_ok());
    }

    #[test]
    fn test_edit_missing_package_fails() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_dir().returning(|_| false);

        let err = edit(runtime, "ghost", Some(PathBuf::from("/project"))).unwrap_err();
        assert_eq!(err.to_string(), "Package 'ghost' not found in node_modules.");
    }

    #[test]
    fn test_edit_rejects_absolute_name() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_dir().never();

        let err = edit(runtime, "/etc", Some(PathBuf::from("/project"))).unwrap_err();
        assert_eq!(err.to_string(), "invalid package name '/etc'");
    }
}
