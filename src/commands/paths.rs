use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Resolve the project root: the explicit path if given, else the working directory.
#[tracing::instrument(skip(runtime))]
pub fn project_root<R: Runtime>(runtime: &R, explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit {
        Some(path) => path,
        None => runtime.current_dir()?,
    };
    debug!("Using project root: {}", root.display());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_explicit_root_wins() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().never();

        let root = project_root(&runtime, Some(PathBuf::from("/custom"))).unwrap();
        assert_eq!(root, PathBuf::from("/custom"));
    }

    #[test]
    fn test_defaults_to_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/home/user/app")));

        let root = project_root(&runtime, None).unwrap();
        assert_eq!(root, PathBuf::from("/home/user/app"));
    }
}
