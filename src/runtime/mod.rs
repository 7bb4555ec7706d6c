//! Runtime abstraction for system operations.
//!
//! Everything that touches the filesystem, the environment or the terminal
//! goes through [`Runtime`], so the install pipeline can be exercised against
//! a temporary directory or a mock.
//!
//! # Structure
//!
//! - `env` - Environment variables and well-known directories
//! - `fs` - File system operations (read, write, directory)
//! - `user` - User interaction (prompts and confirmations)

mod env;
mod fs;
mod user;

use anyhow::Result;
use async_trait::async_trait;
use std::env as std_env;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir(&self, path: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    // Directories
    fn home_dir(&self) -> Option<PathBuf>;
    fn current_dir(&self) -> Result<PathBuf>;

    // User interaction
    /// Ask a free-form question. An empty answer yields `default`.
    fn prompt(&self, question: &str, default: &str) -> Result<String>;

    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.create_dir_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn prompt(&self, question: &str, default: &str) -> Result<String> {
        self.prompt_impl(question, default)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }
}

/// Write `contents` to a hidden sibling of `path`, then rename it into place.
///
/// Readers see either the old file or the complete new one, never a
/// truncated write.
pub fn write_atomic<R: Runtime + ?Sized>(runtime: &R, path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    let result = runtime
        .write(&tmp, contents)
        .and_then(|()| runtime.rename(&tmp, path));
    if result.is_err() {
        // A failed write may have left a partial temp file behind
        let _ = runtime.remove_file(&tmp);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_temp_sibling_is_hidden_next_to_target() {
        let tmp = temp_sibling(Path::new("/project/package.json"));
        assert_eq!(tmp, PathBuf::from("/project/.package.json.tmp"));
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&runtime, &path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join(".package.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_cleans_up_when_rename_fails() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/project/package.json");
        let tmp = PathBuf::from("/project/.package.json.tmp");

        runtime
            .expect_write()
            .with(eq(tmp.clone()), eq(b"data".to_vec()))
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .returning(|_, _| Err(anyhow::anyhow!("rename failed")));
        runtime
            .expect_remove_file()
            .with(eq(tmp))
            .times(1)
            .returning(|_| Ok(()));

        let result = write_atomic(&runtime, &path, b"data");
        assert!(result.is_err());
    }

    #[test]
    fn test_write_atomic_cleans_up_when_write_fails() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/project/package.json");
        let tmp = PathBuf::from("/project/.package.json.tmp");

        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("no space left on device")));
        runtime.expect_rename().never();
        runtime
            .expect_remove_file()
            .with(eq(tmp))
            .times(1)
            .returning(|_| Ok(()));

        let result = write_atomic(&runtime, &path, b"data");
        assert!(result.is_err());
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file_on_failure() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        // Renaming a file onto a non-empty directory fails
        let path = dir.path().join("package.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        assert!(write_atomic(&runtime, &path, b"data").is_err());
        assert!(!dir.path().join(".package.json.tmp").exists());
    }
}
