//! Application layer - use cases that coordinate the registry, the store and
//! the manifest on behalf of the CLI.

mod install;

pub use install::{
    InstallOptions, InstallReport, Installer, NothingToInstall, Outcome, PackageOutcome,
    TargetSource,
};
