//! Install use case - drives one package at a time through the pipeline.
//!
//! For every target name:
//! - resolve the latest version through the registry
//! - persist its metadata into the local store
//! - optionally record the dependency in the manifest
//!
//! A failure ends that package's pipeline only; the batch always runs to the
//! end of the target list.

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{InstallError, ManifestError};
use crate::manifest::ManifestAccessor;
use crate::registry::{Registry, Resolution};
use crate::runtime::Runtime;
use crate::store::LocalStore;

/// Options for the install use case
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Record each installed package in the manifest's `dependencies`
    pub save: bool,
}

/// Where the target list of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSource {
    /// Names given on the command line
    #[default]
    Explicit,
    /// Keys of the manifest's `dependencies` mapping
    Manifest,
}

/// Why a manifest-mode run had nothing to install.
#[derive(Debug)]
pub enum NothingToInstall {
    NoManifest,
    NoDependencies,
    UnreadableManifest(ManifestError),
}

/// Terminal state of one step of a package's pipeline.
#[derive(Debug)]
pub enum Outcome {
    /// Resolved and persisted; `saved` when the manifest was updated too.
    Installed { version: String, saved: bool },
    /// Non-fatal problem; an `Installed` outcome for the same package follows.
    Warning { message: String },
    Failed { error: InstallError },
}

#[derive(Debug)]
pub struct PackageOutcome {
    pub name: String,
    pub outcome: Outcome,
}

impl PackageOutcome {
    fn installed(name: &str, version: String, saved: bool) -> Self {
        Self {
            name: name.to_string(),
            outcome: Outcome::Installed { version, saved },
        }
    }

    fn warning(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            outcome: Outcome::Warning {
                message: message.into(),
            },
        }
    }

    fn failed(name: &str, error: impl Into<InstallError>) -> Self {
        Self {
            name: name.to_string(),
            outcome: Outcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Installed { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    pub fn message(&self) -> String {
        match &self.outcome {
            Outcome::Installed { version, .. } => format!("installed {}@{}", self.name, version),
            Outcome::Warning { message } => message.clone(),
            Outcome::Failed { error } => error.to_string(),
        }
    }
}

/// Ordered record of everything that happened during a run.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub source: TargetSource,
    /// Set when a manifest-mode run found no targets.
    pub nothing_to_install: Option<NothingToInstall>,
    pub outcomes: Vec<PackageOutcome>,
}

impl InstallReport {
    pub fn installed(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Warning { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Number of packages the run attempted.
    pub fn attempted(&self) -> usize {
        self.installed().count() + self.failures().count()
    }
}

/// Install use case - resolves, persists and records packages one at a time.
pub struct Installer<'a, R: Runtime, G: Registry> {
    registry: &'a G,
    store: LocalStore<'a, R>,
    manifest: ManifestAccessor<'a, R>,
}

impl<'a, R: Runtime, G: Registry> Installer<'a, R, G> {
    pub fn new(runtime: &'a R, registry: &'a G, project_root: &Path) -> Self {
        Self {
            registry,
            store: LocalStore::new(runtime, project_root),
            manifest: ManifestAccessor::new(runtime, project_root),
        }
    }

    pub fn store(&self) -> &LocalStore<'a, R> {
        &self.store
    }

    /// Install `names`, or the manifest's dependencies when `names` is empty.
    pub async fn run(&self, names: &[String], options: &InstallOptions) -> InstallReport {
        self.run_with(names, options, |_| {}).await
    }

    /// Like [`Installer::run`], calling `on_outcome` as each outcome is recorded.
    #[tracing::instrument(skip(self, on_outcome))]
    pub async fn run_with<F>(
        &self,
        names: &[String],
        options: &InstallOptions,
        mut on_outcome: F,
    ) -> InstallReport
    where
        F: FnMut(&PackageOutcome),
    {
        let mut report = InstallReport::default();

        let targets = if names.is_empty() {
            report.source = TargetSource::Manifest;
            match self.manifest_targets() {
                Ok(targets) => targets,
                Err(reason) => {
                    debug!("Nothing to install: {:?}", reason);
                    report.nothing_to_install = Some(reason);
                    return report;
                }
            }
        } else {
            names.to_vec()
        };

        // Strictly sequential: each manifest update must see the previous one on disk
        for name in &targets {
            for outcome in self.install_one(name, options).await {
                on_outcome(&outcome);
                report.outcomes.push(outcome);
            }
        }

        info!(
            "Install finished: {} installed, {} failed",
            report.installed().count(),
            report.failures().count()
        );
        report
    }

    fn manifest_targets(&self) -> Result<Vec<String>, NothingToInstall> {
        let manifest = self
            .manifest
            .load()
            .map_err(NothingToInstall::UnreadableManifest)?
            .ok_or(NothingToInstall::NoManifest)?;

        let names = manifest.dependency_names();
        if names.is_empty() {
            return Err(NothingToInstall::NoDependencies);
        }
        Ok(names)
    }

    /// Run the full pipeline for one package and return what happened, in order.
    async fn install_one(&self, name: &str, options: &InstallOptions) -> Vec<PackageOutcome> {
        let resolution = match self.resolve_and_persist(name).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("Failed to install {}: {}", name, e);
                return vec![PackageOutcome::failed(name, e)];
            }
        };

        let mut outcomes = Vec::new();
        let mut saved = false;

        if options.save {
            match self.save_dependency(name, &resolution.version) {
                Ok(true) => saved = true,
                Ok(false) => {
                    outcomes.push(PackageOutcome::warning(
                        name,
                        "cannot save dependency: no manifest found",
                    ));
                }
                Err(e) => {
                    // The store entry stays in place
                    warn!("Failed to save {} to manifest: {}", name, e);
                    outcomes.push(PackageOutcome::failed(name, e));
                    return outcomes;
                }
            }
        }

        outcomes.push(PackageOutcome::installed(name, resolution.version, saved));
        outcomes
    }

    async fn resolve_and_persist(&self, name: &str) -> Result<Resolution, InstallError> {
        if !name.is_empty() {
            // Reject names the store could not hold before asking the registry
            crate::store::validate_name(name)?;
        }
        let resolution = self.registry.resolve(name).await?;
        debug!("Installing {}@{}...", name, resolution.version);

        self.store.ensure_root()?;
        self.store.persist(name, &resolution.metadata)?;
        Ok(resolution)
    }

    /// Re-read the manifest from disk, add the dependency and write it back.
    ///
    /// Returns `Ok(false)` when there is no manifest; none is created.
    fn save_dependency(&self, name: &str, version: &str) -> Result<bool, ManifestError> {
        let Some(manifest) = self.manifest.load()? else {
            return Ok(false);
        };
        self.manifest
            .save(&manifest.add_dependency(name, version))?;
        debug!("Saved {}@^{} to {:?}", name, version, self.manifest.path());
        Ok(true)
    }
}
