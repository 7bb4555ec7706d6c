use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{
    application::{
        InstallOptions, InstallReport, Installer, NothingToInstall, Outcome, PackageOutcome,
        TargetSource,
    },
    registry::Registry,
    runtime::Runtime,
};

use super::config::Config;

#[tracing::instrument(skip(runtime, project_root, registry_url))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    names: Vec<String>,
    save: bool,
    project_root: Option<PathBuf>,
    registry_url: Option<String>,
) -> Result<()> {
    let config = Config::new(runtime, project_root, registry_url)?;
    run(&names, &InstallOptions { save }, config).await
}

#[tracing::instrument(skip(config))]
pub async fn run<R: Runtime, G: Registry>(
    names: &[String],
    options: &InstallOptions,
    config: Config<R, G>,
) -> Result<()> {
    debug!("Installing {:?} into {:?}", names, config.project_root);

    let installer = Installer::new(&config.runtime, &config.registry, &config.project_root);
    if names.is_empty() {
        println!("Installing dependencies from package.json...");
    }

    let report = installer.run_with(names, options, print_outcome).await;
    summarize(&report)
}

fn print_outcome(outcome: &PackageOutcome) {
    match &outcome.outcome {
        Outcome::Installed { version, saved } => {
            if *saved {
                println!("Saved {} to dependencies", outcome.name);
            }
            println!("Successfully installed {}@{}", outcome.name, version);
        }
        Outcome::Warning { message } => {
            eprintln!("Warning: {}: {}", outcome.name, message);
        }
        Outcome::Failed { error } => {
            eprintln!("Error installing {}: {}", outcome.name, error);
        }
    }
}

/// Print the closing lines of a run and turn failures into an error exit.
fn summarize(report: &InstallReport) -> Result<()> {
    match &report.nothing_to_install {
        Some(NothingToInstall::NoManifest) => {
            println!("No package.json found.");
            return Ok(());
        }
        Some(NothingToInstall::NoDependencies) => {
            println!("No dependencies found in package.json");
            return Ok(());
        }
        Some(NothingToInstall::UnreadableManifest(e)) => {
            anyhow::bail!("Cannot read dependencies: {}", e);
        }
        None => {}
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} package(s) failed to install",
            failed,
            report.attempted()
        );
    }

    if report.source == TargetSource::Manifest {
        println!("Installed {} package(s) from package.json", report.attempted());
    }
    Ok(())
}
