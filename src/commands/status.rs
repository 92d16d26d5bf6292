use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::runtime::Runtime;
use crate::sync::{StatusReport, SyncEngine, SyncStatus};

use super::list::describe;
use super::open;

/// Print the status report and return the outcome.
#[tracing::instrument(skip(config))]
pub async fn status<R: Runtime + 'static>(config: Config<R>) -> Result<SyncStatus> {
    let manager = open(&config, false).await?;
    let report = SyncEngine::new(&manager).check_project_status().await?;
    print!("{}", render(&report));
    Ok(report.status)
}

/// Reconcile the project. By default the install directory follows the
/// manifest; with `to_manifest` the manifest follows the install directory.
#[tracing::instrument(skip(config))]
pub async fn sync<R: Runtime + 'static>(config: Config<R>, to_manifest: bool) -> Result<SyncStatus> {
    let manager = open(&config, false).await?;
    let engine = SyncEngine::new(&manager);

    let report = if to_manifest {
        info!("Updating bower.json from installed packages");
        engine.synchronize_with_project().await?
    } else {
        info!("Updating installed packages from bower.json");
        engine.synchronize_with_manifest().await?
    };

    print!("{}", render(&report));
    Ok(report.status)
}

pub(crate) fn render(report: &StatusReport) -> String {
    if report.is_in_sync() {
        return "Project is in sync with bower.json.\n".to_string();
    }

    let mut out = String::new();
    if !report.missing.is_empty() {
        out.push_str("Missing (declared but not installed):\n");
        for pkg in &report.missing {
            out.push_str(&format!("  {}\n", describe(pkg)));
        }
    }
    if !report.untracked.is_empty() {
        out.push_str("Not tracked (installed but not declared):\n");
        for pkg in &report.untracked {
            out.push_str(&format!("  {}\n", describe(pkg)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{DependencyType, Package};

    #[test]
    fn test_render_in_sync() {
        let report = StatusReport::from_packages(std::iter::empty());
        assert_eq!(render(&report), "Project is in sync with bower.json.\n");
    }

    #[test]
    fn test_render_out_of_sync() {
        let mut missing = Package::new("lodash");
        missing.set_dependency_type(DependencyType::Production, Some("*".into()));
        missing.mark_project_dependency(true);
        let mut extra = Package::new("zepto").with_installed(Some("1.1.6".into()));
        extra.mark_project_dependency(true);

        let report = StatusReport::from_packages(&[missing, extra]);

        assert_eq!(
            render(&report),
            "Missing (declared but not installed):\n  lodash (not installed) [missing]\n\
             Not tracked (installed but not declared):\n  zepto 1.1.6 [not tracked]\n"
        );
    }
}
